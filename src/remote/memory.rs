//! In-memory remote store for tests and offline demos.
//!
//! Mirrors the drive backend's bookkeeping: every storage location has an
//! implicit root folder, entries are indexed both by id and by full path,
//! files are upserted with a bumped version, and folder renames and deletes
//! carry their whole subtree along.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;

use super::{ListPage, RemoteStore};
use crate::core::error::{
    CreateFileError, CreateFolderError, DeleteError, ListError, LookupError, RemoteUnavailable,
    RenameError,
};
use crate::models::{Entry, EntryId, FileEntry, FolderEntry, PathAddress, StorageTag};

#[derive(Default)]
struct State {
    folders: HashMap<EntryId, FolderEntry>,
    files: HashMap<EntryId, FileEntry>,
    folder_paths: HashMap<PathAddress, EntryId>,
    file_paths: HashMap<PathAddress, EntryId>,
    next_id: u64,
}

impl State {
    fn mint_id(&mut self, prefix: &str) -> EntryId {
        self.next_id += 1;
        EntryId::new(format!("{}-{:04}", prefix, self.next_id))
    }

    fn folder_exists(&self, path: &PathAddress) -> bool {
        path.is_root() || self.folder_paths.contains_key(path)
    }

    fn occupied(&self, path: &PathAddress) -> bool {
        self.folder_paths.contains_key(path) || self.file_paths.contains_key(path)
    }

    fn insert_folder(&mut self, path: &PathAddress) -> FolderEntry {
        let id = self.mint_id("fld");
        let folder = FolderEntry {
            id: id.clone(),
            name: path.name().unwrap_or_default().to_string(),
            full_path: path.clone(),
            child_folder_ids: Vec::new(),
            file_ids: Vec::new(),
            tags: Vec::new(),
        };
        self.folder_paths.insert(path.clone(), id.clone());
        self.folders.insert(id, folder.clone());
        folder
    }

    /// Root folder of `root`'s storage location, created on first use.
    fn ensure_root(&mut self, root: &PathAddress) -> EntryId {
        if let Some(id) = self.folder_paths.get(root) {
            return id.clone();
        }
        let mut folder = self.insert_folder(root);
        folder.name = root.storage_location().to_string();
        let id = folder.id.clone();
        self.folders.insert(id.clone(), folder);
        id
    }

    /// Folder as reported to clients, with its child id sets filled in.
    fn describe_folder(&self, folder: &FolderEntry) -> FolderEntry {
        let is_child = |p: &PathAddress| p.parent().as_ref() == Some(&folder.full_path);
        let mut described = folder.clone();
        described.child_folder_ids = self
            .folders
            .values()
            .filter(|f| is_child(&f.full_path))
            .map(|f| f.id.clone())
            .collect();
        described.file_ids = self
            .files
            .values()
            .filter(|f| is_child(&f.full_path))
            .map(|f| f.id.clone())
            .collect();
        described.child_folder_ids.sort();
        described.file_ids.sort();
        described
    }

    /// Move every folder and file under `from` to live under `to`.
    fn rebase_subtree(&mut self, from: &PathAddress, to: &PathAddress) {
        for folder in self.folders.values_mut() {
            if let Some(moved) = folder.full_path.rebase(from, to) {
                self.folder_paths.remove(&folder.full_path);
                self.folder_paths.insert(moved.clone(), folder.id.clone());
                folder.full_path = moved;
            }
        }
        for file in self.files.values_mut() {
            if let Some(moved) = file.full_path.rebase(from, to) {
                self.file_paths.remove(&file.full_path);
                self.file_paths.insert(moved.clone(), file.id.clone());
                file.full_path = moved;
            }
        }
    }

    fn remove_subtree(&mut self, root: &PathAddress) {
        self.folders.retain(|_, f| !f.full_path.starts_with(root));
        self.files.retain(|_, f| !f.full_path.starts_with(root));
        self.folder_paths.retain(|p, _| !p.starts_with(root));
        self.file_paths.retain(|p, _| !p.starts_with(root));
    }
}

/// A [`RemoteStore`] that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<State>,
    offline: Cell<bool>,
    list_calls: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`RemoteUnavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Number of `list_folder` calls received so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    /// Create `path` and any missing ancestors. Returns `None` for a root.
    pub fn ensure_folder(&self, path: &PathAddress) -> Option<FolderEntry> {
        let mut state = self.state.borrow_mut();
        let mut last = None;
        for ancestor in path.ancestors().skip(1) {
            let existing = state.folder_paths.get(&ancestor).cloned();
            let folder = match existing {
                Some(id) => state.folders.get(&id).cloned(),
                None => Some(state.insert_folder(&ancestor)),
            };
            last = folder;
        }
        last
    }

    /// Create a file, creating its parent folders as needed.
    pub fn seed_file(&self, path: &PathAddress, storage: StorageTag) -> Option<FileEntry> {
        let parent = path.parent()?;
        self.ensure_folder(&parent);
        let mut state = self.state.borrow_mut();
        Some(Self::upsert_file(&mut state, path, storage))
    }

    pub fn folder_at(&self, path: &PathAddress) -> Option<FolderEntry> {
        let state = self.state.borrow();
        let id = state.folder_paths.get(path)?;
        state.folders.get(id).cloned()
    }

    pub fn file_at(&self, path: &PathAddress) -> Option<FileEntry> {
        let state = self.state.borrow();
        let id = state.file_paths.get(path)?;
        state.files.get(id).cloned()
    }

    /// Attach `tag` to the entry `id`. Returns whether the entry exists.
    pub fn add_tag(&self, id: &EntryId, tag: &str) -> bool {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let tags = match (state.folders.get_mut(id), state.files.get_mut(id)) {
            (Some(folder), _) => &mut folder.tags,
            (None, Some(file)) => &mut file.tags,
            (None, None) => return false,
        };
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
        true
    }

    fn check_online(&self) -> Result<(), RemoteUnavailable> {
        if self.offline.get() {
            return Err(RemoteUnavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn upsert_file(state: &mut State, path: &PathAddress, storage: StorageTag) -> FileEntry {
        if let Some(id) = state.file_paths.get(path).cloned()
            && let Some(existing) = state.files.get_mut(&id)
        {
            existing.version += 1;
            existing.storage_tag = storage;
            return existing.clone();
        }

        let id = state.mint_id("fil");
        let file = FileEntry {
            id: id.clone(),
            name: path.name().unwrap_or_default().to_string(),
            full_path: path.clone(),
            storage_tag: storage,
            version: 1,
            tags: Vec::new(),
        };
        state.file_paths.insert(path.clone(), id.clone());
        state.files.insert(id, file.clone());
        file
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryStore {
    async fn list_folder(
        &self,
        address: &PathAddress,
        limit: u32,
        after: u32,
    ) -> Result<ListPage, ListError> {
        self.check_online()?;
        self.list_calls.set(self.list_calls.get() + 1);

        let state = self.state.borrow();
        if !state.folder_exists(address) {
            return Ok(ListPage::empty());
        }

        let is_child = |p: &PathAddress| p.parent().as_ref() == Some(address);

        let mut folders: Vec<FolderEntry> = state
            .folders
            .values()
            .filter(|f| is_child(&f.full_path))
            .map(|f| state.describe_folder(f))
            .collect();
        let mut files: Vec<FileEntry> = state
            .files
            .values()
            .filter(|f| is_child(&f.full_path))
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));

        // Pagination runs over folders followed by files
        let total_items = folders.len() + files.len();
        let start = (after as usize).min(total_items);
        let end = start.saturating_add(limit as usize).min(total_items);
        let n_folders = folders.len();

        let page_folders = folders[start.min(n_folders)..end.min(n_folders)].to_vec();
        let page_files = files[start.max(n_folders) - n_folders..end.max(n_folders) - n_folders]
            .to_vec();

        Ok(ListPage {
            total: (page_folders.len() + page_files.len()) as u32,
            folders: page_folders,
            files: page_files,
            has_more: end < total_items,
        })
    }

    async fn get_folder_by_path(
        &self,
        path: &PathAddress,
    ) -> Result<Option<FolderEntry>, LookupError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();

        let id = if path.is_root() {
            state.ensure_root(path)
        } else {
            match state.folder_paths.get(path) {
                Some(id) => id.clone(),
                None => return Ok(None),
            }
        };
        Ok(state.folders.get(&id).map(|f| state.describe_folder(f)))
    }

    async fn get_file_by_path(
        &self,
        path: &PathAddress,
    ) -> Result<Option<FileEntry>, LookupError> {
        self.check_online()?;
        Ok(self.file_at(path))
    }

    async fn get_entry_by_id(&self, id: &EntryId) -> Result<Option<Entry>, LookupError> {
        self.check_online()?;
        let state = self.state.borrow();
        if let Some(folder) = state.folders.get(id) {
            return Ok(Some(Entry::Folder(state.describe_folder(folder))));
        }
        Ok(state.files.get(id).cloned().map(Entry::File))
    }

    async fn create_file(
        &self,
        path: &PathAddress,
        storage: StorageTag,
    ) -> Result<FileEntry, CreateFileError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();

        let parent = path.parent().ok_or(CreateFileError::InvalidPath)?;
        if !state.folder_exists(&parent) || state.folder_paths.contains_key(path) {
            return Err(CreateFileError::InvalidPath);
        }

        Ok(Self::upsert_file(&mut state, path, storage))
    }

    async fn create_folder(
        &self,
        path: &PathAddress,
        _storage: StorageTag,
    ) -> Result<FolderEntry, CreateFolderError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();

        let Some(parent) = path.parent() else {
            return Err(CreateFolderError::AlreadyExists);
        };
        if state.occupied(path) {
            return Err(CreateFolderError::AlreadyExists);
        }
        if !state.folder_exists(&parent) {
            return Err(CreateFolderError::InvalidPath);
        }

        let folder = state.insert_folder(path);
        Ok(folder)
    }

    async fn rename_entry(&self, id: &EntryId, new_name: &str) -> Result<(), RenameError> {
        self.check_online()?;
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let old_path = match (state.folders.get(id), state.files.get(id)) {
            (Some(folder), _) => folder.full_path.clone(),
            (None, Some(file)) => file.full_path.clone(),
            (None, None) => return Err(RenameError::NotFound),
        };
        // Callers validate names; an unusable one cannot address any entry
        let new_path = old_path
            .with_name(new_name)
            .map_err(|_| RenameError::NotFound)?;

        if new_path == old_path {
            return Ok(());
        }
        if state.occupied(&new_path) {
            return Err(RenameError::NameCollision);
        }

        if let Some(folder) = state.folders.get_mut(id) {
            folder.name = new_name.to_string();
        } else if let Some(file) = state.files.get_mut(id) {
            file.name = new_name.to_string();
        }
        state.rebase_subtree(&old_path, &new_path);
        Ok(())
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<(), DeleteError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();

        let folder_root = state.folders.get(id).map(|f| f.full_path.clone());
        if let Some(root) = folder_root {
            state.remove_subtree(&root);
            return Ok(());
        }
        match state.files.remove(id) {
            Some(file) => {
                state.file_paths.remove(&file.full_path);
                Ok(())
            }
            None => Err(DeleteError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> PathAddress {
        PathAddress::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_list_direct_children_only() {
        let store = MemoryStore::new();
        store.ensure_folder(&at("BrowserCache::a/b/c/"));
        store.seed_file(&at("BrowserCache::a/x.txt"), StorageTag::BrowserCache);

        let page = store.list_folder(&at("BrowserCache::a/"), 100, 0).await.unwrap();
        let folder_names: Vec<_> = page.folders.iter().map(|f| f.name.as_str()).collect();
        let file_names: Vec<_> = page.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folder_names, ["b"]);
        assert_eq!(file_names, ["x.txt"]);
        assert_eq!(page.total, 2);
        assert!(!page.has_more);

        // b has one subfolder, c
        assert_eq!(page.folders[0].child_folder_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = MemoryStore::new();
        for name in ["d1", "d2"] {
            store.ensure_folder(&at("HardDrive::").join(name).unwrap());
        }
        for name in ["f1", "f2", "f3"] {
            store.seed_file(&at("HardDrive::").join(name).unwrap(), StorageTag::HardDrive);
        }
        let root = at("HardDrive::");

        let first = store.list_folder(&root, 3, 0).await.unwrap();
        assert_eq!(first.folders.len(), 2);
        assert_eq!(first.files.len(), 1);
        assert!(first.has_more);

        let second = store.list_folder(&root, 3, 3).await.unwrap();
        assert!(second.folders.is_empty());
        let names: Vec<_> = second.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["f2", "f3"]);
        assert!(!second.has_more);

        let past_end = store.list_folder(&root, 3, 10).await.unwrap();
        assert_eq!(past_end.total, 0);
    }

    #[tokio::test]
    async fn test_list_missing_folder_is_empty() {
        let store = MemoryStore::new();
        let page = store.list_folder(&at("BrowserCache::ghost/"), 10, 0).await.unwrap();
        assert_eq!(page, ListPage::empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_file_upserts() {
        let store = MemoryStore::new();
        let path = at("BrowserCache::notes.md");

        let first = store.create_file(&path, StorageTag::BrowserCache).await.unwrap();
        let second = store.create_file(&path, StorageTag::Web3Storj).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.version, 2);
        assert_eq!(second.storage_tag, StorageTag::Web3Storj);
    }

    #[tokio::test]
    async fn test_create_file_requires_parent() {
        let store = MemoryStore::new();
        let err = store
            .create_file(&at("BrowserCache::missing/notes.md"), StorageTag::BrowserCache)
            .await
            .unwrap_err();
        assert_eq!(err, CreateFileError::InvalidPath);
    }

    #[tokio::test]
    async fn test_create_folder_errors() {
        let store = MemoryStore::new();
        let docs = at("BrowserCache::docs/");
        store.create_folder(&docs, StorageTag::BrowserCache).await.unwrap();

        assert_eq!(
            store.create_folder(&docs, StorageTag::BrowserCache).await,
            Err(CreateFolderError::AlreadyExists)
        );
        assert_eq!(
            store
                .create_folder(&at("BrowserCache::a/b/"), StorageTag::BrowserCache)
                .await,
            Err(CreateFolderError::InvalidPath)
        );
        assert_eq!(
            store.create_folder(&at("BrowserCache::"), StorageTag::BrowserCache).await,
            Err(CreateFolderError::AlreadyExists)
        );
    }

    #[tokio::test]
    async fn test_rename_folder_moves_subtree() {
        let store = MemoryStore::new();
        let folder = store.ensure_folder(&at("BrowserCache::a/")).unwrap();
        store.seed_file(&at("BrowserCache::a/b/c.txt"), StorageTag::BrowserCache);

        store.rename_entry(&folder.id, "z").await.unwrap();

        assert!(store.folder_at(&at("BrowserCache::a/")).is_none());
        assert_eq!(store.folder_at(&at("BrowserCache::z/")).unwrap().name, "z");
        assert!(store.folder_at(&at("BrowserCache::z/b/")).is_some());
        assert!(store.file_at(&at("BrowserCache::z/b/c.txt")).is_some());
    }

    #[tokio::test]
    async fn test_rename_collision_and_missing() {
        let store = MemoryStore::new();
        let a = store.seed_file(&at("BrowserCache::a.txt"), StorageTag::BrowserCache).unwrap();
        store.ensure_folder(&at("BrowserCache::b/"));

        assert_eq!(
            store.rename_entry(&a.id, "b").await,
            Err(RenameError::NameCollision)
        );
        assert_eq!(
            store.rename_entry(&"nope".into(), "c").await,
            Err(RenameError::NotFound)
        );
        assert_eq!(store.rename_entry(&a.id, "a.txt").await, Ok(()));
    }

    #[tokio::test]
    async fn test_delete_folder_removes_subtree() {
        let store = MemoryStore::new();
        let folder = store.ensure_folder(&at("BrowserCache::a/")).unwrap();
        let file = store.seed_file(&at("BrowserCache::a/b/c.txt"), StorageTag::BrowserCache).unwrap();

        store.delete_entry(&folder.id).await.unwrap();
        assert!(store.folder_at(&at("BrowserCache::a/b/")).is_none());
        assert_eq!(store.delete_entry(&file.id).await, Err(DeleteError::NotFound));
    }

    #[tokio::test]
    async fn test_offline() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.list_folder(&at("BrowserCache::"), 10, 0).await.unwrap_err();
        assert!(matches!(err, ListError::Unavailable(_)));
        assert_eq!(store.list_calls(), 0);
        assert!(matches!(
            store.get_folder_by_path(&at("BrowserCache::")).await,
            Err(LookupError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_by_path() {
        let store = MemoryStore::new();
        store.seed_file(&at("BrowserCache::docs/a.txt"), StorageTag::BrowserCache);

        let docs = store.get_folder_by_path(&at("BrowserCache::docs/")).await.unwrap().unwrap();
        assert_eq!(docs.name, "docs");
        assert_eq!(docs.file_ids.len(), 1);

        let root = store.get_folder_by_path(&at("HardDrive::")).await.unwrap().unwrap();
        assert_eq!(root.name, "HardDrive");
        // The root keeps its id once materialized
        let again = store.get_folder_by_path(&at("HardDrive::")).await.unwrap().unwrap();
        assert_eq!(again.id, root.id);

        assert_eq!(store.get_folder_by_path(&at("BrowserCache::ghost/")).await, Ok(None));
        // A file is not a folder, and vice versa
        assert_eq!(store.get_folder_by_path(&at("BrowserCache::docs/a.txt")).await, Ok(None));
        assert_eq!(store.get_file_by_path(&at("BrowserCache::docs/")).await, Ok(None));
        assert!(store.get_file_by_path(&at("BrowserCache::docs/a.txt")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_by_id_follows_rename_and_delete() {
        let store = MemoryStore::new();
        let file = store.seed_file(&at("BrowserCache::a.txt"), StorageTag::BrowserCache).unwrap();
        assert!(store.add_tag(&file.id, "draft"));
        assert!(!store.add_tag(&"nope".into(), "draft"));

        store.rename_entry(&file.id, "b.txt").await.unwrap();
        let Some(Entry::File(renamed)) = store.get_entry_by_id(&file.id).await.unwrap() else {
            panic!("expected a file");
        };
        assert_eq!(renamed.full_path, at("BrowserCache::b.txt"));
        assert_eq!(renamed.tags, ["draft"]);

        store.delete_entry(&file.id).await.unwrap();
        assert_eq!(store.get_entry_by_id(&file.id).await, Ok(None));
    }
}
