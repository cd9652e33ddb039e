use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{PathAddress, StorageTag};

// =============================================================================
// Entry Identity
// =============================================================================

/// Opaque, stable identifier assigned by the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Folder and File Entries
// =============================================================================

/// A folder as last reported by the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub id: EntryId,
    /// Display name (any printable character except `/`)
    pub name: String,
    /// Address of the folder itself
    pub full_path: PathAddress,
    /// Direct subfolders
    #[serde(default)]
    pub child_folder_ids: Vec<EntryId>,
    /// Direct files
    #[serde(default)]
    pub file_ids: Vec<EntryId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A file as last reported by the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: EntryId,
    pub name: String,
    pub full_path: PathAddress,
    /// Storage location variant holding the content
    pub storage_tag: StorageTag,
    /// Incremented each time the file is upserted at the same path
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn first_version() -> u32 {
    1
}

/// Either kind of entry, as passed to rename and delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Folder(FolderEntry),
    File(FileEntry),
}

impl Entry {
    pub fn id(&self) -> &EntryId {
        match self {
            Self::Folder(f) => &f.id,
            Self::File(f) => &f.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::File(f) => &f.name,
        }
    }

    pub fn full_path(&self) -> &PathAddress {
        match self {
            Self::Folder(f) => &f.full_path,
            Self::File(f) => &f.full_path,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Folder(f) => &f.tags,
            Self::File(f) => &f.tags,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }
}

impl From<FolderEntry> for Entry {
    fn from(folder: FolderEntry) -> Self {
        Self::Folder(folder)
    }
}

impl From<FileEntry> for Entry {
    fn from(file: FileEntry) -> Self {
        Self::File(file)
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Folders and files directly under one address, at one point in time.
///
/// A listing is only meaningful for [`Listing::address`]; callers compare it
/// with the current location before showing or mutating it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub address: PathAddress,
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
}

impl Listing {
    pub fn empty(address: PathAddress) -> Self {
        Self {
            address,
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.folders.iter().any(|f| &f.id == id) || self.files.iter().any(|f| &f.id == id)
    }

    /// Find an entry by display name. Folders win over files.
    pub fn find_by_name(&self, name: &str) -> Option<Entry> {
        self.folders
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .map(Entry::Folder)
            .or_else(|| {
                self.files
                    .iter()
                    .find(|f| f.name == name)
                    .cloned()
                    .map(Entry::File)
            })
    }

    /// Insert `folder`, or replace the entry with the same id.
    pub fn upsert_folder(&mut self, folder: FolderEntry) {
        match self.folders.iter_mut().find(|f| f.id == folder.id) {
            Some(existing) => *existing = folder,
            None => self.folders.push(folder),
        }
    }

    /// Insert `file`, or replace the entry with the same id.
    pub fn upsert_file(&mut self, file: FileEntry) {
        match self.files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &EntryId) -> bool {
        let before = self.len();
        self.folders.retain(|f| &f.id != id);
        self.files.retain(|f| &f.id != id);
        self.len() != before
    }

    /// Apply a confirmed rename to the entry with `id`.
    ///
    /// Returns whether the entry was present.
    pub fn rename(&mut self, id: &EntryId, name: &str, full_path: PathAddress) -> bool {
        if let Some(folder) = self.folders.iter_mut().find(|f| &f.id == id) {
            folder.name = name.to_string();
            folder.full_path = full_path;
            return true;
        }
        if let Some(file) = self.files.iter_mut().find(|f| &f.id == id) {
            file.name = name.to_string();
            file.full_path = full_path;
            return true;
        }
        false
    }

    /// Entries in display order.
    ///
    /// Folders first, then files; hidden names last within each group;
    /// alphabetical otherwise.
    pub fn sorted(&self) -> Vec<Entry> {
        let mut items: Vec<Entry> = self
            .folders
            .iter()
            .cloned()
            .map(Entry::Folder)
            .chain(self.files.iter().cloned().map(Entry::File))
            .collect();

        items.sort_by(|a, b| {
            let a_hidden = a.name().starts_with('.');
            let b_hidden = b.name().starts_with('.');

            match (a.is_folder(), b.is_folder(), a_hidden, b_hidden) {
                (true, false, _, _) => Ordering::Less,
                (false, true, _, _) => Ordering::Greater,
                (_, _, false, true) => Ordering::Less,
                (_, _, true, false) => Ordering::Greater,
                _ => a.name().cmp(b.name()),
            }
        });
        items
    }
}
