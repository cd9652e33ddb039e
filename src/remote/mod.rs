//! Remote store contract.
//!
//! The drive client never talks to a transport directly. A host binds a
//! session (authenticated or anonymous) to a [`RemoteStore`] implementation
//! and hands it to the synchronizer.

#[cfg(any(test, feature = "mock"))]
mod memory;

#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::{
    CreateFileError, CreateFolderError, DeleteError, ListError, LookupError, RenameError,
};
use crate::models::{Entry, EntryId, FileEntry, FolderEntry, PathAddress, StorageTag};

/// One page of a folder listing.
///
/// Entries are ordered folders first, then files; `after` and `limit` index
/// into that combined order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    /// Number of entries in this page
    pub total: u32,
    /// More entries exist past this page
    pub has_more: bool,
}

impl ListPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Operations the drive client issues against the remote store.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Direct children of `address`, paginated. Never recursive.
    async fn list_folder(
        &self,
        address: &PathAddress,
        limit: u32,
        after: u32,
    ) -> Result<ListPage, ListError>;

    /// Folder at `path`, or `None` if nothing lives there. Every storage
    /// location has a root folder.
    async fn get_folder_by_path(
        &self,
        path: &PathAddress,
    ) -> Result<Option<FolderEntry>, LookupError>;

    async fn get_file_by_path(&self, path: &PathAddress)
    -> Result<Option<FileEntry>, LookupError>;

    /// File or folder with `id`, if it still exists.
    async fn get_entry_by_id(&self, id: &EntryId) -> Result<Option<Entry>, LookupError>;

    /// Create or update the file at `path`.
    async fn create_file(
        &self,
        path: &PathAddress,
        storage: StorageTag,
    ) -> Result<FileEntry, CreateFileError>;

    async fn create_folder(
        &self,
        path: &PathAddress,
        storage: StorageTag,
    ) -> Result<FolderEntry, CreateFolderError>;

    /// Rename a file or folder in place. The parent does not change.
    async fn rename_entry(&self, id: &EntryId, new_name: &str) -> Result<(), RenameError>;

    async fn delete_entry(&self, id: &EntryId) -> Result<(), DeleteError>;
}
