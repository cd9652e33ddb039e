//! Virtual path addressing and listing synchronization for a remote drive.
//!
//! Addresses look like `BrowserCache::docs/drafts/`: a storage location,
//! the `::` separator and zero or more segments. A [`ListingSync`] keeps one
//! view's location and listing consistent with a [`RemoteStore`] while
//! navigation and CRUD requests race each other.

pub mod config;
pub mod core;
pub mod models;
pub mod remote;

pub use crate::config::ExplorerConfig;
pub use crate::core::{DriveError, ListingSync, Navigator};
pub use crate::models::{Entry, EntryId, FileEntry, FolderEntry, Listing, PathAddress, StorageTag};
pub use crate::remote::{ListPage, RemoteStore};
