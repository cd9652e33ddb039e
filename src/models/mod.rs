//! Data models for the drive client.
//!
//! Contains domain types for:
//! - [`PathAddress`] - Storage-prefixed virtual paths
//! - [`FolderEntry`], [`FileEntry`], [`Entry`], [`Listing`] - Remote entries and folder listings
//! - [`StorageTag`], [`StorageRegistry`] - Storage locations
//! - [`OutputLine`] - Command output

mod filesystem;
mod path;
mod storage;
mod terminal;

pub use filesystem::{Entry, EntryId, FileEntry, FolderEntry, Listing};
pub use path::{Ancestors, PathAddress, validate_segment};
pub use storage::{StorageRegistry, StorageTag};
pub use terminal::{OutputLine, OutputLineData, TextStyle};
