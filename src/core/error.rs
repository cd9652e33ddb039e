//! Error types for the drive client.
//!
//! Errors are split by layer:
//!
//! - [`AddressError`] - constructing a [`PathAddress`](crate::models::PathAddress)
//! - [`RemoteUnavailable`] - transport failure reported by the remote store
//! - [`ListError`], [`LookupError`], [`CreateFileError`], [`CreateFolderError`],
//!   [`RenameError`], [`DeleteError`] - per-operation outcomes of the remote store contract
//! - [`DriveError`] - what the trigger surface reports to the presentation layer

use thiserror::Error;

// =============================================================================
// Address Errors
// =============================================================================

/// Failure to build an address. Always surfaced, never corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The raw string has no `::` or names no storage location.
    #[error("malformed address '{0}'")]
    MalformedAddress(String),
    /// A segment is empty or contains `/`.
    #[error("invalid path segment '{0}'")]
    InvalidSegment(String),
}

// =============================================================================
// Remote Store Errors
// =============================================================================

/// Transport-level failure. Every remote operation may report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote store unavailable: {0}")]
pub struct RemoteUnavailable(pub String);

/// Errors from `list_folder`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error(transparent)]
    Unavailable(#[from] RemoteUnavailable),
}

/// Errors from the `get_*` lookups. A missing entry is `Ok(None)`, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Unavailable(#[from] RemoteUnavailable),
}

/// Errors from `create_file`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateFileError {
    /// The parent folder of the target does not exist.
    #[error("parent folder does not exist")]
    InvalidPath,
    #[error(transparent)]
    Unavailable(#[from] RemoteUnavailable),
}

/// Errors from `create_folder`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateFolderError {
    #[error("folder already exists")]
    AlreadyExists,
    #[error("parent folder does not exist")]
    InvalidPath,
    #[error(transparent)]
    Unavailable(#[from] RemoteUnavailable),
}

/// Errors from `rename_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("an entry with that name already exists")]
    NameCollision,
    #[error("entry not found")]
    NotFound,
    #[error(transparent)]
    Unavailable(#[from] RemoteUnavailable),
}

/// Errors from `delete_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    #[error("entry not found")]
    NotFound,
    #[error(transparent)]
    Unavailable(#[from] RemoteUnavailable),
}

// =============================================================================
// User-Facing Errors
// =============================================================================

/// Error reported by a UI trigger (`navigate_to`, `create_file`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    #[error("malformed address '{0}'")]
    MalformedAddress(String),
    #[error("invalid name '{0}'")]
    InvalidSegment(String),
    /// The target's parent folder is missing on the remote.
    #[error("parent folder is missing")]
    InvalidPath,
    #[error("an entry already exists at that path")]
    AlreadyExists,
    #[error("an entry with that name already exists")]
    NameCollision,
    #[error("entry not found")]
    NotFound,
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),
}

impl From<AddressError> for DriveError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::MalformedAddress(raw) => Self::MalformedAddress(raw),
            AddressError::InvalidSegment(name) => Self::InvalidSegment(name),
        }
    }
}

impl From<RemoteUnavailable> for DriveError {
    fn from(err: RemoteUnavailable) -> Self {
        Self::RemoteUnavailable(err.0)
    }
}

impl From<ListError> for DriveError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::Unavailable(e) => e.into(),
        }
    }
}

impl From<LookupError> for DriveError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Unavailable(e) => e.into(),
        }
    }
}

impl From<CreateFileError> for DriveError {
    fn from(err: CreateFileError) -> Self {
        match err {
            CreateFileError::InvalidPath => Self::InvalidPath,
            CreateFileError::Unavailable(e) => e.into(),
        }
    }
}

impl From<CreateFolderError> for DriveError {
    fn from(err: CreateFolderError) -> Self {
        match err {
            CreateFolderError::AlreadyExists => Self::AlreadyExists,
            CreateFolderError::InvalidPath => Self::InvalidPath,
            CreateFolderError::Unavailable(e) => e.into(),
        }
    }
}

impl From<RenameError> for DriveError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::NameCollision => Self::NameCollision,
            RenameError::NotFound => Self::NotFound,
            RenameError::Unavailable(e) => e.into(),
        }
    }
}

impl From<DeleteError> for DriveError {
    fn from(err: DeleteError) -> Self {
        match err {
            DeleteError::NotFound => Self::NotFound,
            DeleteError::Unavailable(e) => e.into(),
        }
    }
}
