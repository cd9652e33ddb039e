//! Navigation and synchronization engine.
//!
//! This module provides:
//! - [`Navigator`] owning the current location and its listing
//! - [`ListingSync`] reconciling CRUD results with that listing
//! - [`Command`] parsing and [`execute`] for the explorer command line

pub mod commands;
pub mod error;
pub mod navigation;
pub mod sync;

pub use commands::{Command, CommandResult, PathArg, execute, run_line, split_args};
pub use error::DriveError;
pub use navigation::{Completion, ListRequest, NavPhase, NavView, NavigationState, Navigator, RequestToken};
pub use sync::ListingSync;
