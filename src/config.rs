//! Explorer configuration.
//!
//! Centralizes the constants used throughout the crate and the
//! [`ExplorerConfig`] a host hands to the synchronizer.

use serde::Deserialize;
use thiserror::Error;

use crate::core::error::AddressError;
use crate::models::{PathAddress, StorageRegistry};

// =============================================================================
// Address Format
// =============================================================================

/// Separator between the storage location and the segment list.
pub const ADDRESS_SEPARATOR: &str = "::";

/// Separator between path segments.
pub const SEGMENT_SEPARATOR: char = '/';

// =============================================================================
// Navigation Defaults
// =============================================================================

/// Home location used when the host does not configure one.
pub const DEFAULT_HOME: &str = "BrowserCache::";

/// Number of entries requested per `list_folder` page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Storage locations offered at the root picker by default.
pub const DEFAULT_STORAGE_LOCATIONS: &[&str] = &["BrowserCache", "HardDrive", "Web3Storj"];

// =============================================================================
// Text
// =============================================================================

/// Output of the `help` command.
pub const HELP_TEXT: &str = "\
ls                 list the current folder
cd <path>          change folder (X::a/b/, a/b, .., ~)
pwd                print the current address
mkdir <name>       create a folder
touch <name>       create or update a file
mv <name> <new>    rename an entry
rm <name>          delete an entry
info <name>        show an entry as the remote sees it
refresh            re-list the current folder
roots              list storage locations
help               show this help";

// =============================================================================
// ExplorerConfig
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid home address: {0}")]
    Home(#[from] AddressError),
    #[error("invalid storage location: {0}")]
    StorageLocation(AddressError),
    #[error("page_size must be greater than zero")]
    ZeroPageSize,
}

/// Runtime configuration for one explorer view.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Address the view starts at and `cd ~` returns to.
    pub home: String,
    /// Page size for folder listings.
    pub page_size: u32,
    /// Storage locations in the order they are offered.
    pub storage_locations: Vec<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            home: DEFAULT_HOME.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            storage_locations: DEFAULT_STORAGE_LOCATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExplorerConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the navigation engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        self.home_address()?;
        self.storage_registry()?;
        Ok(())
    }

    /// The configured home as an address.
    pub fn home_address(&self) -> Result<PathAddress, AddressError> {
        PathAddress::parse(&self.home)
    }

    /// The configured storage locations as a registry.
    pub fn storage_registry(&self) -> Result<StorageRegistry, ConfigError> {
        StorageRegistry::from_names(self.storage_locations.iter().cloned())
            .map_err(ConfigError::StorageLocation)
    }
}
