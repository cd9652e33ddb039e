//! Storage locations.
//!
//! Every address is prefixed by the storage location it lives in, and every
//! file records which location variant holds its content. The set of
//! variants is open: unknown tags round-trip through [`StorageTag::Other`].

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::AddressError;
use crate::models::PathAddress;

// ============================================================================
// StorageTag
// ============================================================================

/// Where a file's content lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageTag {
    /// Browser-local cache
    BrowserCache,
    /// Local disk of the owning device
    HardDrive,
    /// Durable decentralized storage
    Web3Storj,
    /// Any location this client has no special knowledge of
    Other(String),
}

impl StorageTag {
    /// Tag naming the storage location of `addr`.
    pub fn of(addr: &PathAddress) -> Self {
        Self::from(addr.storage_location())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::BrowserCache => "BrowserCache",
            Self::HardDrive => "HardDrive",
            Self::Web3Storj => "Web3Storj",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for StorageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for StorageTag {
    fn from(s: &str) -> Self {
        match s {
            "BrowserCache" => Self::BrowserCache,
            "HardDrive" => Self::HardDrive,
            "Web3Storj" => Self::Web3Storj,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for StorageTag {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<StorageTag> for String {
    fn from(tag: StorageTag) -> Self {
        tag.as_str().to_string()
    }
}

impl FromStr for StorageTag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

// ============================================================================
// StorageRegistry
// ============================================================================

/// Storage locations a view offers, in registration order.
#[derive(Clone, Debug, Default)]
pub struct StorageRegistry {
    roots: HashMap<String, PathAddress>,
    order: Vec<String>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from storage location names.
    pub fn from_names<I, S>(names: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name)?;
        }
        Ok(registry)
    }

    /// Register a storage location. Registering a name twice is a no-op.
    pub fn register(&mut self, name: impl Into<String>) -> Result<(), AddressError> {
        let name = name.into();
        if self.roots.contains_key(&name) {
            return Ok(());
        }
        let root = PathAddress::root(name.clone())?;
        self.order.push(name.clone());
        self.roots.insert(name, root);
        Ok(())
    }

    /// Root address of a registered location.
    pub fn root(&self, name: &str) -> Option<&PathAddress> {
        self.roots.get(name)
    }

    /// All root addresses in registration order.
    pub fn roots(&self) -> impl Iterator<Item = &PathAddress> {
        self.order.iter().filter_map(|name| self.roots.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
