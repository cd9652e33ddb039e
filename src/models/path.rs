//! Storage-prefixed virtual paths.
//!
//! Interchange format: `<storage>::<segment>/<segment>/.../`
//!
//! - Root of a storage location: `"BrowserCache::"`
//! - Folder: `"BrowserCache::docs/notes/"`
//! - Duplicate, leading and trailing separators collapse on parse
//!
//! [`PathAddress::parse`] and [`PathAddress::join`] are the only ways to build
//! an address; nothing else in the crate concatenates path strings.

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ADDRESS_SEPARATOR, SEGMENT_SEPARATOR};
use crate::core::error::AddressError;

/// Check that `name` can be used as a single path segment.
pub fn validate_segment(name: &str) -> Result<(), AddressError> {
    if name.is_empty() || name.contains(SEGMENT_SEPARATOR) {
        return Err(AddressError::InvalidSegment(name.to_string()));
    }
    Ok(())
}

/// A storage name must not run into the `::` that follows it when rendered,
/// so it may neither contain `::` nor end with `:`.
fn is_valid_storage(name: &str) -> bool {
    !name.is_empty() && !name.contains(ADDRESS_SEPARATOR) && !name.ends_with(':')
}

/// An immutable address inside a named storage location.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathAddress {
    storage: String,
    segments: Vec<String>,
}

impl PathAddress {
    /// Root address of a storage location.
    pub fn root(storage: impl Into<String>) -> Result<Self, AddressError> {
        let storage = storage.into();
        if !is_valid_storage(&storage) {
            return Err(AddressError::MalformedAddress(storage));
        }
        Ok(Self {
            storage,
            segments: Vec::new(),
        })
    }

    /// Parse and normalize a raw address.
    ///
    /// Splits at the first `::`. Empty segments are dropped, so `a//b/`,
    /// `/a/b` and `a/b` all normalize to the same address.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let (storage, rest) = raw
            .split_once(ADDRESS_SEPARATOR)
            .ok_or_else(|| AddressError::MalformedAddress(raw.to_string()))?;

        if !is_valid_storage(storage) {
            return Err(AddressError::MalformedAddress(raw.to_string()));
        }

        let segments = rest
            .split(SEGMENT_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            storage: storage.to_string(),
            segments,
        })
    }

    /// Canonical string form. Same as `to_string()`.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Append `name` as a new last segment.
    pub fn join(&self, name: &str) -> Result<Self, AddressError> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self {
            storage: self.storage.clone(),
            segments,
        })
    }

    /// Replace the last segment, keeping the parent.
    ///
    /// The root has no last segment and is reported as malformed.
    pub fn with_name(&self, name: &str) -> Result<Self, AddressError> {
        match self.parent() {
            Some(parent) => parent.join(name),
            None => Err(AddressError::MalformedAddress(self.render())),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Storage location this address lives in.
    #[inline]
    pub fn storage_location(&self) -> &str {
        &self.storage
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments below the storage root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, `None` at root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent address, `None` at root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            storage: self.storage.clone(),
            segments: init.to_vec(),
        })
    }

    /// True if `prefix` is this address or one of its ancestors.
    pub fn starts_with(&self, prefix: &PathAddress) -> bool {
        self.storage == prefix.storage && self.segments.starts_with(&prefix.segments)
    }

    /// Move this address from under `from` to under `to`.
    ///
    /// Returns `None` if `from` is not a prefix of this address.
    pub fn rebase(&self, from: &PathAddress, to: &PathAddress) -> Option<Self> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.segments.clone();
        segments.extend_from_slice(&self.segments[from.segments.len()..]);
        Some(Self {
            storage: to.storage.clone(),
            segments,
        })
    }

    /// Breadcrumb trail: the root first, then each prefix, ending at `self`.
    ///
    /// Each call starts a fresh iterator.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            addr: self,
            next: 0,
        }
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.storage, ADDRESS_SEPARATOR)?;
        for segment in &self.segments {
            write!(f, "{}{}", segment, SEGMENT_SEPARATOR)?;
        }
        Ok(())
    }
}

impl FromStr for PathAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PathAddress> for String {
    fn from(addr: PathAddress) -> Self {
        addr.render()
    }
}

// =============================================================================
// Ancestors
// =============================================================================

/// Iterator returned by [`PathAddress::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    addr: &'a PathAddress,
    next: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = PathAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.addr.segments.len() {
            return None;
        }
        let item = PathAddress {
            storage: self.addr.storage.clone(),
            segments: self.addr.segments[..self.next].to_vec(),
        };
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.addr.segments.len() + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ancestors<'_> {}

impl FusedIterator for Ancestors<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> PathAddress {
        PathAddress::parse(s).unwrap()
    }

    #[test]
    fn test_parse_collapses_separators() {
        assert_eq!(addr("BrowserCache::a//b/").render(), "BrowserCache::a/b/");
        assert_eq!(addr("BrowserCache:://a/b").render(), "BrowserCache::a/b/");
        assert_eq!(addr("BrowserCache::a/b").segments(), ["a", "b"]);
    }

    #[test]
    fn test_root_round_trip() {
        let root = addr("BrowserCache::");
        assert!(root.is_root());
        assert_eq!(root.render(), "BrowserCache::");
        assert_eq!(addr("BrowserCache::///"), root);
        assert_eq!(PathAddress::root("BrowserCache").unwrap(), root);
    }

    #[test]
    fn test_root_rejects_names_that_do_not_round_trip() {
        for bad in ["", "a::b", "a:", "cache::"] {
            assert_eq!(
                PathAddress::root(bad),
                Err(AddressError::MalformedAddress(bad.to_string()))
            );
        }
        // A leading or inner single colon survives rendering
        for good in [":a", "a:b"] {
            let root = PathAddress::root(good).unwrap();
            assert_eq!(addr(&root.render()), root);
        }
    }

    #[test]
    fn test_parse_splits_at_first_separator() {
        let a = addr("HardDrive::x::y/z");
        assert_eq!(a.storage_location(), "HardDrive");
        assert_eq!(a.segments(), ["x::y", "z"]);
        assert_eq!(a.render(), "HardDrive::x::y/z/");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PathAddress::parse("BrowserCache/docs"),
            Err(AddressError::MalformedAddress("BrowserCache/docs".into()))
        );
        assert_eq!(
            PathAddress::parse("::docs"),
            Err(AddressError::MalformedAddress("::docs".into()))
        );
        assert!(PathAddress::parse("").is_err());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "BrowserCache::",
            "BrowserCache::a//b/",
            "BrowserCache:://a///b//c",
            "HardDrive::x::y//z/",
            "Web3Storj::  spaced name /file.txt",
            "a:b::c",
            "X::::",
        ];
        for raw in inputs {
            let once = addr(raw);
            let twice = addr(&once.render());
            assert_eq!(twice, once, "parse(render(parse({raw:?})))");
            assert_eq!(twice.render(), once.render());
        }
    }

    #[test]
    fn test_join() {
        let docs = addr("BrowserCache::docs/");
        assert_eq!(docs.join("notes").unwrap().render(), "BrowserCache::docs/notes/");
        assert_eq!(
            addr("BrowserCache::").join("docs").unwrap().render(),
            "BrowserCache::docs/"
        );
    }

    #[test]
    fn test_join_rejects_bad_segments() {
        let docs = addr("BrowserCache::docs/");
        assert_eq!(docs.join(""), Err(AddressError::InvalidSegment(String::new())));
        assert_eq!(
            docs.join("a/b"),
            Err(AddressError::InvalidSegment("a/b".into()))
        );
    }

    #[test]
    fn test_parent_and_name() {
        let a = addr("BrowserCache::a/b/c/");
        assert_eq!(a.name(), Some("c"));
        assert_eq!(a.parent().unwrap().render(), "BrowserCache::a/b/");
        assert!(addr("BrowserCache::").parent().is_none());
        assert!(addr("BrowserCache::").name().is_none());
    }

    #[test]
    fn test_with_name() {
        let a = addr("BrowserCache::a/b/");
        assert_eq!(a.with_name("z").unwrap().render(), "BrowserCache::a/z/");
        assert!(a.with_name("").is_err());
        assert!(addr("BrowserCache::").with_name("z").is_err());
    }

    #[test]
    fn test_equality_is_element_wise() {
        assert_ne!(addr("BrowserCache::a/"), addr("HardDrive::a/"));
        assert_ne!(addr("BrowserCache::a/b/"), addr("BrowserCache::ab/"));
        assert_eq!(addr("BrowserCache::a/b"), addr("BrowserCache::a//b/"));
    }

    #[test]
    fn test_ancestors() {
        let a = addr("BrowserCache::a/b/c/");
        let trail: Vec<String> = a.ancestors().map(|p| p.render()).collect();
        assert_eq!(
            trail,
            [
                "BrowserCache::",
                "BrowserCache::a/",
                "BrowserCache::a/b/",
                "BrowserCache::a/b/c/",
            ]
        );
        assert_eq!(a.ancestors().len(), 4);
        // Restartable
        assert_eq!(a.ancestors().count(), 4);
    }

    #[test]
    fn test_ancestors_of_root() {
        let root = addr("HardDrive::");
        let trail: Vec<_> = root.ancestors().collect();
        assert_eq!(trail, [root.clone()]);
    }

    #[test]
    fn test_starts_with_and_rebase() {
        let file = addr("BrowserCache::a/b/c.txt");
        let from = addr("BrowserCache::a/");
        let to = addr("BrowserCache::z/y/");

        assert!(file.starts_with(&from));
        assert!(!file.starts_with(&addr("HardDrive::a/")));
        assert_eq!(
            file.rebase(&from, &to).unwrap().render(),
            "BrowserCache::z/y/b/c.txt/"
        );
        assert!(file.rebase(&addr("BrowserCache::q/"), &to).is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let a = addr("BrowserCache::docs//notes");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#""BrowserCache::docs/notes/""#);

        let back: PathAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert!(serde_json::from_str::<PathAddress>(r#""nope""#).is_err());
    }
}
