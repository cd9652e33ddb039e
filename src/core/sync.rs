//! CRUD operations reconciled with the current listing.
//!
//! Each operation has a fixed update policy:
//!
//! | operation       | on success             | on domain error                        |
//! |-----------------|------------------------|----------------------------------------|
//! | `create_file`   | upsert by id           | surface, listing untouched             |
//! | `create_folder` | upsert by id           | surface, listing untouched             |
//! | `rename`        | patch name + full path | collision / not found: refresh, surface |
//! | `delete`        | remove by id           | not found: remove, no error            |
//!
//! Creation never inserts before the remote confirms. Every mutation is keyed
//! by entry id and applied to whatever the listing is when the call returns,
//! and only if the view still shows the location captured at call time.

use log::{debug, info, warn};

use crate::config::{ConfigError, ExplorerConfig};
use crate::core::error::{DeleteError, DriveError, RenameError};
use crate::core::navigation::{NavView, Navigator};
use crate::models::{
    Entry, FileEntry, FolderEntry, PathAddress, StorageRegistry, StorageTag,
};
use crate::remote::RemoteStore;

/// The UI trigger surface of one explorer view.
pub struct ListingSync<C> {
    nav: Navigator<C>,
    home: PathAddress,
    storage: StorageRegistry,
}

impl<C: RemoteStore> ListingSync<C> {
    /// Create a view positioned at the configured home. Nothing is listed
    /// until the first [`ListingSync::refresh`] or navigation.
    pub fn new(client: C, config: &ExplorerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let home = config.home_address()?;
        let storage = config.storage_registry()?;
        Ok(Self {
            nav: Navigator::new(client, home.clone(), config.page_size),
            home,
            storage,
        })
    }

    pub fn navigator(&self) -> &Navigator<C> {
        &self.nav
    }

    pub fn client(&self) -> &C {
        self.nav.client()
    }

    pub fn home(&self) -> &PathAddress {
        &self.home
    }

    pub fn storage(&self) -> &StorageRegistry {
        &self.storage
    }

    pub fn location(&self) -> PathAddress {
        self.nav.location()
    }

    pub fn snapshot(&self) -> NavView {
        self.nav.snapshot()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub async fn navigate_to(&self, address: PathAddress) -> Result<(), DriveError> {
        self.nav.navigate_to(address).await
    }

    /// Navigate to `address` after checking that a folder lives there.
    ///
    /// A missing folder is `NotFound` and the view stays where it is.
    /// [`ListingSync::navigate_to`] skips the check and lists whatever the
    /// remote reports for the address.
    pub async fn open(&self, address: PathAddress) -> Result<(), DriveError> {
        if self.client().get_folder_by_path(&address).await?.is_none() {
            debug!("not opening {}: no such folder", address);
            return Err(DriveError::NotFound);
        }
        self.nav.navigate_to(address).await
    }

    /// Parse `raw` and open it. A malformed or missing address leaves the
    /// view where it is.
    pub async fn navigate_to_raw(&self, raw: &str) -> Result<(), DriveError> {
        let address = PathAddress::parse(raw)?;
        self.open(address).await
    }

    pub async fn refresh(&self) -> Result<(), DriveError> {
        self.nav.refresh().await
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Create (or update) the file `name` in the current location.
    pub async fn create_file(&self, name: &str) -> Result<FileEntry, DriveError> {
        let location = self.nav.location();
        let target = location.join(name)?;

        let file = self
            .client()
            .create_file(&target, StorageTag::of(&location))
            .await?;

        let merged = file.clone();
        if self.nav.update_listing(&location, |listing| listing.upsert_file(merged)) {
            info!("created file {}", file.full_path);
        }
        Ok(file)
    }

    /// Create the folder `name` in the current location.
    pub async fn create_folder(&self, name: &str) -> Result<FolderEntry, DriveError> {
        let location = self.nav.location();
        let target = location.join(name)?;

        let folder = self
            .client()
            .create_folder(&target, StorageTag::of(&location))
            .await?;

        let merged = folder.clone();
        if self.nav.update_listing(&location, |listing| listing.upsert_folder(merged)) {
            info!("created folder {}", folder.full_path);
        }
        Ok(folder)
    }

    /// Rename `entry` in place.
    ///
    /// On a collision or a vanished entry the local listing cannot be
    /// trusted: it is refreshed once before the error is returned. The
    /// refresh is a single `list_folder` call while the folder fits in one
    /// page and one call per page otherwise.
    pub async fn rename(&self, entry: &Entry, new_name: &str) -> Result<(), DriveError> {
        let location = self.nav.location();
        let new_path = entry.full_path().with_name(new_name)?;

        match self.client().rename_entry(entry.id(), new_name).await {
            Ok(()) => {
                let patched = self.nav.update_listing(&location, |listing| {
                    listing.rename(entry.id(), new_name, new_path);
                });
                if patched {
                    info!("renamed {} to {}", entry.full_path(), new_name);
                }
                Ok(())
            }
            Err(err @ (RenameError::NameCollision | RenameError::NotFound)) => {
                warn!("rename of {} rejected ({}), refreshing", entry.full_path(), err);
                if let Err(refresh_err) = self.nav.refresh().await {
                    warn!("refresh after rejected rename failed: {}", refresh_err);
                }
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete `entry`.
    ///
    /// An entry that is already gone on the remote counts as deleted.
    pub async fn delete(&self, entry: &Entry) -> Result<(), DriveError> {
        let location = self.nav.location();

        match self.client().delete_entry(entry.id()).await {
            Ok(()) => {}
            Err(DeleteError::NotFound) => {
                info!("{} was already deleted remotely", entry.full_path());
            }
            Err(err) => return Err(err.into()),
        }

        self.nav.update_listing(&location, |listing| {
            listing.remove(entry.id());
        });
        Ok(())
    }

    /// Fetch the remote's current record for `entry`.
    ///
    /// The listed copy is replaced with the fresh one. An entry the remote
    /// no longer knows is dropped from the listing and reported as
    /// `NotFound`.
    pub async fn inspect(&self, entry: &Entry) -> Result<Entry, DriveError> {
        let location = self.nav.location();

        match self.client().get_entry_by_id(entry.id()).await? {
            Some(fresh) => {
                let merged = fresh.clone();
                self.nav.update_listing(&location, |listing| {
                    // A rename elsewhere may have moved it out of this folder
                    if merged.full_path().parent().as_ref() != Some(&listing.address) {
                        listing.remove(merged.id());
                        return;
                    }
                    match merged {
                        Entry::Folder(folder) => listing.upsert_folder(folder),
                        Entry::File(file) => listing.upsert_file(file),
                    }
                });
                Ok(fresh)
            }
            None => {
                info!("{} no longer exists remotely", entry.full_path());
                self.nav.update_listing(&location, |listing| {
                    listing.remove(entry.id());
                });
                Err(DriveError::NotFound)
            }
        }
    }
}
