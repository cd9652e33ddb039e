//! Current-location state machine.
//!
//! [`Navigator`] owns the one [`NavigationState`] of a view. Every listing
//! request is stamped with a fresh [`RequestToken`]; a response is applied
//! only while its token is still the latest one, so a slow response for a
//! location the user already left can never overwrite the listing shown.
//!
//! ```text
//!            navigate_to / refresh
//!   Idle ─────────────────────────────▶ Loading(token)
//!    ▲                                   │        │
//!    │      response, token current      │        │ failure, token current
//!    └───────────────────────────────────┘        ▼
//!                                              Failed(error)
//! ```
//!
//! Responses carrying an older token are dropped in every state.

use std::cell::RefCell;
use std::fmt;

use log::{debug, warn};

use crate::core::error::{DriveError, ListError};
use crate::models::{Listing, PathAddress};
use crate::remote::RemoteStore;

// =============================================================================
// Tokens and Requests
// =============================================================================

/// Marker minted per listing request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A listing request issued by the navigator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub token: RequestToken,
    pub address: PathAddress,
}

/// What happened to a completed listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The listing became the current one.
    Applied,
    /// The request was current and failed.
    Failed(DriveError),
    /// A later request superseded this one; nothing changed.
    Discarded,
}

// =============================================================================
// NavigationState
// =============================================================================

/// Phase of the current location's listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavPhase {
    /// The listing matches the latest response for the location.
    Idle,
    /// A request is in flight.
    Loading(RequestToken),
    /// The latest request failed.
    Failed(DriveError),
}

/// Single source of truth for where a view is and what it shows.
#[derive(Clone, Debug)]
pub struct NavigationState {
    location: PathAddress,
    phase: NavPhase,
    /// Last successful listing. May belong to a previous location.
    listing: Option<Listing>,
    last_token: u64,
}

impl NavigationState {
    pub fn new(location: PathAddress) -> Self {
        Self {
            location,
            phase: NavPhase::Idle,
            listing: None,
            last_token: 0,
        }
    }

    pub fn location(&self) -> &PathAddress {
        &self.location
    }

    pub fn phase(&self) -> &NavPhase {
        &self.phase
    }

    /// Listing for the current location, if one has been received.
    ///
    /// While loading or failed this is the last good listing for the same
    /// location; see [`NavigationState::is_stale`].
    pub fn listing(&self) -> Option<&Listing> {
        self.listing
            .as_ref()
            .filter(|listing| listing.address == self.location)
    }

    /// True unless the listing is the answer to the latest request.
    pub fn is_stale(&self) -> bool {
        !matches!(self.phase, NavPhase::Idle)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.last_token
    }

    /// Move to `location` and mint the token for its listing request.
    fn begin(&mut self, location: PathAddress) -> ListRequest {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.location = location;
        self.phase = NavPhase::Loading(token);
        ListRequest {
            token,
            address: self.location.clone(),
        }
    }

    fn complete(
        &mut self,
        request: &ListRequest,
        result: Result<Listing, ListError>,
    ) -> Completion {
        if !self.is_current(request.token) {
            debug!(
                "discarding listing {} for {}: superseded",
                request.token, request.address
            );
            return Completion::Discarded;
        }

        match result {
            Ok(listing) => {
                self.listing = Some(listing);
                self.phase = NavPhase::Idle;
                Completion::Applied
            }
            Err(err) => {
                let err = DriveError::from(err);
                warn!("listing {} failed: {}", request.address, err);
                self.phase = NavPhase::Failed(err.clone());
                Completion::Failed(err)
            }
        }
    }

    /// Mutate the listing fetched for `captured`, if it is still on screen.
    fn mutate_listing(&mut self, captured: &PathAddress, f: impl FnOnce(&mut Listing)) -> bool {
        if captured != &self.location {
            warn!(
                "dropping listing update for {}: view moved to {}",
                captured, self.location
            );
            return false;
        }
        match self.listing.as_mut() {
            Some(listing) if &listing.address == captured => {
                f(listing);
                true
            }
            _ => false,
        }
    }
}

/// Point-in-time copy of a view's navigation state, for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavView {
    pub location: PathAddress,
    pub phase: NavPhase,
    pub listing: Option<Listing>,
    pub stale: bool,
}

// =============================================================================
// Navigator
// =============================================================================

/// Drives [`NavigationState`] against a [`RemoteStore`].
///
/// All methods take `&self`: several operations may be in flight at once on a
/// single thread. No `RefCell` borrow is held across an `.await`.
pub struct Navigator<C> {
    client: C,
    state: RefCell<NavigationState>,
    page_size: u32,
}

impl<C: RemoteStore> Navigator<C> {
    pub fn new(client: C, start: PathAddress, page_size: u32) -> Self {
        Self {
            client,
            state: RefCell::new(NavigationState::new(start)),
            page_size: page_size.max(1),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn location(&self) -> PathAddress {
        self.state.borrow().location().clone()
    }

    pub fn phase(&self) -> NavPhase {
        self.state.borrow().phase().clone()
    }

    /// Listing for the current location (possibly stale).
    pub fn listing(&self) -> Option<Listing> {
        self.state.borrow().listing().cloned()
    }

    pub fn snapshot(&self) -> NavView {
        let state = self.state.borrow();
        NavView {
            location: state.location().clone(),
            phase: state.phase().clone(),
            listing: state.listing().cloned(),
            stale: state.is_stale(),
        }
    }

    /// Move to `address` and list it.
    ///
    /// Resolves once this request completes. A superseded request resolves
    /// with `Ok(())` and leaves the state untouched.
    pub async fn navigate_to(&self, address: PathAddress) -> Result<(), DriveError> {
        let request = self.begin_navigation(address);
        self.run(request).await
    }

    /// Re-list the current location under a new token.
    pub async fn refresh(&self) -> Result<(), DriveError> {
        let request = self.begin_refresh();
        self.run(request).await
    }

    /// First half of a navigation: switch location and mint a token.
    ///
    /// Pair with [`Navigator::fetch`] and [`Navigator::complete`] when the
    /// host schedules the remote call itself.
    pub fn begin_navigation(&self, address: PathAddress) -> ListRequest {
        let request = self.state.borrow_mut().begin(address);
        debug!("listing {} as {}", request.address, request.token);
        request
    }

    /// First half of a refresh.
    pub fn begin_refresh(&self) -> ListRequest {
        let location = self.location();
        self.begin_navigation(location)
    }

    /// Fetch every page of `request.address`.
    ///
    /// Stops early once the request is superseded; the partial result is
    /// then discarded by [`Navigator::complete`].
    pub async fn fetch(&self, request: &ListRequest) -> Result<Listing, ListError> {
        let mut listing = Listing::empty(request.address.clone());
        let mut after = 0u32;

        loop {
            let page = self
                .client
                .list_folder(&request.address, self.page_size, after)
                .await?;
            let received = (page.folders.len() + page.files.len()) as u32;
            // The offset cursor shifts if the folder changes between pages;
            // merging by id keeps one entry per id
            for folder in page.folders {
                listing.upsert_folder(folder);
            }
            for file in page.files {
                listing.upsert_file(file);
            }

            if !page.has_more || received == 0 {
                break;
            }
            if !self.state.borrow().is_current(request.token) {
                break;
            }
            after += received;
        }

        Ok(listing)
    }

    /// Apply the outcome of `request` if its token is still current.
    pub fn complete(
        &self,
        request: &ListRequest,
        result: Result<Listing, ListError>,
    ) -> Completion {
        self.state.borrow_mut().complete(request, result)
    }

    /// Apply `f` to the listing of `captured` if that location is still shown.
    ///
    /// Returns whether the listing was mutated.
    pub fn update_listing(&self, captured: &PathAddress, f: impl FnOnce(&mut Listing)) -> bool {
        self.state.borrow_mut().mutate_listing(captured, f)
    }

    async fn run(&self, request: ListRequest) -> Result<(), DriveError> {
        let result = self.fetch(&request).await;
        match self.complete(&request, result) {
            Completion::Applied | Completion::Discarded => Ok(()),
            Completion::Failed(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RemoteUnavailable;
    use crate::models::StorageTag;
    use crate::remote::MemoryStore;

    fn at(s: &str) -> PathAddress {
        PathAddress::parse(s).unwrap()
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed_file(&at("BrowserCache::docs/a.txt"), StorageTag::BrowserCache);
        store.seed_file(&at("BrowserCache::music/b.mp3"), StorageTag::BrowserCache);
        store
    }

    fn names(listing: &Listing) -> Vec<String> {
        listing.sorted().iter().map(|e| e.name().to_string()).collect()
    }

    #[tokio::test]
    async fn test_navigate_lists_location() {
        let nav = Navigator::new(store(), at("BrowserCache::"), 10);
        assert!(nav.listing().is_none());

        nav.navigate_to(at("BrowserCache::docs/")).await.unwrap();
        let view = nav.snapshot();
        assert_eq!(view.location, at("BrowserCache::docs/"));
        assert_eq!(view.phase, NavPhase::Idle);
        assert!(!view.stale);
        assert_eq!(names(view.listing.as_ref().unwrap()), ["a.txt"]);
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let nav = Navigator::new(store(), at("BrowserCache::"), 10);
        let a = at("BrowserCache::docs/");
        let b = at("BrowserCache::music/");

        nav.navigate_to(a.clone()).await.unwrap();

        // B is requested, then A again before B's response arrives
        let req_b = nav.begin_navigation(b.clone());
        let req_a = nav.begin_navigation(a.clone());
        let resp_b = nav.fetch(&req_b).await;
        let resp_a = nav.fetch(&req_a).await;

        assert_eq!(nav.complete(&req_a, resp_a), Completion::Applied);
        assert_eq!(nav.complete(&req_b, resp_b), Completion::Discarded);

        assert_eq!(nav.location(), a);
        assert_eq!(names(&nav.listing().unwrap()), ["a.txt"]);
        assert_eq!(nav.phase(), NavPhase::Idle);
    }

    #[tokio::test]
    async fn test_pending_location_shows_no_listing() {
        let nav = Navigator::new(store(), at("BrowserCache::"), 10);
        nav.navigate_to(at("BrowserCache::docs/")).await.unwrap();

        let req = nav.begin_navigation(at("BrowserCache::music/"));
        assert!(nav.listing().is_none());
        assert!(matches!(nav.phase(), NavPhase::Loading(t) if t == req.token));
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_listing() {
        let nav = Navigator::new(store(), at("BrowserCache::"), 10);
        nav.navigate_to(at("BrowserCache::docs/")).await.unwrap();

        nav.client().set_offline(true);
        let err = nav.refresh().await.unwrap_err();
        assert!(matches!(err, DriveError::RemoteUnavailable(_)));

        let view = nav.snapshot();
        assert!(view.stale);
        assert!(matches!(view.phase, NavPhase::Failed(DriveError::RemoteUnavailable(_))));
        assert_eq!(names(view.listing.as_ref().unwrap()), ["a.txt"]);
    }

    #[tokio::test]
    async fn test_superseded_failure_is_silent() {
        let nav = Navigator::new(store(), at("BrowserCache::"), 10);
        let stale = nav.begin_navigation(at("BrowserCache::music/"));
        nav.navigate_to(at("BrowserCache::docs/")).await.unwrap();

        let outcome = nav.complete(&stale, Err(RemoteUnavailable("lost".into()).into()));
        assert_eq!(outcome, Completion::Discarded);
        assert_eq!(nav.phase(), NavPhase::Idle);
    }

    #[tokio::test]
    async fn test_fetch_collects_all_pages() {
        let store = MemoryStore::new();
        for i in 0..7 {
            let path = at("HardDrive::").join(&format!("f{i}")).unwrap();
            store.seed_file(&path, StorageTag::HardDrive);
        }
        let nav = Navigator::new(store, at("HardDrive::"), 3);
        nav.refresh().await.unwrap();

        assert_eq!(nav.listing().unwrap().len(), 7);
        assert_eq!(nav.client().list_calls(), 3);
    }

    #[tokio::test]
    async fn test_update_listing_respects_location() {
        let nav = Navigator::new(store(), at("BrowserCache::"), 10);
        let docs = at("BrowserCache::docs/");
        nav.navigate_to(docs.clone()).await.unwrap();

        assert!(nav.update_listing(&docs, |l| l.files.clear()));
        assert!(nav.listing().unwrap().is_empty());

        nav.navigate_to(at("BrowserCache::music/")).await.unwrap();
        assert!(!nav.update_listing(&docs, |l| l.files.clear()));
        assert_eq!(nav.listing().unwrap().len(), 1);
    }
}
