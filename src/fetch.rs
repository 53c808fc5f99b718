//! Thumbnail and favicon fetch descriptors and provider adapters.
//!
//! The engine never fetches anything itself. When a card needs an image it
//! installs a descriptor on the card and hands a copy to the provider. The
//! provider answers later, on the same event loop, through
//! `TabListEngine::complete_thumbnail` / `complete_favicon`. A result is only
//! applied while the card still carries an equal descriptor; each descriptor
//! carries a generation number so a re-requested card rejects older results.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tab_grid_config::TabId;

/// Request for a tab's thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailFetcher {
    pub tab_id: TabId,
    pub generation: u64,
    /// Capture the live page instead of reusing a cached capture
    pub force_update: bool,
}

/// What a favicon should be derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaviconSource {
    /// A single page
    Page { url: String },
    /// Composite of the first members of a group
    Group { urls: Vec<String> },
    /// No url known yet
    Default,
}

/// Request for a card's favicon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconFetcher {
    pub tab_id: TabId,
    pub generation: u64,
    pub source: FaviconSource,
}

/// Result delivered by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Opaque handle to the fetched image
    Image(u64),
    /// Provider had nothing for this request
    Empty,
    /// Provider failed; the reason is only logged
    Failed(String),
}

/// Monotonic source of descriptor generations.
///
/// Clones share one counter. Engines whose results are routed through the
/// same provider must share a source, otherwise two lists could hand out
/// equal descriptors for the same tab.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    last: Rc<Cell<u64>>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let next = self.last.get() + 1;
        self.last.set(next);
        next
    }
}

pub trait ThumbnailProvider {
    fn request_thumbnail(&mut self, fetcher: &ThumbnailFetcher);
}

pub trait FaviconProvider {
    fn request_favicon(&mut self, fetcher: &FaviconFetcher);
}

/// A request recorded by [`FetchQueue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Thumbnail(ThumbnailFetcher),
    Favicon(FaviconFetcher),
}

/// Provider that queues requests for the host to answer later.
///
/// Clones share one queue, so the engine can own one handle while the host
/// keeps another to drain and answer requests.
#[derive(Debug, Clone, Default)]
pub struct FetchQueue {
    pending: Rc<RefCell<Vec<FetchRequest>>>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request made since the last call
    pub fn take_pending(&self) -> Vec<FetchRequest> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl ThumbnailProvider for FetchQueue {
    fn request_thumbnail(&mut self, fetcher: &ThumbnailFetcher) {
        self.pending
            .borrow_mut()
            .push(FetchRequest::Thumbnail(fetcher.clone()));
    }
}

impl FaviconProvider for FetchQueue {
    fn request_favicon(&mut self, fetcher: &FaviconFetcher) {
        self.pending
            .borrow_mut()
            .push(FetchRequest::Favicon(fetcher.clone()));
    }
}
