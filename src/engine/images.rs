//! Thumbnail and favicon descriptors installed on cards, and the results that
//! come back for them.

use super::TabListEngine;
use crate::card::{Card, CardId, CardKey, CardValue, ImageState};
use crate::collection::TabGroupView;
use crate::fetch::{FaviconFetcher, FaviconSource, FetchOutcome, ThumbnailFetcher};
use tab_grid_config::TabId;

/// Group favicons are composed from at most this many members
const GROUP_FAVICON_MEMBERS: usize = 4;

impl TabListEngine {
    /// Install a fresh thumbnail descriptor on the card at `index` and ask
    /// the provider for it.
    ///
    /// Nothing happens while hidden, with thumbnails disabled, or without a
    /// provider.
    pub(super) fn install_thumbnail_fetcher(
        &mut self,
        index: usize,
        tab: TabId,
        force_update: bool,
    ) {
        if !self.showing || !self.settings.thumbnails {
            return;
        }
        let Some(provider) = self.thumbnails.as_mut() else {
            return;
        };
        let fetcher = ThumbnailFetcher {
            tab_id: tab,
            generation: self.generations.next(),
            force_update,
        };
        provider.request_thumbnail(&fetcher);
        self.cards.set_property(
            index,
            CardKey::ThumbnailFetcher,
            CardValue::ThumbnailFetcher(fetcher),
        );
    }

    /// Install a favicon descriptor when the card's favicon source changed.
    pub(super) fn update_favicon(&mut self, view: &dyn TabGroupView, index: usize, tab: TabId) {
        let source = self.favicon_source(view, tab);
        let unchanged = self
            .cards
            .get(index)
            .and_then(Card::favicon_fetcher)
            .is_some_and(|current| current.tab_id == tab && current.source == source);
        if unchanged {
            return;
        }
        self.install_favicon_fetcher(index, tab, source);
    }

    /// Install a favicon descriptor unconditionally, e.g. after the page
    /// reported a new icon.
    pub(super) fn refresh_favicon(&mut self, view: &dyn TabGroupView, index: usize, tab: TabId) {
        let source = self.favicon_source(view, tab);
        self.install_favicon_fetcher(index, tab, source);
    }

    fn install_favicon_fetcher(&mut self, index: usize, tab: TabId, source: FaviconSource) {
        let Some(provider) = self.favicons.as_mut() else {
            return;
        };
        let fetcher = FaviconFetcher {
            tab_id: tab,
            generation: self.generations.next(),
            source,
        };
        provider.request_favicon(&fetcher);
        self.cards.set_property(
            index,
            CardKey::FaviconFetcher,
            CardValue::FaviconFetcher(fetcher),
        );
    }

    fn favicon_source(&self, view: &dyn TabGroupView, tab: TabId) -> FaviconSource {
        if self.is_representative_scope()
            && let Some(group) = view.group_of(tab)
        {
            let urls: Vec<String> = view
                .group_members(group)
                .into_iter()
                .filter_map(|member| view.tab(member))
                .map(|member| member.url.clone())
                .take(GROUP_FAVICON_MEMBERS)
                .collect();
            return FaviconSource::Group { urls };
        }
        match view.tab(tab) {
            Some(info) if !info.url.is_empty() => FaviconSource::Page {
                url: info.url.clone(),
            },
            _ => FaviconSource::Default,
        }
    }

    /// Apply a thumbnail result.
    ///
    /// Returns false when the result is stale: the card is gone or now
    /// carries a different descriptor.
    pub fn complete_thumbnail(
        &mut self,
        fetcher: &ThumbnailFetcher,
        outcome: FetchOutcome,
    ) -> bool {
        let Some(index) = self.cards.index_of(CardId::Tab(fetcher.tab_id)) else {
            crate::debug_trace!("IMAGES", "thumbnail for gone tab {}", fetcher.tab_id);
            return false;
        };
        let current = self.cards.get(index).and_then(Card::thumbnail_fetcher);
        if current != Some(fetcher) {
            crate::debug_trace!(
                "IMAGES",
                "stale thumbnail generation {} for tab {}",
                fetcher.generation,
                fetcher.tab_id
            );
            return false;
        }
        let image = image_state(outcome, "thumbnail", fetcher.tab_id);
        self.cards
            .set_property(index, CardKey::Thumbnail, CardValue::Image(image));
        true
    }

    /// Apply a favicon result; same staleness rule as thumbnails.
    pub fn complete_favicon(&mut self, fetcher: &FaviconFetcher, outcome: FetchOutcome) -> bool {
        let Some(index) = self.cards.index_of(CardId::Tab(fetcher.tab_id)) else {
            return false;
        };
        let current = self.cards.get(index).and_then(Card::favicon_fetcher);
        if current != Some(fetcher) {
            crate::debug_trace!(
                "IMAGES",
                "stale favicon generation {} for tab {}",
                fetcher.generation,
                fetcher.tab_id
            );
            return false;
        }
        let image = image_state(outcome, "favicon", fetcher.tab_id);
        self.cards
            .set_property(index, CardKey::Favicon, CardValue::Image(image));
        true
    }
}

fn image_state(outcome: FetchOutcome, what: &str, tab: TabId) -> ImageState {
    match outcome {
        FetchOutcome::Image(handle) => ImageState::Ready(handle),
        FetchOutcome::Empty => ImageState::Placeholder,
        FetchOutcome::Failed(reason) => {
            log::warn!("{} fetch for tab {} failed: {}", what, tab, reason);
            ImageState::Placeholder
        }
    }
}
