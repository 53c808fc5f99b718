//! List synchronization engine.
//!
//! [`TabListEngine`] owns a [`CardSequence`] and keeps it in step with a tab
//! collection it does not own. The collection is passed into every call as a
//! [`TabGroupView`] (or a [`TabCollection`](crate::collection::TabCollection)
//! for user actions that mutate it), and change notifications arrive through
//! [`TabListEngine::handle_event`].
//!
//! Sub-modules:
//! - `reset`        - full reset, quick in-place refresh, card binding, cleanup
//! - `tab_events`   - add / select / close / undo / remove / content changes
//! - `group_events` - merge / split / title / color / reorder
//! - `images`       - thumbnail and favicon descriptors and their results
//! - `actions`      - user input routed through the action delegates
//! - `messages`     - message and divider cards

mod actions;
mod group_events;
mod images;
mod messages;
mod reset;
mod tab_events;

pub use actions::{CloseOutcome, MenuItem};
pub(crate) use reset::tab_count_label;

use crate::card::{CardId, CardSequence, ListObserver};
use crate::collection::{ClosedFrom, TabEvent, TabGroupView};
use crate::delegates::{SelectionDelegate, TabActionDelegate};
use crate::fetch::{FaviconProvider, Generations, ThumbnailProvider};
use std::collections::{BTreeMap, HashMap};
use tab_grid_config::{CardSize, Config, GroupId, TabId};

/// Which cards the engine maintains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// One card per group (labeled by its representative) or ungrouped tab
    Representatives,
    /// One card per tab of a single group
    SingleGroup,
}

/// How taps on cards are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    /// Tap selects, close button closes
    Closable,
    /// Tap toggles membership in the selection delegate's set
    Selectable,
}

/// Engine behavior derived from [`Config`] plus the surface it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub scope: ListScope,
    pub action_state: ActionState,
    /// Surface recorded on closures this engine issues
    pub origin: ClosedFrom,
    pub thumbnails: bool,
    pub delay_add_with_pending_selection: bool,
    pub confirm_close_last_tab: bool,
    pub allow_undo: bool,
    pub card_size: CardSize,
}

impl EngineSettings {
    pub fn from_config(config: &Config, scope: ListScope, origin: ClosedFrom) -> Self {
        Self {
            scope,
            action_state: ActionState::Closable,
            origin,
            thumbnails: config.wants_thumbnails(),
            delay_add_with_pending_selection: config.delay_add_with_pending_selection,
            confirm_close_last_tab: config.confirm_close_last_tab,
            allow_undo: config.allow_undo_on_close,
            card_size: config.grid_card_size,
        }
    }
}

/// Something the owner of the engine should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineNotice {
    /// Single-group scope: membership or group metadata changed. Carries a
    /// tab still in the group, or `None` when the group is gone.
    GroupContentChanged { tab: Option<TabId> },
    /// The last tab card was removed
    ScopeEmptied,
}

/// Per-surface closure counters, flushed by `hard_cleanup`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureCounts {
    pub committed: usize,
    pub undone: usize,
}

/// Keeps a [`CardSequence`] synchronized with a tab collection.
pub struct TabListEngine {
    settings: EngineSettings,
    cards: CardSequence,
    /// Observers are attached; events are only handled while showing
    showing: bool,
    /// Group this engine is scoped to in single-group scope
    scope_group: Option<GroupId>,
    /// Tab whose add was deferred until the list hides
    tab_to_add_delayed: Option<TabId>,
    /// Card index of the previously selected card, for thumbnail refresh
    last_selected_index: Option<usize>,
    /// Closures issued by this engine that are still pending
    closures_in_flight: HashMap<TabId, ClosedFrom>,
    closure_counts: BTreeMap<ClosedFrom, ClosureCounts>,
    generations: Generations,
    thumbnails: Option<Box<dyn ThumbnailProvider>>,
    favicons: Option<Box<dyn FaviconProvider>>,
    actions: Box<dyn TabActionDelegate>,
    selection: Option<Box<dyn SelectionDelegate>>,
    notices: Vec<EngineNotice>,
    next_divider: u32,
}

impl TabListEngine {
    pub fn new(settings: EngineSettings, actions: Box<dyn TabActionDelegate>) -> Self {
        Self {
            settings,
            cards: CardSequence::new(),
            showing: false,
            scope_group: None,
            tab_to_add_delayed: None,
            last_selected_index: None,
            closures_in_flight: HashMap::new(),
            closure_counts: BTreeMap::new(),
            generations: Generations::default(),
            thumbnails: None,
            favicons: None,
            actions,
            selection: None,
            notices: Vec::new(),
            next_divider: 0,
        }
    }

    pub fn with_thumbnail_provider(mut self, provider: Box<dyn ThumbnailProvider>) -> Self {
        self.thumbnails = Some(provider);
        self
    }

    pub fn with_favicon_provider(mut self, provider: Box<dyn FaviconProvider>) -> Self {
        self.favicons = Some(provider);
        self
    }

    /// Draw descriptor generations from `generations` instead of a private
    /// counter
    pub fn with_generations(mut self, generations: Generations) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_selection_delegate(mut self, selection: Box<dyn SelectionDelegate>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cards(&self) -> &CardSequence {
        &self.cards
    }

    pub fn add_observer(&mut self, observer: Box<dyn ListObserver>) {
        self.cards.add_observer(observer);
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn scope_group(&self) -> Option<GroupId> {
        self.scope_group
    }

    /// Tab whose insertion is waiting for the list to hide
    pub fn delayed_tab(&self) -> Option<TabId> {
        self.tab_to_add_delayed
    }

    /// Take the notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<EngineNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Switch between closable and selectable presentation, rebinding every
    /// tab card.
    pub fn set_action_state(&mut self, view: &dyn TabGroupView, state: ActionState) {
        if self.settings.action_state == state {
            return;
        }
        self.settings.action_state = state;
        log::info!("Action state changed to {:?}", state);
        self.rebind_all(view);
    }

    pub fn set_card_size(&mut self, size: CardSize) {
        self.settings.card_size = size;
        for index in 0..self.cards.len() {
            if self.cards.get(index).is_some_and(|card| card.is_tab_like()) {
                self.cards.set_property(
                    index,
                    crate::card::CardKey::CardSize,
                    crate::card::CardValue::Size(size),
                );
            }
        }
    }

    /// Handle one collection notification.
    ///
    /// Ignored while hidden and before the collection has restored. Events
    /// naming tabs without cards are no-ops.
    pub fn handle_event(&mut self, view: &dyn TabGroupView, event: &TabEvent) {
        if !self.showing || !view.is_restored() {
            crate::debug_trace!("ENGINE", "ignoring {} while inactive", event.name());
            return;
        }
        crate::debug_log!("ENGINE", "{:?} scope handling {:?}", self.settings.scope, event);

        let had_cards = self.cards.tab_card_count() > 0;
        match *event {
            TabEvent::TabAdded {
                tab,
                launch,
                marked_for_selection,
            } => self.on_tab_added_event(view, tab, launch, marked_for_selection),
            TabEvent::TabSelected {
                tab,
                previous,
                selection,
            } => self.on_tab_selected(view, tab, previous, selection),
            TabEvent::TabWillClose { tab } => self.on_tab_close(view, tab),
            TabEvent::TabClosureUndone { tab, origin } => self.on_closure_undone(view, tab, origin),
            TabEvent::TabClosureCommitted { tab } => self.on_closure_committed(tab),
            TabEvent::TabRemoved { tab } => self.on_tab_removed(view, tab),
            TabEvent::TabContentChanged { tab, change } => {
                self.on_content_changed(view, tab, change)
            }
            TabEvent::GroupMerged {
                tab,
                selected_in_group,
            } => self.on_group_merged(view, tab, selected_in_group),
            TabEvent::GroupSplit {
                tab,
                previous_group_index,
            } => self.on_group_split(view, tab, previous_group_index),
            TabEvent::GroupCreated { destination } => self.on_group_created(view, destination),
            TabEvent::GroupTitleChanged { group, .. } => {
                self.on_group_metadata_changed(view, group, false)
            }
            TabEvent::GroupColorChanged { group, .. } => {
                self.on_group_metadata_changed(view, group, true)
            }
            TabEvent::MovedWithinGroup {
                tab,
                old_index,
                new_index,
            } => self.on_moved_within_group(view, tab, old_index, new_index),
            TabEvent::GroupReordered {
                tab,
                old_index,
                new_index,
            } => self.on_group_reordered(view, tab, old_index, new_index),
        }

        if had_cards && self.cards.tab_card_count() == 0 {
            log::info!("{:?} list lost its last tab card", self.settings.scope);
            self.notices.push(EngineNotice::ScopeEmptied);
        }
    }

    // ========================================================================
    // Card lookup helpers shared by the handlers
    // ========================================================================

    fn index_of_tab(&self, tab: TabId) -> Option<usize> {
        self.cards.index_of(CardId::Tab(tab))
    }

    /// Card standing for `tab`'s group: the tab's own card, else the card of
    /// any related tab
    fn group_card_index(&self, view: &dyn TabGroupView, tab: TabId) -> Option<usize> {
        self.index_of_tab(tab).or_else(|| {
            view.related_tabs(tab)
                .into_iter()
                .find_map(|related| self.index_of_tab(related))
        })
    }

    fn is_representative_scope(&self) -> bool {
        self.settings.scope == ListScope::Representatives
    }
}
