//! Full reset, quick in-place refresh, card binding and cleanup.

use super::{ActionState, ClosureCounts, ListScope, TabListEngine};
use crate::card::{Card, CardAction, CardId, CardKey, CardType, CardValue};
use crate::collection::{ClosedFrom, TabGroupView};
use crate::error::{ModelError, invariant_violation};
use std::collections::BTreeMap;
use tab_grid_config::TabId;

impl TabListEngine {
    /// Reset the list to `items` (representatives or group members).
    ///
    /// `None` hides the list: events stop being handled and the cards are
    /// cleared. When `items` matches the tab cards already present (allowing a
    /// group card to be relabeled to a new representative of the same group)
    /// every row is refreshed in place instead of rebuilt. Returns whether the
    /// list could be shown without rebuilding.
    ///
    /// `quick` skips the forced live-thumbnail capture of the selected card.
    pub fn reset(&mut self, view: &dyn TabGroupView, items: Option<&[TabId]>, quick: bool) -> bool {
        self.showing = items.is_some();
        // A reset supersedes any delayed add.
        self.tab_to_add_delayed = None;
        self.last_selected_index = None;
        self.scope_group = match (self.settings.scope, items) {
            (ListScope::SingleGroup, Some(items)) => {
                items.first().and_then(|&tab| view.group_of(tab))
            }
            _ => None,
        };

        if self.tabs_unchanged(view, items) {
            let Some(items) = items else {
                return true;
            };
            for (rank, &tab) in items.iter().enumerate() {
                let index = self.cards.index_of_nth_tab_card(rank);
                let Some(card) = self.cards.get(index) else {
                    continue;
                };
                let updating_id = card.id() != CardId::Tab(tab);
                self.update_tab(view, index, tab, updating_id, quick);
            }
            log::info!(
                "Quick reset of {:?} list with {} items",
                self.settings.scope,
                items.len()
            );
            return true;
        }

        self.cards.clear();
        let Some(items) = items else {
            return true;
        };
        for &tab in items {
            let index = self.cards.len();
            self.add_tab_card(view, index, tab);
        }
        log::info!(
            "Rebuilt {:?} list with {} cards",
            self.settings.scope,
            self.cards.len()
        );
        items.is_empty()
    }

    /// Tab cards already match `items`, position by position.
    fn tabs_unchanged(&self, view: &dyn TabGroupView, items: Option<&[TabId]>) -> bool {
        let current = self.cards.tab_ids();
        let Some(items) = items else {
            return current.is_empty();
        };
        if current.len() != items.len() {
            return false;
        }
        current.iter().zip(items).all(|(&card_tab, &tab)| {
            if card_tab == tab {
                return true;
            }
            // A group whose shown tab changed keeps its card.
            self.is_representative_scope()
                && view.tab(card_tab).is_some()
                && view.group_of(card_tab).is_some()
                && view.group_of(card_tab) == view.group_of(tab)
        })
    }

    /// Called once the list has been hidden: stops event handling and
    /// replays a delayed add, selecting it.
    pub fn post_hiding(&mut self, view: &dyn TabGroupView) {
        self.showing = false;
        if let Some(tab) = self.tab_to_add_delayed.take() {
            log::debug!("Replaying delayed add of tab {}", tab);
            let index = self.on_tab_added(view, tab);
            self.select_cards(self.last_selected_index, index);
        }
    }

    /// Release per-row fetch resources without removing cards.
    pub fn soft_cleanup(&mut self) {
        for index in 0..self.cards.len() {
            if self.cards.get(index).is_some_and(Card::is_tab_like) {
                self.cards.clear_property(index, CardKey::ThumbnailFetcher);
                self.cards.clear_property(index, CardKey::Thumbnail);
                self.cards.clear_property(index, CardKey::FaviconFetcher);
            }
        }
        crate::debug_info!("ENGINE", "soft cleanup of {} cards", self.cards.len());
    }

    /// Soft cleanup plus a flush of the closure bookkeeping. Returns the
    /// counters accumulated since the previous hard cleanup.
    pub fn hard_cleanup(&mut self) -> BTreeMap<ClosedFrom, ClosureCounts> {
        self.soft_cleanup();
        self.closures_in_flight.clear();
        let counts = std::mem::take(&mut self.closure_counts);
        for (origin, count) in &counts {
            log::info!(
                "Closures from {:?}: {} committed, {} undone",
                origin,
                count.committed,
                count.undone
            );
        }
        counts
    }

    /// Drop every card and stop handling events, as when the list's owner
    /// goes away. Returns the flushed closure counters.
    pub fn release(&mut self) -> BTreeMap<ClosedFrom, ClosureCounts> {
        self.showing = false;
        self.tab_to_add_delayed = None;
        let counts = self.hard_cleanup();
        self.cards.clear();
        counts
    }

    // ========================================================================
    // Card creation and binding
    // ========================================================================

    /// Insert `tab`'s card at `index` and bind it.
    pub(super) fn add_tab_card(&mut self, view: &dyn TabGroupView, index: usize, tab: TabId) {
        let card_type = self.card_type_for(view, tab);
        match self.cards.insert(index, Card::for_tab(tab, card_type)) {
            Ok(()) => self.update_tab(view, index, tab, false, false),
            Err(err @ ModelError::DuplicateCard(_)) => invariant_violation(&err),
            Err(err) => log::debug!("Dropped card for tab {}: {}", tab, err),
        }
    }

    /// Add a card for `tab` where it belongs, unless it already has one.
    ///
    /// In representative scope a tab that joined an existing group gets no
    /// card of its own; the group card is refreshed instead.
    pub(super) fn on_tab_added(&mut self, view: &dyn TabGroupView, tab: TabId) -> Option<usize> {
        if let Some(index) = self.index_of_tab(tab) {
            return Some(index);
        }
        let rank = match self.settings.scope {
            ListScope::Representatives => {
                if view.is_in_group(tab) && self.group_card_index(view, tab).is_some() {
                    self.refresh_group_card(view, tab);
                    return self.index_of_tab(tab);
                }
                match view.representatives().iter().position(|&rep| rep == tab) {
                    Some(rank) => rank,
                    None => {
                        self.refresh_group_card(view, tab);
                        return None;
                    }
                }
            }
            ListScope::SingleGroup => {
                let members = match self.scope_group {
                    Some(group) => view.group_members(group),
                    None => {
                        let first = self.cards.tab_ids().first().copied()?;
                        view.related_tabs(first)
                    }
                };
                members.iter().position(|&member| member == tab)?
            }
        };
        let index = self.cards.index_of_nth_tab_card(rank);
        self.add_tab_card(view, index, tab);
        self.index_of_tab(tab)
    }

    /// Refresh the card that stands for `tab`'s group, relabeling it to the
    /// group's current representative.
    pub(super) fn refresh_group_card(&mut self, view: &dyn TabGroupView, tab: TabId) {
        let Some(rep) = view.representative_of(tab) else {
            return;
        };
        if let Some(index) = self.group_card_index(view, tab) {
            let index = self.claim_group_card(view, index, rep);
            self.update_tab(view, index, rep, true, false);
        }
    }

    /// Make the card at `index` the only card for `rep`'s group by removing
    /// any other card that stands for one of its members. Returns the
    /// card's index after removals.
    pub(super) fn claim_group_card(
        &mut self,
        view: &dyn TabGroupView,
        mut index: usize,
        rep: TabId,
    ) -> usize {
        for member in view.related_tabs(rep) {
            match self.index_of_tab(member) {
                Some(other) if other != index => {
                    log::debug!("Dropping stale card for tab {} at {}", member, other);
                    if self.cards.remove_at(other).is_ok() && other < index {
                        index -= 1;
                    }
                }
                _ => {}
            }
        }
        index
    }

    pub(super) fn card_type_for(&self, view: &dyn TabGroupView, tab: TabId) -> CardType {
        if self.is_representative_scope() && view.is_in_group(tab) {
            CardType::TabGroup
        } else {
            CardType::Tab
        }
    }

    fn is_tab_selected(&self, view: &dyn TabGroupView, tab: TabId) -> bool {
        match self.settings.action_state {
            ActionState::Closable => view.selected_tab() == Some(tab),
            ActionState::Selectable => self
                .selection
                .as_ref()
                .is_some_and(|selection| selection.is_selected(tab)),
        }
    }

    /// Bind the card at `index` to `tab`.
    ///
    /// With `updating_id` the card is relabeled to `tab` first; otherwise the
    /// card must already carry `tab`'s id.
    pub(super) fn update_tab(
        &mut self,
        view: &dyn TabGroupView,
        index: usize,
        tab: TabId,
        updating_id: bool,
        quick: bool,
    ) {
        let Some(current) = self.cards.get(index).map(Card::id) else {
            return;
        };
        if view.tab(tab).is_none() {
            return;
        }
        if updating_id {
            if let Err(err) = self.cards.set_id(index, CardId::Tab(tab)) {
                invariant_violation(&err);
                return;
            }
        } else if current != CardId::Tab(tab) {
            invariant_violation(&ModelError::IndexMismatch {
                id: CardId::Tab(tab),
                index,
                found: current,
            });
            return;
        }

        let card_type = self.card_type_for(view, tab);
        let in_group = card_type == CardType::TabGroup;
        self.cards.set_card_type(index, card_type);

        let selected = self.is_tab_selected(view, tab);
        let action = match self.settings.action_state {
            ActionState::Selectable => CardAction::ToggleSelection,
            ActionState::Closable if in_group => CardAction::OpenGroup,
            ActionState::Closable => CardAction::SelectTab,
        };
        self.cards
            .set_property(index, CardKey::IsSelected, CardValue::Flag(selected));
        self.cards
            .set_property(index, CardKey::Action, CardValue::Action(action));
        self.cards.set_property(
            index,
            CardKey::CardSize,
            CardValue::Size(self.settings.card_size),
        );
        self.bind_text(view, index, tab);
        self.update_favicon(view, index, tab);

        let has_fetcher = self
            .cards
            .get(index)
            .is_some_and(|card| card.thumbnail_fetcher().is_some());
        let force = selected && !quick;
        let force_last_selected =
            self.is_representative_scope() && self.last_selected_index == Some(index) && !quick;
        if !has_fetcher || force || updating_id || force_last_selected || in_group {
            self.install_thumbnail_fetcher(index, tab, force);
        }
    }

    /// Title, domain, color, count and accessibility strings.
    pub(super) fn bind_text(&mut self, view: &dyn TabGroupView, index: usize, tab: TabId) {
        let Some(info) = view.tab(tab) else {
            return;
        };
        let group = if self.is_representative_scope() {
            view.group_of(tab)
        } else {
            None
        };

        match group {
            Some(group) => {
                let members = view.group_members(group);
                let count = members.len();
                let title = match view.group_title(group) {
                    Some(title) if !title.is_empty() => title.to_string(),
                    _ => tab_count_label(count),
                };
                let domains: Vec<&str> = members
                    .iter()
                    .filter_map(|&member| view.tab(member))
                    .map(|member| member.url_domain())
                    .filter(|domain| !domain.is_empty())
                    .collect();
                let description = match view.group_title(group) {
                    Some(title) if !title.is_empty() => {
                        format!("{title} group, {}", tab_count_label(count))
                    }
                    _ => format!("Group with {}", tab_count_label(count)),
                };
                let close_description = format!("Close {title} group");
                let action_description = format!("Open the {title} group");
                self.cards
                    .set_property(index, CardKey::Title, CardValue::Text(title));
                self.cards.set_property(
                    index,
                    CardKey::UrlDomain,
                    CardValue::Text(domains.join(", ")),
                );
                self.cards
                    .set_property(index, CardKey::TabCount, CardValue::Count(count));
                self.cards.set_property(
                    index,
                    CardKey::GroupColor,
                    CardValue::Color(view.group_color(group)),
                );
                self.cards.set_property(
                    index,
                    CardKey::ContentDescription,
                    CardValue::Text(description),
                );
                self.cards.set_property(
                    index,
                    CardKey::CloseButtonDescription,
                    CardValue::Text(close_description),
                );
                self.cards.set_property(
                    index,
                    CardKey::ActionButtonDescription,
                    CardValue::Text(action_description),
                );
            }
            None => {
                let title = display_title(&info.title, info.url_domain());
                self.cards.set_property(
                    index,
                    CardKey::ContentDescription,
                    CardValue::Text(format!("Tab: {title}")),
                );
                self.cards.set_property(
                    index,
                    CardKey::CloseButtonDescription,
                    CardValue::Text(format!("Close {title} tab")),
                );
                self.cards.set_property(
                    index,
                    CardKey::UrlDomain,
                    CardValue::Text(info.url_domain().to_string()),
                );
                self.cards
                    .set_property(index, CardKey::Title, CardValue::Text(title));
                self.cards.clear_property(index, CardKey::TabCount);
                self.cards.clear_property(index, CardKey::GroupColor);
                self.cards
                    .clear_property(index, CardKey::ActionButtonDescription);
            }
        }
    }

    /// Rebind every tab card from the collection
    pub(super) fn rebind_all(&mut self, view: &dyn TabGroupView) {
        for index in 0..self.cards.len() {
            if let Some(tab) = self.cards.get(index).and_then(Card::tab_id) {
                self.update_tab(view, index, tab, false, true);
            }
        }
    }

    /// Move the selected flag from `old` to `new`, refreshing both
    /// thumbnails. No other card keeps the flag.
    pub(super) fn select_cards(&mut self, old: Option<usize>, new: Option<usize>) {
        if let Some(old) = old.filter(|&old| old < self.cards.len()) {
            self.cards
                .set_property(old, CardKey::IsSelected, CardValue::Flag(false));
            if self.is_representative_scope()
                && let Some(tab) = self.cards.get(old).and_then(Card::tab_id)
            {
                self.install_thumbnail_fetcher(old, tab, false);
            }
        }
        if let Some(new) = new.filter(|&new| new < self.cards.len()) {
            self.cards
                .set_property(new, CardKey::IsSelected, CardValue::Flag(true));
            if let Some(tab) = self.cards.get(new).and_then(Card::tab_id) {
                self.install_thumbnail_fetcher(new, tab, true);
            }
        }
        for index in 0..self.cards.len() {
            if Some(index) != new && self.cards.get(index).is_some_and(Card::is_selected) {
                self.cards
                    .set_property(index, CardKey::IsSelected, CardValue::Flag(false));
            }
        }
    }
}

pub(crate) fn tab_count_label(count: usize) -> String {
    if count == 1 {
        "1 tab".to_string()
    } else {
        format!("{count} tabs")
    }
}

/// Tab title with fallbacks for pages that have not reported one
fn display_title(title: &str, domain: &str) -> String {
    if !title.is_empty() {
        title.to_string()
    } else if !domain.is_empty() {
        domain.to_string()
    } else {
        "New tab".to_string()
    }
}
