//! Handlers for single-tab notifications.

use super::{ActionState, EngineNotice, ListScope, TabListEngine};
use crate::card::{Card, CardType};
use crate::collection::{ClosedFrom, ContentChange, LaunchType, SelectionType, TabGroupView};
use tab_grid_config::TabId;

impl TabListEngine {
    pub(super) fn on_tab_added_event(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        launch: LaunchType,
        marked_for_selection: bool,
    ) {
        // Opening a tab from the switcher itself leaves the switcher; adding
        // the card now would animate a row nobody will see.
        if self.settings.delay_add_with_pending_selection
            && launch.is_from_switcher_ui()
            && marked_for_selection
        {
            log::debug!("Delaying add of tab {} until the list hides", tab);
            self.tab_to_add_delayed = Some(tab);
            return;
        }
        let inserted = self.on_tab_added(view, tab);
        if self.settings.scope == ListScope::SingleGroup && inserted.is_some() {
            self.notices
                .push(EngineNotice::GroupContentChanged { tab: Some(tab) });
        }
    }

    pub(super) fn on_tab_selected(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        previous: Option<TabId>,
        selection: SelectionType,
    ) {
        if self.settings.action_state == ActionState::Selectable || previous == Some(tab) {
            return;
        }
        crate::debug_log!("ENGINE", "select {} ({:?}) after {:?}", tab, selection, previous);

        let new_index = match self.index_of_tab(tab) {
            Some(index) => Some(index),
            None if self.is_representative_scope() && view.is_in_group(tab) => {
                // The group card is still labeled by the previously shown member.
                self.refresh_group_card(view, tab);
                self.group_card_index(view, tab)
            }
            None => None,
        };
        let old_index = previous.and_then(|previous| {
            if self.is_representative_scope() {
                self.group_card_index(view, previous)
            } else {
                self.index_of_tab(previous)
            }
        });

        self.last_selected_index = old_index;
        if self.tab_to_add_delayed == Some(tab) {
            return;
        }
        self.select_cards(old_index, new_index);
    }

    pub(super) fn on_tab_close(&mut self, view: &dyn TabGroupView, tab: TabId) {
        self.drop_tab(view, tab);
    }

    pub(super) fn on_tab_removed(&mut self, view: &dyn TabGroupView, tab: TabId) {
        self.tab_to_add_delayed = self.tab_to_add_delayed.filter(|&delayed| delayed != tab);
        self.drop_tab(view, tab);
    }

    /// A tab left the collection: remove its card, or keep the card when it
    /// stands for a group that still has live members.
    fn drop_tab(&mut self, view: &dyn TabGroupView, tab: TabId) {
        let Some(index) = self.index_of_tab(tab) else {
            if self.is_representative_scope() {
                if view.tab(tab).is_some() {
                    self.refresh_group_card(view, tab);
                } else {
                    self.refresh_group_counts(view);
                }
            }
            return;
        };

        if self.is_representative_scope() {
            let survivor = if view.tab(tab).is_some() {
                view.group_of(tab)
                    .and_then(|group| view.group_members(group).first().copied())
                    .and_then(|member| view.representative_of(member))
            } else {
                self.vanished_group_successor(view, index)
            };
            if let Some(rep) = survivor {
                log::debug!("Group card for closing tab {} now shows tab {}", tab, rep);
                let index = self.claim_group_card(view, index, rep);
                self.update_tab(view, index, rep, true, false);
                return;
            }
        }

        if self.cards.remove_at(index).is_ok() {
            log::debug!("Removed card for tab {} at {}", tab, index);
        }
        if self.settings.scope == ListScope::SingleGroup {
            let remaining = self.cards.tab_ids().first().copied();
            self.notices
                .push(EngineNotice::GroupContentChanged { tab: remaining });
        }
    }

    /// Successor for a group card whose tab vanished without a trace: the
    /// representative in the same slot, when it is grouped and has no card.
    fn vanished_group_successor(&self, view: &dyn TabGroupView, index: usize) -> Option<TabId> {
        let card = self.cards.get(index)?;
        if card.card_type() != CardType::TabGroup {
            return None;
        }
        let rank = self.cards.cards()[..index]
            .iter()
            .filter(|card| card.is_tab_like())
            .count();
        let rep = view.representatives().get(rank).copied()?;
        (view.is_in_group(rep) && self.index_of_tab(rep).is_none()).then_some(rep)
    }

    /// Rebind group cards whose member count no longer matches the
    /// collection.
    fn refresh_group_counts(&mut self, view: &dyn TabGroupView) {
        for index in 0..self.cards.len() {
            let Some(card) = self.cards.get(index) else {
                continue;
            };
            let Some(tab) = card.tab_id() else {
                continue;
            };
            if card.card_type() == CardType::TabGroup
                && card.tab_count() != Some(view.related_tabs(tab).len())
            {
                self.update_tab(view, index, tab, false, true);
            }
        }
    }

    pub(super) fn on_closure_undone(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        origin: Option<ClosedFrom>,
    ) {
        let inserted = self.on_tab_added(view, tab);
        if self.settings.scope == ListScope::SingleGroup && inserted.is_some() {
            self.notices
                .push(EngineNotice::GroupContentChanged { tab: Some(tab) });
        }
        if let Some(issued) = self.closures_in_flight.remove(&tab) {
            self.closure_counts.entry(issued).or_default().undone += 1;
            log::info!("Closure of tab {} from {:?} undone", tab, origin.unwrap_or(issued));
        }
    }

    pub(super) fn on_closure_committed(&mut self, tab: TabId) {
        if let Some(issued) = self.closures_in_flight.remove(&tab) {
            self.closure_counts.entry(issued).or_default().committed += 1;
        }
    }

    pub(super) fn on_content_changed(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        change: ContentChange,
    ) {
        let index = if self.is_representative_scope() {
            self.group_card_index(view, tab)
        } else {
            self.index_of_tab(tab)
        };
        let Some((index, card_tab)) =
            index.and_then(|index| Some((index, self.cards.get(index).and_then(Card::tab_id)?)))
        else {
            return;
        };
        match change {
            ContentChange::Title => self.bind_text(view, index, card_tab),
            ContentChange::Url => {
                self.bind_text(view, index, card_tab);
                self.update_favicon(view, index, card_tab);
            }
            ContentChange::Favicon => self.refresh_favicon(view, index, card_tab),
        }
    }
}
