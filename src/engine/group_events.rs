//! Handlers for group membership, metadata and ordering notifications.

use super::{EngineNotice, ListScope, TabListEngine};
use crate::card::{Card, CardType};
use crate::collection::TabGroupView;
use tab_grid_config::{GroupId, TabId};

impl TabListEngine {
    pub(super) fn on_group_merged(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        selected_in_group: TabId,
    ) {
        match self.settings.scope {
            ListScope::Representatives => {
                self.merge_into_group_card(view, tab, selected_in_group)
            }
            ListScope::SingleGroup => {
                let joined_scope =
                    self.scope_group.is_some() && view.group_of(tab) == self.scope_group;
                if joined_scope {
                    self.on_tab_added(view, tab);
                } else {
                    let Some(index) = self.index_of_tab(tab) else {
                        return;
                    };
                    if let Err(err) = self.cards.remove_at(index) {
                        log::debug!("Ignoring merge of tab {} out of scope: {}", tab, err);
                        return;
                    }
                }
                self.notices
                    .push(EngineNotice::GroupContentChanged { tab: Some(tab) });
            }
        }
    }

    /// Fold `tab`'s card into the card of the group it joined.
    fn merge_into_group_card(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        selected_in_group: TabId,
    ) {
        let Some(rep) = view.representative_of(tab) else {
            return;
        };
        let destination = Some(selected_in_group)
            .filter(|&selected| selected != tab)
            .and_then(|selected| self.index_of_tab(selected))
            .or_else(|| {
                view.related_tabs(tab)
                    .into_iter()
                    .filter(|&member| member != tab)
                    .find_map(|member| self.index_of_tab(member))
            });

        let index = match (destination, self.index_of_tab(tab)) {
            (Some(destination), _) => destination,
            (None, Some(own)) => own,
            (None, None) => {
                // Both sides already gone from the list; the collection ran
                // ahead of us and a later event will settle the row.
                log::debug!("Merge of tab {} found no card to update", tab);
                return;
            }
        };
        let index = self.claim_group_card(view, index, rep);
        self.update_tab(view, index, rep, true, false);
        log::info!("Merged tab {} into group card of tab {}", tab, rep);
    }

    pub(super) fn on_group_split(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        previous_group_index: usize,
    ) {
        if view.tab(tab).is_none() {
            return;
        }
        if self.settings.scope == ListScope::SingleGroup {
            if let Some(index) = self.index_of_tab(tab)
                && self.cards.remove_at(index).is_ok()
            {
                let remaining = self.cards.tab_ids().first().copied();
                self.notices
                    .push(EngineNotice::GroupContentChanged { tab: remaining });
            }
            return;
        }

        let previous_rep = view
            .representatives()
            .get(previous_group_index)
            .copied()
            .filter(|&rep| rep != tab && view.is_in_group(rep));
        match previous_rep {
            Some(group_rep) => {
                // The group survives; if the card was labeled by the tab that
                // left, hand it back to the group first.
                if let Some(own) = self.index_of_tab(tab)
                    && self.cards.get(own).map(Card::card_type) == Some(CardType::TabGroup)
                {
                    let own = self.claim_group_card(view, own, group_rep);
                    self.update_tab(view, own, group_rep, true, false);
                }
                self.on_tab_added(view, tab);
                self.refresh_group_card(view, group_rep);
            }
            None => match self.index_of_tab(tab) {
                Some(index) => self.update_tab(view, index, tab, false, false),
                None => {
                    self.on_tab_added(view, tab);
                }
            },
        }
        log::info!("Tab {} left the group at position {}", tab, previous_group_index);
    }

    pub(super) fn on_group_created(&mut self, view: &dyn TabGroupView, destination: TabId) {
        if self.is_representative_scope() {
            self.refresh_group_card(view, destination);
        }
    }

    pub(super) fn on_group_metadata_changed(
        &mut self,
        view: &dyn TabGroupView,
        group: GroupId,
        color_changed: bool,
    ) {
        if self.settings.scope == ListScope::SingleGroup {
            if self.scope_group == Some(group) {
                let tab = self.cards.tab_ids().first().copied();
                self.notices.push(EngineNotice::GroupContentChanged { tab });
            }
            return;
        }
        for index in 0..self.cards.len() {
            let Some(tab) = self.cards.get(index).and_then(Card::tab_id) else {
                continue;
            };
            if view.group_of(tab) != Some(group) {
                continue;
            }
            self.bind_text(view, index, tab);
            if color_changed {
                self.refresh_favicon(view, index, tab);
                self.install_thumbnail_fetcher(index, tab, false);
            }
        }
    }

    pub(super) fn on_moved_within_group(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        old_index: usize,
        new_index: usize,
    ) {
        match self.settings.scope {
            ListScope::SingleGroup => {
                let Some(current) = self.index_of_tab(tab) else {
                    return;
                };
                let pivot_index = if new_index > old_index {
                    new_index.checked_sub(1)
                } else {
                    Some(new_index + 1)
                };
                let Some(target) = pivot_index
                    .and_then(|index| view.tab_at(index))
                    .and_then(|pivot| self.index_of_tab(pivot))
                else {
                    return;
                };
                if let Err(err) = self.cards.move_card(current, target) {
                    log::debug!("Ignoring move of tab {}: {}", tab, err);
                }
            }
            ListScope::Representatives => {
                // Member order drives the group card's preview.
                if let Some(index) = self.group_card_index(view, tab)
                    && let Some(card_tab) = self.cards.get(index).and_then(Card::tab_id)
                {
                    self.bind_text(view, index, card_tab);
                    self.update_favicon(view, index, card_tab);
                    self.install_thumbnail_fetcher(index, card_tab, false);
                }
            }
        }
    }

    pub(super) fn on_group_reordered(
        &mut self,
        view: &dyn TabGroupView,
        tab: TabId,
        old_index: usize,
        new_index: usize,
    ) {
        if !self.is_representative_scope() || old_index == new_index {
            return;
        }
        let block_len = view.related_tabs(tab).len().max(1);
        let neighbor_index = if new_index > old_index {
            new_index.checked_sub(block_len)
        } else {
            Some(new_index + 1)
        };
        let Some(neighbor) = neighbor_index.and_then(|index| view.tab_at(index)) else {
            return;
        };
        let (Some(from), Some(to)) = (
            self.group_card_index(view, tab),
            self.group_card_index(view, neighbor),
        ) else {
            return;
        };
        match self.cards.move_card(from, to) {
            Ok(()) => log::debug!("Moved card of tab {} from {} to {}", tab, from, to),
            Err(err) => log::debug!("Ignoring reorder of tab {}: {}", tab, err),
        }
    }
}
