//! User input on cards, routed through the action and selection delegates
//! and applied to the collection through its mutation API.

use super::{ListScope, TabListEngine};
use crate::card::{AnimationStatus, Card, CardAction, CardKey, CardType, CardValue};
use crate::collection::{ClosedFrom, ClosureRequest, TabCollection};
use crate::delegates::CloseDecision;
use tab_grid_config::{GroupColor, TabId};

/// Result of a close request from the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The closure was handed to the collection
    Closed(ClosureRequest),
    /// Closing would leave no tabs; pass the request to
    /// [`TabListEngine::confirm_close`] once the user agrees
    NeedsConfirmation(ClosureRequest),
    /// The action delegate vetoed the closure
    Cancelled,
    /// No card for the tab
    Ignored,
}

/// Entries of a card's overflow menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Close,
    Ungroup,
    /// `None` clears the stored title
    Rename(Option<String>),
    Recolor(GroupColor),
}

impl TabListEngine {
    /// Tap on the card for `tab`.
    pub fn on_card_clicked(&mut self, collection: &mut dyn TabCollection, tab: TabId) {
        let Some(index) = self.index_of_tab(tab) else {
            return;
        };
        match self.cards.get(index).and_then(Card::action) {
            Some(CardAction::ToggleSelection) => {
                let Some(selection) = self.selection.as_mut() else {
                    return;
                };
                let selected = selection.toggle(tab);
                self.cards
                    .set_property(index, CardKey::IsSelected, CardValue::Flag(selected));
            }
            Some(CardAction::OpenGroup) => {
                log::info!("Opening group of tab {}", tab);
                self.actions.open_group_view(tab);
            }
            Some(CardAction::SelectTab) | None => {
                self.actions.on_tab_selected(tab);
                collection.select_tab(tab);
            }
        }
    }

    /// Close button on the card for `tab`. A group card closes the whole
    /// group.
    pub fn on_close_clicked(
        &mut self,
        collection: &mut dyn TabCollection,
        tab: TabId,
    ) -> CloseOutcome {
        let Some(index) = self.index_of_tab(tab) else {
            return CloseOutcome::Ignored;
        };
        let group_card = self.settings.scope == ListScope::Representatives
            && self.cards.get(index).map(Card::card_type) == Some(CardType::TabGroup);
        let ids = if group_card {
            collection.related_tabs(tab)
        } else {
            vec![tab]
        };
        if ids.is_empty() {
            return CloseOutcome::Ignored;
        }
        let origin = match self.settings.origin {
            ClosedFrom::TabSwitcher if group_card => ClosedFrom::TabSwitcherGroup,
            origin => origin,
        };
        let request = ClosureRequest {
            ids,
            allow_undo: self.settings.allow_undo,
            origin,
        };

        if self.actions.on_tab_closing(&request) == CloseDecision::Cancel {
            log::debug!("Close of {:?} cancelled by delegate", request.ids);
            return CloseOutcome::Cancelled;
        }
        if self.settings.confirm_close_last_tab && request.ids.len() >= collection.tab_count() {
            log::info!("Closing {:?} would leave no tabs, asking for confirmation", request.ids);
            return CloseOutcome::NeedsConfirmation(request);
        }
        self.issue_close(collection, request.clone());
        CloseOutcome::Closed(request)
    }

    /// Finish a close that needed confirmation.
    pub fn confirm_close(
        &mut self,
        collection: &mut dyn TabCollection,
        request: ClosureRequest,
    ) -> CloseOutcome {
        self.issue_close(collection, request.clone());
        CloseOutcome::Closed(request)
    }

    fn issue_close(&mut self, collection: &mut dyn TabCollection, request: ClosureRequest) {
        for &id in &request.ids {
            self.closures_in_flight.insert(id, request.origin);
        }
        collection.close_tabs(request);
    }

    pub fn on_long_press(&mut self, tab: TabId) {
        if self.index_of_tab(tab).is_some() {
            self.actions.on_long_press(tab);
        }
    }

    /// Apply an overflow-menu choice. Only [`MenuItem::Close`] produces a
    /// close outcome.
    pub fn on_menu_item(
        &mut self,
        collection: &mut dyn TabCollection,
        tab: TabId,
        item: MenuItem,
    ) -> Option<CloseOutcome> {
        match item {
            MenuItem::Close => return Some(self.on_close_clicked(collection, tab)),
            MenuItem::Ungroup => self.ungroup_tab(collection, tab),
            MenuItem::Rename(title) => {
                if let Some(group) = collection.group_of(tab) {
                    collection.set_group_title(group, title.filter(|t| !t.trim().is_empty()));
                }
            }
            MenuItem::Recolor(color) => {
                if let Some(group) = collection.group_of(tab) {
                    collection.set_group_color(group, color);
                }
            }
        }
        None
    }

    /// Move `tab` out of its group.
    pub fn ungroup_tab(&mut self, collection: &mut dyn TabCollection, tab: TabId) {
        if collection.is_in_group(tab) {
            collection.move_tab_out_of_group(tab);
        }
    }

    /// Drop the card for `source` onto the card for `target`: every tab
    /// related to `source` joins `target`'s group.
    pub fn merge_cards(
        &mut self,
        collection: &mut dyn TabCollection,
        source: TabId,
        target: TabId,
    ) -> bool {
        if source == target || self.index_of_tab(target).is_none() {
            return false;
        }
        let ids = collection.related_tabs(source);
        if ids.is_empty() || ids.contains(&target) {
            return false;
        }
        self.set_merge_hover(target, false);
        log::info!("Merging {:?} into the group of tab {}", ids, target);
        collection.merge_into_group(target, &ids);
        true
    }

    /// Mirror a drag hovering over (or leaving) the card for `tab`.
    pub fn set_merge_hover(&mut self, tab: TabId, hovered: bool) {
        let Some(index) = self.index_of_tab(tab) else {
            return;
        };
        let status = if hovered {
            AnimationStatus::HoveredCardZoomIn
        } else {
            AnimationStatus::HoveredCardZoomOut
        };
        self.cards
            .set_property(index, CardKey::AnimationStatus, CardValue::Animation(status));
    }
}
