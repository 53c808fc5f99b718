//! Query and mutation interfaces of the tab collection.

use super::events::ClosedFrom;
use tab_grid_config::{GroupColor, GroupId, TabId};

/// Snapshot of one tab as the engine needs it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub group: Option<GroupId>,
}

impl TabInfo {
    /// Host part of the url, used as the card's secondary text
    pub fn url_domain(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
        host.strip_prefix("www.").unwrap_or(host)
    }
}

/// Group-aware read access to the tab collection.
///
/// "Representatives" are the tabs standing in for each group (its last-shown
/// member) and each ungrouped tab, in collection order.
pub trait TabGroupView {
    /// Live or closing tab
    fn tab(&self, id: TabId) -> Option<&TabInfo>;

    /// Whether `id` is in an undoable pending closure
    fn is_closing(&self, id: TabId) -> bool;

    /// Live tabs in collection order
    fn tab_ids(&self) -> Vec<TabId>;

    fn index_of(&self, id: TabId) -> Option<usize>;

    fn tab_at(&self, index: usize) -> Option<TabId>;

    fn representatives(&self) -> Vec<TabId>;

    /// Position of `id`'s group (or of `id` itself) among the representatives
    fn representative_index_of(&self, id: TabId) -> Option<usize>;

    /// The representative standing for `id`
    fn representative_of(&self, id: TabId) -> Option<TabId>;

    /// Live members of `id`'s group, or `[id]` for a live ungrouped tab
    fn related_tabs(&self, id: TabId) -> Vec<TabId>;

    fn group_of(&self, id: TabId) -> Option<GroupId>;

    fn is_in_group(&self, id: TabId) -> bool {
        self.group_of(id).is_some()
    }

    /// Live members of `group` in collection order
    fn group_members(&self, group: GroupId) -> Vec<TabId>;

    fn group_title(&self, group: GroupId) -> Option<&str>;

    fn group_color(&self, group: GroupId) -> GroupColor;

    fn selected_tab(&self) -> Option<TabId>;

    /// Events arriving before the collection finished restoring are ignored
    fn is_restored(&self) -> bool;

    fn tab_count(&self) -> usize;
}

/// A closure handed to the collection.
///
/// `origin` travels with the pending-closure record and comes back on the
/// matching `TabClosureUndone` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureRequest {
    pub ids: Vec<TabId>,
    pub allow_undo: bool,
    pub origin: ClosedFrom,
}

/// Mutations the engine may ask of the tab collection.
pub trait TabMutator {
    fn select_tab(&mut self, id: TabId);

    fn close_tabs(&mut self, request: ClosureRequest);

    fn move_tab_out_of_group(&mut self, id: TabId);

    /// Merge `ids` into `target`'s group, creating the group if needed
    fn merge_into_group(&mut self, target: TabId, ids: &[TabId]);

    fn set_group_title(&mut self, group: GroupId, title: Option<String>);

    fn set_group_color(&mut self, group: GroupId, color: GroupColor);
}

/// A collection offering both queries and mutations.
pub trait TabCollection: TabGroupView + TabMutator {}

impl<T: TabGroupView + TabMutator + ?Sized> TabCollection for T {}
