//! In-memory tab collection with group membership and undoable closures.

use super::events::{ClosedFrom, ContentChange, LaunchType, SelectionType, TabEvent};
use super::view::{ClosureRequest, TabGroupView, TabInfo, TabMutator};
use std::collections::{BTreeMap, HashSet};
use tab_grid_config::{GroupColor, GroupId, TabId};

/// Parameters for [`InMemoryTabModel::add_tab`]
#[derive(Debug, Clone)]
pub struct NewTab {
    pub title: String,
    pub url: String,
    pub launch: LaunchType,
    pub select: bool,
    pub group: Option<GroupId>,
}

impl NewTab {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            launch: LaunchType::FromLink,
            select: false,
            group: None,
        }
    }

    pub fn launched(mut self, launch: LaunchType) -> Self {
        self.launch = launch;
        self
    }

    pub fn selected(mut self) -> Self {
        self.select = true;
        self
    }

    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }
}

#[derive(Debug, Clone)]
struct GroupRecord {
    title: Option<String>,
    color: GroupColor,
    last_shown: TabId,
}

#[derive(Debug, Clone)]
struct PendingClosure {
    info: TabInfo,
    index: usize,
    origin: ClosedFrom,
}

/// Tab collection kept entirely in memory.
///
/// Group members are kept contiguous. Every mutation records [`TabEvent`]s
/// which the host drains with [`drain_events`](Self::drain_events) once the
/// mutation is complete.
#[derive(Debug)]
pub struct InMemoryTabModel {
    /// Live tabs, in order
    tabs: Vec<TabInfo>,
    /// Closed tabs that can still be restored
    pending: Vec<PendingClosure>,
    groups: BTreeMap<GroupId, GroupRecord>,
    selected: Option<TabId>,
    restored: bool,
    next_tab_id: TabId,
    next_group_id: u64,
    groups_created: usize,
    events: Vec<TabEvent>,
}

impl Default for InMemoryTabModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTabModel {
    /// Create an empty collection that has not finished restoring yet
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            pending: Vec::new(),
            groups: BTreeMap::new(),
            selected: None,
            restored: false,
            next_tab_id: 1,
            next_group_id: 1,
            groups_created: 0,
            events: Vec::new(),
        }
    }

    /// Mark restoration finished (or not); events are only meaningful after
    pub fn set_restored(&mut self, restored: bool) {
        self.restored = restored;
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<TabEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: TabEvent) {
        log::trace!("collection event {:?}", event);
        self.events.push(event);
    }

    // ========================================================================
    // Lookup helpers
    // ========================================================================

    fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// First and last collection index of the live members of `group`
    fn member_range(&self, group: GroupId) -> Option<(usize, usize)> {
        let first = self.tabs.iter().position(|t| t.group == Some(group))?;
        let last = self.tabs.iter().rposition(|t| t.group == Some(group))?;
        Some((first, last))
    }

    /// The member that stands for `group`: its last shown tab while that tab
    /// is live, otherwise its first live member
    fn shown_member(&self, group: GroupId) -> Option<TabId> {
        let record = self.groups.get(&group)?;
        let last_shown_live = self
            .tabs
            .iter()
            .any(|t| t.id == record.last_shown && t.group == Some(group));
        if last_shown_live {
            Some(record.last_shown)
        } else {
            self.tabs
                .iter()
                .find(|t| t.group == Some(group))
                .map(|t| t.id)
        }
    }

    /// Point the group at its nearest surviving member when `id` stops being live
    fn reassign_last_shown(&mut self, group: GroupId, id: TabId, near: usize) {
        let replacement = self
            .tabs
            .get(near)
            .filter(|t| t.group == Some(group))
            .or_else(|| {
                near.checked_sub(1)
                    .and_then(|i| self.tabs.get(i))
                    .filter(|t| t.group == Some(group))
            })
            .or_else(|| self.tabs.iter().find(|t| t.group == Some(group)))
            .map(|t| t.id);
        if let (Some(record), Some(replacement)) = (self.groups.get_mut(&group), replacement)
            && record.last_shown == id
        {
            record.last_shown = replacement;
        }
    }

    /// Drop group records with neither live nor pending members
    fn prune_groups(&mut self) {
        let tabs = &self.tabs;
        let pending = &self.pending;
        self.groups.retain(|group, _| {
            tabs.iter().any(|t| t.group == Some(*group))
                || pending.iter().any(|p| p.info.group == Some(*group))
        });
    }

    /// Where a tab that belongs to no group may be inserted near `index`
    /// without splitting an existing group
    fn ungrouped_slot(&self, index: usize) -> usize {
        let index = index.min(self.tabs.len());
        if index == 0 || index == self.tabs.len() {
            return index;
        }
        match (self.tabs[index - 1].group, self.tabs[index].group) {
            (Some(before), Some(after)) if before == after => self
                .member_range(before)
                .map(|(_, last)| last + 1)
                .unwrap_or(index),
            _ => index,
        }
    }

    /// Pending closures, oldest first
    pub fn pending_closures(&self) -> Vec<TabId> {
        self.pending.iter().map(|p| p.info.id).collect()
    }

    /// Id of the group `tab` is in, convenient for tests and scripts
    pub fn group_id_of(&self, tab: TabId) -> Option<GroupId> {
        self.group_of(tab)
    }

    /// Every group that currently has live members
    pub fn live_groups(&self) -> Vec<GroupId> {
        self.groups
            .keys()
            .copied()
            .filter(|g| self.tabs.iter().any(|t| t.group == Some(*g)))
            .collect()
    }

    // ========================================================================
    // Mutations beyond TabMutator
    // ========================================================================

    /// Open a new tab and return its id
    pub fn add_tab(&mut self, new_tab: NewTab) -> TabId {
        let id = self.next_tab_id;
        let info = TabInfo {
            id,
            title: new_tab.title,
            url: new_tab.url,
            group: new_tab.group,
        };
        self.insert_tab(info, new_tab.launch, new_tab.select)
    }

    /// Insert an existing tab (keeping its id), e.g. one restored from an
    /// archive. Returns the id.
    pub fn adopt_tab(&mut self, info: TabInfo, launch: LaunchType, select: bool) -> TabId {
        self.insert_tab(info, launch, select)
    }

    fn insert_tab(&mut self, mut info: TabInfo, launch: LaunchType, select: bool) -> TabId {
        let id = info.id;
        self.next_tab_id = self.next_tab_id.max(id + 1);

        if let Some(group) = info.group
            && !self.groups.contains_key(&group)
        {
            info.group = None;
        }

        let index = match info.group.and_then(|g| self.member_range(g)) {
            Some((_, last)) => last + 1,
            None => self.tabs.len(),
        };
        if let Some(group) = info.group
            && self.member_range(group).is_none()
            && let Some(record) = self.groups.get_mut(&group)
        {
            record.last_shown = id;
        }

        self.tabs.insert(index, info);
        log::info!("Added tab {} at {} (total: {})", id, index, self.tabs.len());
        self.emit(TabEvent::TabAdded {
            tab: id,
            launch,
            marked_for_selection: select,
        });
        if select {
            self.select_with(id, SelectionType::FromNew);
        }
        id
    }

    /// Detach a live tab without closing it. Returns the detached record.
    pub fn remove_tab(&mut self, id: TabId) -> Option<TabInfo> {
        let index = self.position(id)?;
        let info = self.tabs.remove(index);
        if let Some(group) = info.group {
            self.reassign_last_shown(group, id, index);
        }
        self.prune_groups();
        self.emit(TabEvent::TabRemoved { tab: id });
        if self.selected == Some(id) {
            self.select_replacement(id, index);
        }
        Some(info)
    }

    /// Convenience for setup code: group `members` under a title and color.
    /// The first member becomes the merge target.
    pub fn create_group(
        &mut self,
        members: &[TabId],
        title: Option<String>,
        color: GroupColor,
    ) -> Option<GroupId> {
        let (&target, rest) = members.split_first()?;
        self.merge_into_group(target, rest);
        let group = self.group_of(target)?;
        if let Some(record) = self.groups.get_mut(&group) {
            record.title = title;
            record.color = color;
        }
        Some(group)
    }

    pub fn update_tab_title(&mut self, id: TabId, title: impl Into<String>) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.tabs[index].title = title.into();
        self.emit(TabEvent::TabContentChanged {
            tab: id,
            change: ContentChange::Title,
        });
    }

    pub fn update_tab_url(&mut self, id: TabId, url: impl Into<String>) {
        let Some(index) = self.position(id) else {
            return;
        };
        self.tabs[index].url = url.into();
        self.emit(TabEvent::TabContentChanged {
            tab: id,
            change: ContentChange::Url,
        });
        self.emit(TabEvent::TabContentChanged {
            tab: id,
            change: ContentChange::Favicon,
        });
    }

    /// Move `id` to collection index `new_index`, clamped to its group
    pub fn move_tab_within_group(&mut self, id: TabId, new_index: usize) -> bool {
        let Some(group) = self.group_of(id) else {
            return false;
        };
        let (Some(old_index), Some((first, last))) = (self.position(id), self.member_range(group))
        else {
            return false;
        };
        let new_index = new_index.clamp(first, last);
        if new_index == old_index {
            return false;
        }
        let tab = self.tabs.remove(old_index);
        self.tabs.insert(new_index, tab);
        log::debug!("Moved tab {} within {} from {} to {}", id, group, old_index, new_index);
        self.emit(TabEvent::MovedWithinGroup {
            tab: id,
            old_index,
            new_index,
        });
        true
    }

    /// Move the group (or ungrouped tab) containing `id` so it becomes the
    /// `new_position`-th representative.
    pub fn move_group(&mut self, id: TabId, new_position: usize) -> bool {
        let (start, end) = match self.group_of(id).and_then(|g| self.member_range(g)) {
            Some(range) => range,
            None => match self.position(id) {
                Some(index) => (index, index),
                None => return false,
            },
        };
        let old_position = match self.representative_index_of(id) {
            Some(position) => position,
            None => return false,
        };
        let block_len = end - start + 1;
        let last_member = self.tabs[end].id;
        let last_position = self.representatives().len() - 1;
        let new_position = new_position.min(last_position);
        if new_position == old_position {
            return false;
        }

        let block: Vec<TabInfo> = self.tabs.drain(start..=end).collect();
        // Collection index at which the target representative slot begins
        // once the block is out of the way.
        let mut insert_at = self.tabs.len();
        let mut seen_groups = HashSet::new();
        let mut slot = 0;
        for (index, tab) in self.tabs.iter().enumerate() {
            let starts_slot = match tab.group {
                None => true,
                Some(group) => seen_groups.insert(group),
            };
            if starts_slot {
                if slot == new_position {
                    insert_at = index;
                    break;
                }
                slot += 1;
            }
        }
        for (offset, tab) in block.into_iter().enumerate() {
            self.tabs.insert(insert_at + offset, tab);
        }

        let old_index = end;
        let new_index = insert_at + block_len - 1;
        log::debug!(
            "Moved group of tab {} from position {} to {}",
            id,
            old_position,
            new_position
        );
        self.emit(TabEvent::GroupReordered {
            tab: last_member,
            old_index,
            new_index,
        });
        true
    }

    /// Permanently drop every pending closure
    pub fn commit_closures(&mut self) {
        let committed: Vec<TabId> = self.pending.drain(..).map(|p| p.info.id).collect();
        self.prune_groups();
        for tab in committed {
            self.emit(TabEvent::TabClosureCommitted { tab });
        }
    }

    /// Restore a pending closure. Returns `false` when `id` is not pending.
    pub fn undo_closure(&mut self, id: TabId) -> bool {
        let Some(slot) = self.pending.iter().position(|p| p.info.id == id) else {
            return false;
        };
        let PendingClosure { info, index, origin } = self.pending.remove(slot);

        let index = match info.group.and_then(|g| self.member_range(g)) {
            Some((first, last)) => index.clamp(first, last + 1),
            None => self.ungrouped_slot(index),
        };
        if let Some(group) = info.group
            && self.member_range(group).is_none()
            && let Some(record) = self.groups.get_mut(&group)
        {
            record.last_shown = id;
        }
        self.tabs.insert(index, info);
        log::info!("Undid closure of tab {} (from {:?})", id, origin);
        self.emit(TabEvent::TabClosureUndone {
            tab: id,
            origin: Some(origin),
        });
        if self.selected.is_none() {
            self.select_with(id, SelectionType::FromUndo);
        }
        true
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn select_with(&mut self, id: TabId, selection: SelectionType) {
        if self.position(id).is_none() || self.selected == Some(id) {
            return;
        }
        let previous = self.selected.replace(id);
        if let Some(group) = self.group_of(id)
            && let Some(record) = self.groups.get_mut(&group)
        {
            record.last_shown = id;
        }
        self.emit(TabEvent::TabSelected {
            tab: id,
            previous,
            selection,
        });
    }

    /// Select the tab nearest to `index` after `closed` went away
    fn select_replacement(&mut self, closed: TabId, index: usize) {
        let replacement = self
            .tabs
            .get(index)
            .or_else(|| self.tabs.last())
            .map(|t| t.id);
        match replacement {
            Some(next) => {
                self.selected = Some(closed);
                self.select_with(next, SelectionType::FromClose);
            }
            None => self.selected = None,
        }
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl TabGroupView for InMemoryTabModel {
    fn tab(&self, id: TabId) -> Option<&TabInfo> {
        self.tabs
            .iter()
            .find(|t| t.id == id)
            .or_else(|| self.pending.iter().map(|p| &p.info).find(|t| t.id == id))
    }

    fn is_closing(&self, id: TabId) -> bool {
        self.pending.iter().any(|p| p.info.id == id)
    }

    fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.position(id)
    }

    fn tab_at(&self, index: usize) -> Option<TabId> {
        self.tabs.get(index).map(|t| t.id)
    }

    fn representatives(&self) -> Vec<TabId> {
        let mut seen = HashSet::new();
        let mut reps = Vec::new();
        for tab in &self.tabs {
            match tab.group {
                None => reps.push(tab.id),
                Some(group) => {
                    if seen.insert(group) {
                        reps.push(self.shown_member(group).unwrap_or(tab.id));
                    }
                }
            }
        }
        reps
    }

    fn representative_index_of(&self, id: TabId) -> Option<usize> {
        let target_group = self.group_of(id);
        let mut seen = HashSet::new();
        let mut slot = 0;
        for tab in &self.tabs {
            match tab.group {
                None => {
                    if tab.id == id {
                        return Some(slot);
                    }
                    slot += 1;
                }
                Some(group) => {
                    if seen.insert(group) {
                        if Some(group) == target_group {
                            return Some(slot);
                        }
                        slot += 1;
                    }
                }
            }
        }
        None
    }

    fn representative_of(&self, id: TabId) -> Option<TabId> {
        match self.group_of(id) {
            Some(group) => self.shown_member(group),
            None => self.position(id).map(|_| id),
        }
    }

    fn related_tabs(&self, id: TabId) -> Vec<TabId> {
        match self.group_of(id) {
            Some(group) => self.group_members(group),
            None if self.position(id).is_some() => vec![id],
            None => Vec::new(),
        }
    }

    fn group_of(&self, id: TabId) -> Option<GroupId> {
        self.tab(id).and_then(|t| t.group)
    }

    fn group_members(&self, group: GroupId) -> Vec<TabId> {
        self.tabs
            .iter()
            .filter(|t| t.group == Some(group))
            .map(|t| t.id)
            .collect()
    }

    fn group_title(&self, group: GroupId) -> Option<&str> {
        self.groups.get(&group).and_then(|g| g.title.as_deref())
    }

    fn group_color(&self, group: GroupId) -> GroupColor {
        self.groups
            .get(&group)
            .map(|g| g.color)
            .unwrap_or_default()
    }

    fn selected_tab(&self) -> Option<TabId> {
        self.selected
    }

    fn is_restored(&self) -> bool {
        self.restored
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}

impl TabMutator for InMemoryTabModel {
    fn select_tab(&mut self, id: TabId) {
        self.select_with(id, SelectionType::FromUser);
    }

    fn close_tabs(&mut self, request: ClosureRequest) {
        let mut closed = Vec::new();
        let mut first_index = None;
        for &id in &request.ids {
            let Some(index) = self.position(id) else {
                continue;
            };
            let info = self.tabs.remove(index);
            if let Some(group) = info.group {
                self.reassign_last_shown(group, id, index);
            }
            first_index = Some(first_index.map_or(index, |i: usize| i.min(index)));
            if request.allow_undo {
                self.pending.push(PendingClosure {
                    info,
                    index,
                    origin: request.origin,
                });
            }
            closed.push(id);
            self.emit(TabEvent::TabWillClose { tab: id });
        }
        if closed.is_empty() {
            return;
        }
        log::info!(
            "Closed tabs {:?} from {:?} (undoable: {}, remaining: {})",
            closed,
            request.origin,
            request.allow_undo,
            self.tabs.len()
        );

        if let (Some(selected), Some(index)) = (self.selected, first_index)
            && closed.contains(&selected)
        {
            self.select_replacement(selected, index);
        }
        if !request.allow_undo {
            for &tab in &closed {
                self.emit(TabEvent::TabClosureCommitted { tab });
            }
        }
        self.prune_groups();
    }

    fn move_tab_out_of_group(&mut self, id: TabId) {
        let Some(group) = self.group_of(id) else {
            return;
        };
        let (Some(index), Some(previous_group_index)) =
            (self.position(id), self.representative_index_of(id))
        else {
            return;
        };

        let mut tab = self.tabs.remove(index);
        tab.group = None;
        let insert_at = self
            .member_range(group)
            .map(|(_, last)| last + 1)
            .unwrap_or(index);
        self.tabs.insert(insert_at, tab);
        self.reassign_last_shown(group, id, index);
        self.prune_groups();

        log::info!("Moved tab {} out of {}", id, group);
        self.emit(TabEvent::GroupSplit {
            tab: id,
            previous_group_index,
        });
    }

    fn merge_into_group(&mut self, target: TabId, ids: &[TabId]) {
        let Some(target_index) = self.position(target) else {
            return;
        };
        let (group, created) = match self.tabs[target_index].group {
            Some(group) => (group, false),
            None => {
                let group = GroupId(self.next_group_id);
                self.next_group_id += 1;
                let color = GroupColor::nth(self.groups_created);
                self.groups_created += 1;
                self.groups.insert(
                    group,
                    GroupRecord {
                        title: None,
                        color,
                        last_shown: target,
                    },
                );
                self.tabs[target_index].group = Some(group);
                (group, true)
            }
        };

        for &id in ids {
            if id == target {
                continue;
            }
            let Some(index) = self.position(id) else {
                continue;
            };
            let old_group = self.tabs[index].group;
            if old_group == Some(group) {
                continue;
            }

            let mut tab = self.tabs.remove(index);
            tab.group = Some(group);
            let insert_at = self
                .member_range(group)
                .map(|(_, last)| last + 1)
                .unwrap_or(self.tabs.len());
            self.tabs.insert(insert_at, tab);

            if let Some(old_group) = old_group {
                let near = self
                    .member_range(old_group)
                    .map(|(first, _)| first)
                    .unwrap_or(0);
                self.reassign_last_shown(old_group, id, near);
            }
            if self.selected == Some(id)
                && let Some(record) = self.groups.get_mut(&group)
            {
                record.last_shown = id;
            }
            let selected_in_group = self.shown_member(group).unwrap_or(target);
            self.emit(TabEvent::GroupMerged {
                tab: id,
                selected_in_group,
            });
        }
        self.prune_groups();

        if created {
            log::info!("Created {} around tab {}", group, target);
            self.emit(TabEvent::GroupCreated {
                destination: target,
            });
        }
    }

    fn set_group_title(&mut self, group: GroupId, title: Option<String>) {
        let Some(record) = self.groups.get_mut(&group) else {
            return;
        };
        if record.title == title {
            return;
        }
        record.title = title.clone();
        self.emit(TabEvent::GroupTitleChanged { group, title });
    }

    fn set_group_color(&mut self, group: GroupId, color: GroupColor) {
        let Some(record) = self.groups.get_mut(&group) else {
            return;
        };
        if record.color == color {
            return;
        }
        record.color = color;
        self.emit(TabEvent::GroupColorChanged { group, color });
    }
}
