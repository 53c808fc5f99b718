//! Change notifications emitted by a tab collection.

use tab_grid_config::{GroupColor, GroupId, TabId};

/// How a tab came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchType {
    /// Opened from a link or the new-tab button
    FromLink,
    /// Opened from the switcher's own new-tab affordance
    FromTabSwitcher,
    /// Opened from inside a group dialog or the tab strip
    FromTabGroupUi,
    /// Recreated while restoring state (also used for archived-tab restores)
    FromRestore,
}

impl LaunchType {
    /// Launches that originate inside the switcher UI itself
    pub fn is_from_switcher_ui(self) -> bool {
        matches!(self, LaunchType::FromTabSwitcher | LaunchType::FromTabGroupUi)
    }
}

/// Why the selection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    FromUser,
    FromNew,
    /// The previously selected tab closed
    FromClose,
    /// An undone closure re-selected its tab
    FromUndo,
}

/// Which surface started a closure; carried on the pending-closure record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClosedFrom {
    TabSwitcher,
    /// A whole group closed from its card in the switcher
    TabSwitcherGroup,
    GroupDialog,
    ArchivedDialog,
    TabStrip,
    External,
}

/// Which piece of tab content changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentChange {
    Title,
    Url,
    Favicon,
}

/// A single notification from the tab collection.
///
/// Events are drained after a mutation completes, so a handler always sees
/// the collection in its post-mutation state. Handlers must tolerate events
/// naming tabs that have since disappeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    TabAdded {
        tab: TabId,
        launch: LaunchType,
        marked_for_selection: bool,
    },
    TabSelected {
        tab: TabId,
        previous: Option<TabId>,
        selection: SelectionType,
    },
    TabWillClose {
        tab: TabId,
    },
    TabClosureUndone {
        tab: TabId,
        origin: Option<ClosedFrom>,
    },
    TabClosureCommitted {
        tab: TabId,
    },
    /// The tab left the collection without a closure (e.g. moved elsewhere)
    TabRemoved {
        tab: TabId,
    },
    TabContentChanged {
        tab: TabId,
        change: ContentChange,
    },
    /// `tab` joined a group; `selected_in_group` is the group's shown tab
    GroupMerged {
        tab: TabId,
        selected_in_group: TabId,
    },
    /// `tab` left its group, which sat at `previous_group_index` among the
    /// representatives before the split
    GroupSplit {
        tab: TabId,
        previous_group_index: usize,
    },
    /// A new group was formed around `destination`
    GroupCreated {
        destination: TabId,
    },
    GroupTitleChanged {
        group: GroupId,
        title: Option<String>,
    },
    GroupColorChanged {
        group: GroupId,
        color: GroupColor,
    },
    /// `tab` moved inside its group; indices are collection indices
    MovedWithinGroup {
        tab: TabId,
        old_index: usize,
        new_index: usize,
    },
    /// A whole group (or singleton) moved; `tab` is its last member and the
    /// indices are that tab's collection indices before and after
    GroupReordered {
        tab: TabId,
        old_index: usize,
        new_index: usize,
    },
}

impl TabEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            TabEvent::TabAdded { .. } => "tab_added",
            TabEvent::TabSelected { .. } => "tab_selected",
            TabEvent::TabWillClose { .. } => "tab_will_close",
            TabEvent::TabClosureUndone { .. } => "tab_closure_undone",
            TabEvent::TabClosureCommitted { .. } => "tab_closure_committed",
            TabEvent::TabRemoved { .. } => "tab_removed",
            TabEvent::TabContentChanged { .. } => "tab_content_changed",
            TabEvent::GroupMerged { .. } => "group_merged",
            TabEvent::GroupSplit { .. } => "group_split",
            TabEvent::GroupCreated { .. } => "group_created",
            TabEvent::GroupTitleChanged { .. } => "group_title_changed",
            TabEvent::GroupColorChanged { .. } => "group_color_changed",
            TabEvent::MovedWithinGroup { .. } => "moved_within_group",
            TabEvent::GroupReordered { .. } => "group_reordered",
        }
    }
}
