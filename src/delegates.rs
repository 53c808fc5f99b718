//! Strategy objects injected into the engine for user interaction.
//!
//! The engine never decides navigation on its own. A tap, close or long press
//! is routed through a [`TabActionDelegate`]; selectable lists consult a
//! [`SelectionDelegate`] that owns the selected set.

use crate::collection::ClosureRequest;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tab_grid_config::TabId;

/// What the delegate wants done with a requested closure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Proceed,
    Cancel,
}

/// Per-row action callbacks.
pub trait TabActionDelegate {
    /// The user picked `tab`; the host typically leaves the switcher.
    fn on_tab_selected(&mut self, tab: TabId);

    /// A closure is about to be issued.
    fn on_tab_closing(&mut self, request: &ClosureRequest) -> CloseDecision {
        let _ = request;
        CloseDecision::Proceed
    }

    /// The user opened a group card.
    fn open_group_view(&mut self, tab: TabId);

    fn on_long_press(&mut self, tab: TabId) {
        let _ = tab;
    }
}

/// External selection set mirrored into card selection flags.
pub trait SelectionDelegate {
    fn is_selected(&self, tab: TabId) -> bool;

    /// Flip `tab`'s membership and return its new state
    fn toggle(&mut self, tab: TabId) -> bool;

    fn selected(&self) -> Vec<TabId>;
}

/// Selection set with an optional size cap (0 means unlimited).
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    selected: Rc<RefCell<BTreeSet<TabId>>>,
    max_selected: usize,
}

impl SelectionSet {
    pub fn new(max_selected: usize) -> Self {
        Self {
            selected: Rc::default(),
            max_selected,
        }
    }

    pub fn clear(&self) {
        self.selected.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.selected.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.borrow().is_empty()
    }
}

impl SelectionDelegate for SelectionSet {
    fn is_selected(&self, tab: TabId) -> bool {
        self.selected.borrow().contains(&tab)
    }

    fn toggle(&mut self, tab: TabId) -> bool {
        let mut selected = self.selected.borrow_mut();
        if selected.remove(&tab) {
            return false;
        }
        if self.max_selected != 0 && selected.len() >= self.max_selected {
            log::debug!("Selection cap {} reached, ignoring tab {}", self.max_selected, tab);
            return false;
        }
        selected.insert(tab);
        true
    }

    fn selected(&self) -> Vec<TabId> {
        self.selected.borrow().iter().copied().collect()
    }
}

/// Something the user asked the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    Navigate(TabId),
    OpenGroup(TabId),
    LongPress(TabId),
}

/// Action delegate that queues intents for the host to act on after the
/// current event has been handled.
#[derive(Debug, Clone, Default)]
pub struct IntentQueue {
    intents: Rc<RefCell<Vec<UserIntent>>>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<UserIntent> {
        std::mem::take(&mut *self.intents.borrow_mut())
    }
}

impl TabActionDelegate for IntentQueue {
    fn on_tab_selected(&mut self, tab: TabId) {
        self.intents.borrow_mut().push(UserIntent::Navigate(tab));
    }

    fn open_group_view(&mut self, tab: TabId) {
        self.intents.borrow_mut().push(UserIntent::OpenGroup(tab));
    }

    fn on_long_press(&mut self, tab: TabId) {
        self.intents.borrow_mut().push(UserIntent::LongPress(tab));
    }
}
