//! Shared integration test helpers for tab-grid.
//!
//! Provides factory functions for collections and engines, plus a recording
//! observer for asserting on the list changes an engine produces.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{grid_engine, model_with_tabs, ChangeLog};
//! ```
//!
//! Rust integration tests use `mod common;` (not `use`) to bring in helpers
//! from `tests/common/mod.rs`. The `#![allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers is used per file.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use tab_grid::card::{Card, ListChange, ListObserver};
use tab_grid::collection::{ClosedFrom, InMemoryTabModel, NewTab, TabEvent, TabGroupView};
use tab_grid::delegates::{IntentQueue, SelectionSet};
use tab_grid::engine::{EngineSettings, ListScope, TabListEngine};
use tab_grid::fetch::FetchQueue;
use tab_grid_config::{Config, GroupColor, GroupId, TabId};
use tempfile::TempDir;

/// Restored collection holding one ungrouped tab per `(title, url)` pair.
/// Tab ids are `1..=n` in order.
pub fn model_with_tabs(tabs: &[(&str, &str)]) -> InMemoryTabModel {
    let mut model = InMemoryTabModel::new();
    model.set_restored(true);
    for (title, url) in tabs {
        model.add_tab(NewTab::new(*title, *url));
    }
    model.drain_events();
    model
}

/// Collection of `count` tabs titled "Tab N" at `https://siteN.example`.
pub fn numbered_model(count: usize) -> InMemoryTabModel {
    let mut model = InMemoryTabModel::new();
    model.set_restored(true);
    for n in 1..=count {
        model.add_tab(NewTab::new(
            format!("Tab {n}"),
            format!("https://site{n}.example/page"),
        ));
    }
    model.drain_events();
    model
}

/// Group `members` and drop the events that produced.
pub fn group(model: &mut InMemoryTabModel, members: &[TabId], title: Option<&str>) -> GroupId {
    let group = model
        .create_group(members, title.map(str::to_string), GroupColor::Blue)
        .expect("group created");
    model.drain_events();
    group
}

/// Engine wired to a shared fetch queue and intent queue.
pub struct TestEngine {
    pub engine: TabListEngine,
    pub fetches: FetchQueue,
    pub intents: IntentQueue,
    pub selection: SelectionSet,
    pub changes: ChangeLog,
}

pub fn test_engine(scope: ListScope, config: &Config) -> TestEngine {
    let origin = match scope {
        ListScope::Representatives => ClosedFrom::TabSwitcher,
        ListScope::SingleGroup => ClosedFrom::GroupDialog,
    };
    let fetches = FetchQueue::new();
    let intents = IntentQueue::new();
    let selection = SelectionSet::new(config.max_selected_tabs);
    let changes = ChangeLog::default();
    let mut engine = TabListEngine::new(
        EngineSettings::from_config(config, scope, origin),
        Box::new(intents.clone()),
    )
    .with_thumbnail_provider(Box::new(fetches.clone()))
    .with_favicon_provider(Box::new(fetches.clone()))
    .with_selection_delegate(Box::new(selection.clone()));
    engine.add_observer(Box::new(changes.clone()));
    TestEngine {
        engine,
        fetches,
        intents,
        selection,
        changes,
    }
}

/// Representatives-scope engine with the default config.
pub fn grid_engine() -> TestEngine {
    test_engine(ListScope::Representatives, &Config::default())
}

/// Single-group engine with the default config.
pub fn group_engine() -> TestEngine {
    test_engine(ListScope::SingleGroup, &Config::default())
}

/// Deliver every recorded collection event to `engine`.
pub fn deliver(engine: &mut TabListEngine, model: &mut InMemoryTabModel) -> Vec<TabEvent> {
    let mut delivered = Vec::new();
    loop {
        let events = model.drain_events();
        if events.is_empty() {
            return delivered;
        }
        for event in &events {
            engine.handle_event(&*model, event);
        }
        delivered.extend(events);
    }
}

/// Reset `engine` to the collection's representatives.
pub fn show_grid(engine: &mut TabListEngine, model: &InMemoryTabModel) -> bool {
    let reps = model.representatives();
    engine.reset(model, Some(&reps), false)
}

/// Tab ids of the engine's tab and group cards, in order.
pub fn card_tabs(engine: &TabListEngine) -> Vec<TabId> {
    engine.cards().tab_ids()
}

/// Indices of cards carrying the selected flag.
pub fn selected_indices(engine: &TabListEngine) -> Vec<usize> {
    engine
        .cards()
        .iter()
        .enumerate()
        .filter(|(_, card)| card.is_selected())
        .map(|(index, _)| index)
        .collect()
}

/// Records every [`ListChange`]; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Rc<RefCell<Vec<ListChange>>>,
}

impl ChangeLog {
    pub fn take(&self) -> Vec<ListChange> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }

    pub fn structural(&self) -> Vec<ListChange> {
        self.take()
            .into_iter()
            .filter(ListChange::is_structural)
            .collect()
    }
}

impl ListObserver for ChangeLog {
    fn on_list_changed(&mut self, _cards: &[Card], change: &ListChange) {
        self.changes.borrow_mut().push(change.clone());
    }
}

/// Creates a temporary directory for config file tests.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn config_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
