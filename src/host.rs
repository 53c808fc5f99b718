//! The tab switcher pane: wires collections, engines and dialogs together.
//!
//! `TabSwitcher` owns the regular and archived tab collections, the grid
//! engine over the regular collection, the group and archived-tab dialog
//! coordinators, the overlay view they share and the FIFO task queue. User
//! operations mutate a collection; [`TabSwitcher::pump`] then drains the
//! recorded events into every engine and runs posted tasks until idle.

use crate::binder::ListRenderer;
use crate::collection::{
    ClosedFrom, ClosureRequest, InMemoryTabModel, LaunchType, TabEvent, TabGroupView,
};
use crate::delegates::{IntentQueue, SelectionSet, UserIntent};
use crate::dialog::coordinator::EngineFactory;
use crate::dialog::{
    DialogCoordinator, DialogKind, DialogScope, OverlayView, ShowStatus, UiTask,
};
use crate::engine::{
    ActionState, CloseOutcome, EngineSettings, ListScope, MenuItem, TabListEngine,
};
use crate::error::DialogError;
use crate::fetch::{FetchOutcome, FetchQueue, FetchRequest, Generations};
use crate::task_queue::TaskQueue;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tab_grid_config::{Config, TabId};

/// Which list a user action came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Grid,
    GroupDialog,
    ArchivedDialog,
}

pub struct TabSwitcher {
    config: Config,
    regular: InMemoryTabModel,
    archived: InMemoryTabModel,
    grid: TabListEngine,
    grid_renderer: ListRenderer,
    group_dialog: DialogCoordinator,
    archived_dialog: DialogCoordinator,
    overlay: Rc<RefCell<OverlayView>>,
    tasks: TaskQueue<UiTask>,
    fetches: FetchQueue,
    intents: IntentQueue,
    selection: SelectionSet,
    switcher_visible: bool,
    /// Close waiting for the user to confirm, and the list it came from
    pending_confirmation: Option<(Surface, ClosureRequest)>,
    dialogs_hidden: Rc<Cell<usize>>,
}

impl TabSwitcher {
    pub fn new(config: Config) -> Self {
        let overlay = Rc::new(RefCell::new(OverlayView::new()));
        let tasks = TaskQueue::new();
        let fetches = FetchQueue::new();
        let intents = IntentQueue::new();
        let selection = SelectionSet::new(config.max_selected_tabs);
        // Every fetch result is offered to every engine
        let generations = Generations::new();
        let wiring = EngineWiring {
            fetches: fetches.clone(),
            intents: intents.clone(),
            generations,
        };

        let grid_settings = EngineSettings::from_config(
            &config,
            ListScope::Representatives,
            ClosedFrom::TabSwitcher,
        );
        let mut grid = wiring
            .build(grid_settings)
            .with_selection_delegate(Box::new(selection.clone()));
        let grid_renderer = ListRenderer::new();
        grid.add_observer(Box::new(grid_renderer.clone()));

        let group_settings =
            EngineSettings::from_config(&config, ListScope::SingleGroup, ClosedFrom::GroupDialog);
        let group_dialog = DialogCoordinator::new(
            DialogKind::Group,
            &config.dialog,
            &overlay,
            tasks.clone(),
            wiring.factory(group_settings),
        );
        let archived_settings = EngineSettings::from_config(
            &config,
            ListScope::Representatives,
            ClosedFrom::ArchivedDialog,
        );
        let archived_dialog = DialogCoordinator::new(
            DialogKind::Archived,
            &config.dialog,
            &overlay,
            tasks.clone(),
            wiring.factory(archived_settings),
        );

        let mut regular = InMemoryTabModel::new();
        regular.set_restored(true);
        let mut archived = InMemoryTabModel::new();
        archived.set_restored(true);

        log::info!("Tab switcher created ({} mode)", config.list_mode.display_name());
        Self {
            config,
            regular,
            archived,
            grid,
            grid_renderer,
            group_dialog,
            archived_dialog,
            overlay,
            tasks,
            fetches,
            intents,
            selection,
            switcher_visible: false,
            pending_confirmation: None,
            dialogs_hidden: Rc::new(Cell::new(0)),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn regular(&self) -> &InMemoryTabModel {
        &self.regular
    }

    /// Direct access for setup and external mutations; call
    /// [`pump`](Self::pump) afterwards
    pub fn regular_mut(&mut self) -> &mut InMemoryTabModel {
        &mut self.regular
    }

    pub fn archived(&self) -> &InMemoryTabModel {
        &self.archived
    }

    pub fn archived_mut(&mut self) -> &mut InMemoryTabModel {
        &mut self.archived
    }

    pub fn grid(&self) -> &TabListEngine {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TabListEngine {
        &mut self.grid
    }

    pub fn grid_rows(&self) -> &ListRenderer {
        &self.grid_renderer
    }

    pub fn group_dialog(&self) -> &DialogCoordinator {
        &self.group_dialog
    }

    pub fn archived_dialog(&self) -> &DialogCoordinator {
        &self.archived_dialog
    }

    pub fn overlay(&self) -> &Rc<RefCell<OverlayView>> {
        &self.overlay
    }

    pub fn fetches(&self) -> &FetchQueue {
        &self.fetches
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_switcher_visible(&self) -> bool {
        self.switcher_visible
    }

    pub fn pending_confirmation(&self) -> Option<&ClosureRequest> {
        self.pending_confirmation.as_ref().map(|(_, request)| request)
    }

    /// Dialog runs that have reached `Hidden` so far
    pub fn dialogs_hidden(&self) -> usize {
        self.dialogs_hidden.get()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    // ========================================================================
    // Switcher visibility
    // ========================================================================

    /// Enter the switcher. Returns whether the grid was shown without a
    /// rebuild.
    pub fn show_switcher(&mut self, quick: bool) -> bool {
        self.pump_events();
        let items = self.regular.representatives();
        self.switcher_visible = true;
        self.grid.reset(&self.regular, Some(&items), quick)
    }

    /// Leave the switcher: dialogs close, a delayed add is replayed and
    /// per-row resources are released.
    pub fn hide_switcher(&mut self) {
        if !self.switcher_visible {
            return;
        }
        self.switcher_visible = false;
        self.group_dialog.hide(false);
        self.archived_dialog.hide(false);
        self.pump_events();
        self.grid.post_hiding(&self.regular);
        self.grid.soft_cleanup();
        log::info!("Tab switcher hidden");
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        let state = if selectable {
            ActionState::Selectable
        } else {
            self.selection.clear();
            ActionState::Closable
        };
        self.grid.set_action_state(&self.regular, state);
    }

    // ========================================================================
    // Dialogs
    // ========================================================================

    pub fn open_group_dialog(&mut self, tab: TabId) -> Result<ShowStatus, DialogError> {
        let hidden = Rc::clone(&self.dialogs_hidden);
        self.group_dialog.show(
            &self.regular,
            DialogScope::Group(tab),
            Some(Box::new(move || hidden.set(hidden.get() + 1))),
        )
    }

    pub fn open_archived_dialog(&mut self) -> Result<ShowStatus, DialogError> {
        let hidden = Rc::clone(&self.dialogs_hidden);
        self.archived_dialog.show(
            &self.archived,
            DialogScope::Archived,
            Some(Box::new(move || hidden.set(hidden.get() + 1))),
        )
    }

    /// Back press goes to the topmost surface. Returns whether it was
    /// consumed.
    pub fn back_press(&mut self) -> bool {
        if self.group_dialog.handle_back_press() || self.archived_dialog.handle_back_press() {
            return true;
        }
        if self.switcher_visible {
            self.hide_switcher();
            return true;
        }
        false
    }

    /// Advance dialog animations
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.group_dialog.tick(elapsed_ms);
        self.archived_dialog.tick(elapsed_ms);
    }

    // ========================================================================
    // User actions
    // ========================================================================

    fn engine_for(
        &mut self,
        surface: Surface,
    ) -> Option<(&mut TabListEngine, &mut InMemoryTabModel)> {
        match surface {
            Surface::Grid => Some((&mut self.grid, &mut self.regular)),
            Surface::GroupDialog => self
                .group_dialog
                .engine_mut()
                .map(|engine| (engine, &mut self.regular)),
            Surface::ArchivedDialog => self
                .archived_dialog
                .engine_mut()
                .map(|engine| (engine, &mut self.archived)),
        }
    }

    pub fn click(&mut self, surface: Surface, tab: TabId) {
        if surface == Surface::ArchivedDialog {
            self.restore_archived(tab);
            return;
        }
        if let Some((engine, collection)) = self.engine_for(surface) {
            engine.on_card_clicked(collection, tab);
        }
    }

    pub fn close(&mut self, surface: Surface, tab: TabId) -> CloseOutcome {
        let Some((engine, collection)) = self.engine_for(surface) else {
            return CloseOutcome::Ignored;
        };
        let outcome = engine.on_close_clicked(collection, tab);
        if let CloseOutcome::NeedsConfirmation(request) = &outcome {
            self.pending_confirmation = Some((surface, request.clone()));
        }
        outcome
    }

    /// Finish the close that was waiting for confirmation
    pub fn confirm_close(&mut self) -> CloseOutcome {
        let Some((surface, request)) = self.pending_confirmation.take() else {
            return CloseOutcome::Ignored;
        };
        match self.engine_for(surface) {
            Some((engine, collection)) => engine.confirm_close(collection, request),
            None => CloseOutcome::Ignored,
        }
    }

    pub fn cancel_close(&mut self) {
        self.pending_confirmation = None;
    }

    pub fn long_press(&mut self, surface: Surface, tab: TabId) {
        if let Some((engine, _)) = self.engine_for(surface) {
            engine.on_long_press(tab);
        }
    }

    pub fn menu(&mut self, surface: Surface, tab: TabId, item: MenuItem) -> Option<CloseOutcome> {
        let (engine, collection) = self.engine_for(surface)?;
        let outcome = engine.on_menu_item(collection, tab, item);
        if let Some(CloseOutcome::NeedsConfirmation(request)) = &outcome {
            self.pending_confirmation = Some((surface, request.clone()));
        }
        outcome
    }

    pub fn merge(&mut self, source: TabId, target: TabId) -> bool {
        self.grid.merge_cards(&mut self.regular, source, target)
    }

    pub fn set_merge_hover(&mut self, tab: TabId, hovered: bool) {
        self.grid.set_merge_hover(tab, hovered);
    }

    pub fn undo_close(&mut self, tab: TabId) -> bool {
        self.regular.undo_closure(tab) || self.archived.undo_closure(tab)
    }

    pub fn commit_closures(&mut self) {
        self.regular.commit_closures();
        self.archived.commit_closures();
    }

    /// Move an archived tab back into the regular collection.
    pub fn restore_archived(&mut self, tab: TabId) -> bool {
        let Some(mut info) = self.archived.remove_tab(tab) else {
            return false;
        };
        info.group = None;
        self.regular.adopt_tab(info, LaunchType::FromRestore, false);
        log::info!("Restored archived tab {}", tab);
        true
    }

    /// Move a regular tab into the archive.
    pub fn archive_tab(&mut self, tab: TabId) -> bool {
        let Some(mut info) = self.regular.remove_tab(tab) else {
            return false;
        };
        info.group = None;
        self.archived.adopt_tab(info, LaunchType::FromRestore, false);
        true
    }

    // ========================================================================
    // Fetch results
    // ========================================================================

    /// Answer every pending fetch with `answer` and deliver the results to
    /// each engine. Returns how many results were applied.
    pub fn answer_fetches(
        &mut self,
        mut answer: impl FnMut(&FetchRequest) -> FetchOutcome,
    ) -> usize {
        let mut applied = 0;
        for request in self.fetches.take_pending() {
            let outcome = answer(&request);
            let mut engines: Vec<&mut TabListEngine> = vec![&mut self.grid];
            engines.extend(self.group_dialog.engine_mut());
            engines.extend(self.archived_dialog.engine_mut());
            for engine in engines {
                let used = match &request {
                    FetchRequest::Thumbnail(fetcher) => {
                        engine.complete_thumbnail(fetcher, outcome.clone())
                    }
                    FetchRequest::Favicon(fetcher) => {
                        engine.complete_favicon(fetcher, outcome.clone())
                    }
                };
                applied += usize::from(used);
            }
        }
        applied
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    /// Deliver collection events, then run posted tasks one at a time,
    /// delivering the events each task causes before the next one runs.
    pub fn pump(&mut self) {
        loop {
            self.pump_events();
            let Some(task) = self.tasks.pop() else {
                break;
            };
            self.run_task(task);
        }
    }

    /// Deliver every recorded collection event and act on user intents,
    /// without running posted tasks.
    pub fn pump_events(&mut self) {
        loop {
            let regular_events = self.regular.drain_events();
            let archived_events = self.archived.drain_events();
            let intents = self.intents.take();
            if regular_events.is_empty() && archived_events.is_empty() && intents.is_empty() {
                break;
            }
            for event in &regular_events {
                self.deliver_regular(event);
            }
            for event in &archived_events {
                self.archived_dialog.handle_event(&self.archived, event);
            }
            for intent in intents {
                self.handle_intent(intent);
            }
        }
    }

    fn deliver_regular(&mut self, event: &TabEvent) {
        self.grid.handle_event(&self.regular, event);
        for notice in self.grid.take_notices() {
            crate::debug_log!("HOST", "grid notice {:?}", notice);
        }
        self.group_dialog.handle_event(&self.regular, event);
    }

    fn handle_intent(&mut self, intent: UserIntent) {
        match intent {
            UserIntent::Navigate(tab) => {
                log::info!("Navigating to tab {}", tab);
                self.hide_switcher();
            }
            UserIntent::OpenGroup(tab) => {
                if let Err(err) = self.open_group_dialog(tab) {
                    log::warn!("Could not open group of tab {}: {}", tab, err);
                }
            }
            UserIntent::LongPress(tab) => {
                crate::debug_info!("HOST", "long press on tab {}", tab);
            }
        }
    }

    fn run_task(&mut self, task: UiTask) {
        match task {
            UiTask::HideIfEmpty { .. } => {
                self.group_dialog.run_task(&task);
                self.archived_dialog.run_task(&task);
            }
            UiTask::OverlayReleased => {
                if let Err(err) = self.group_dialog.retry_pending_show(&self.regular) {
                    log::warn!("Queued group dialog could not show: {}", err);
                }
                if let Err(err) = self.archived_dialog.retry_pending_show(&self.archived) {
                    log::warn!("Queued archived dialog could not show: {}", err);
                }
            }
        }
    }
}

/// Shared collaborators handed to every engine the switcher builds
struct EngineWiring {
    fetches: FetchQueue,
    intents: IntentQueue,
    generations: Generations,
}

impl EngineWiring {
    fn build(&self, settings: EngineSettings) -> TabListEngine {
        TabListEngine::new(settings, Box::new(self.intents.clone()))
            .with_thumbnail_provider(Box::new(self.fetches.clone()))
            .with_favicon_provider(Box::new(self.fetches.clone()))
            .with_generations(self.generations.clone())
    }

    fn factory(&self, settings: EngineSettings) -> EngineFactory {
        let wiring = EngineWiring {
            fetches: self.fetches.clone(),
            intents: self.intents.clone(),
            generations: self.generations.clone(),
        };
        Box::new(move || wiring.build(settings.clone()))
    }
}
