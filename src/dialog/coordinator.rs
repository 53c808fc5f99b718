//! Lifecycle of one dialog overlay.
//!
//! ```text
//! Hidden --show--> Showing --enter done--> Visible --hide--> Hiding --exit done--> Hidden
//! ```
//!
//! Each showing run mints a fresh [`BindingToken`], claims the shared
//! [`OverlayView`] with it and builds a fresh scoped [`TabListEngine`]. A
//! show request that finds the overlay owned by another run waits until the
//! owner releases it.

use super::model::{BindingToken, DialogKey, DialogModel, DialogValue};
use super::overlay::OverlayView;
use crate::binder::{ListRenderer, OverlayBinder};
use crate::card::{Card, ListChange, ListObserver};
use crate::collection::{TabEvent, TabGroupView};
use crate::engine::{EngineNotice, TabListEngine, tab_count_label};
use crate::error::DialogError;
use crate::task_queue::TaskQueue;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tab_grid_config::{DialogConfig, TabId};

/// Which dialog a coordinator drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Group,
    Archived,
}

impl DialogKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DialogKind::Group => "group dialog",
            DialogKind::Archived => "archived tabs dialog",
        }
    }
}

/// What a dialog shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogScope {
    /// The tabs of the group containing this tab
    Group(TabId),
    /// Every tab of the archived collection
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Hidden,
    Showing,
    Visible,
    Hiding,
}

/// Result of a show request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowStatus {
    /// Entering now
    Started,
    /// Waiting for the overlay to be released
    Queued,
    /// Already on screen; switched to the new scope
    Rescoped,
}

/// Work posted to the UI task queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTask {
    /// Hide `dialog` if its run `token` is still current and its list is
    /// still empty when the task runs
    HideIfEmpty {
        dialog: DialogKind,
        token: BindingToken,
    },
    /// The overlay view became free; queued shows may start
    OverlayReleased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy)]
struct Animation {
    phase: Phase,
    remaining_ms: u64,
}

/// Runs once the dialog reaches `Hidden`
pub type HiddenCallback = Box<dyn FnOnce()>;

/// Show request waiting for the overlay. Later requests replace the scope
/// and add their callbacks.
struct PendingShow {
    scope: DialogScope,
    on_hidden: Vec<HiddenCallback>,
}

/// Flags structural list changes so a running animation can be cut short
struct StructuralFlag(Rc<Cell<bool>>);

impl ListObserver for StructuralFlag {
    fn on_list_changed(&mut self, _cards: &[Card], change: &ListChange) {
        if change.is_structural() {
            self.0.set(true);
        }
    }
}

/// Builds the scoped engine for each showing run
pub type EngineFactory = Box<dyn Fn() -> TabListEngine>;

pub struct DialogCoordinator {
    kind: DialogKind,
    config: DialogConfig,
    state: DialogState,
    scope: Option<DialogScope>,
    make_engine: EngineFactory,
    engine: Option<TabListEngine>,
    model: DialogModel,
    binder: OverlayBinder,
    view: Weak<RefCell<OverlayView>>,
    renderer: ListRenderer,
    animation: Option<Animation>,
    pending_show: Option<PendingShow>,
    /// Callbacks of every show folded into the current run
    on_hidden: Vec<HiddenCallback>,
    tasks: TaskQueue<UiTask>,
    structural: Rc<Cell<bool>>,
}

impl DialogCoordinator {
    pub fn new(
        kind: DialogKind,
        config: &DialogConfig,
        view: &Rc<RefCell<OverlayView>>,
        tasks: TaskQueue<UiTask>,
        make_engine: EngineFactory,
    ) -> Self {
        Self {
            kind,
            config: config.clone(),
            state: DialogState::Hidden,
            scope: None,
            make_engine,
            engine: None,
            model: DialogModel::new(),
            binder: OverlayBinder,
            view: Rc::downgrade(view),
            renderer: ListRenderer::new(),
            animation: None,
            pending_show: None,
            on_hidden: Vec::new(),
            tasks,
            structural: Rc::new(Cell::new(false)),
        }
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn scope(&self) -> Option<DialogScope> {
        self.scope
    }

    /// Whether the host still holds the overlay view
    pub fn is_attached(&self) -> bool {
        self.view.strong_count() > 0
    }

    /// Token of the current showing run
    pub fn token(&self) -> Option<BindingToken> {
        self.model.token()
    }

    pub fn model(&self) -> &DialogModel {
        &self.model
    }

    /// The scoped engine, present from show until fully hidden
    pub fn engine(&self) -> Option<&TabListEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut TabListEngine> {
        self.engine.as_mut()
    }

    pub fn renderer(&self) -> &ListRenderer {
        &self.renderer
    }

    pub fn has_pending_show(&self) -> bool {
        self.pending_show.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // ========================================================================
    // Show
    // ========================================================================

    /// Show the dialog for `scope`.
    ///
    /// `on_hidden` runs exactly once, when the run this request joins
    /// reaches `Hidden`. A show on a dialog that is already up joins the
    /// current run. When the request is rejected with an error the callback
    /// is dropped without running.
    pub fn show(
        &mut self,
        collection: &dyn TabGroupView,
        scope: DialogScope,
        on_hidden: Option<HiddenCallback>,
    ) -> Result<ShowStatus, DialogError> {
        let items = self.items_for(collection, scope)?;
        Ok(self.show_items(collection, scope, &items, on_hidden.into_iter().collect()))
    }

    /// Start a show that was queued behind another run, once the overlay is
    /// free. Returns `Ok(None)` when nothing was waiting or the overlay is
    /// still busy.
    ///
    /// When the queued scope can no longer be shown the dialog stays hidden,
    /// so the queued callbacks run before the error is returned.
    pub fn retry_pending_show(
        &mut self,
        collection: &dyn TabGroupView,
    ) -> Result<Option<ShowStatus>, DialogError> {
        if self.state != DialogState::Hidden {
            return Ok(None);
        }
        let Some(PendingShow { scope, on_hidden }) = self.pending_show.take() else {
            return Ok(None);
        };
        let items = match self.items_for(collection, scope) {
            Ok(items) => items,
            Err(err) => {
                log::debug!(
                    "{} dropped its queued show: {}",
                    self.kind.display_name(),
                    err
                );
                on_hidden.into_iter().for_each(|callback| callback());
                return Err(err);
            }
        };
        let status = self.show_items(collection, scope, &items, on_hidden);
        Ok((status != ShowStatus::Queued).then_some(status))
    }

    fn items_for(
        &self,
        collection: &dyn TabGroupView,
        scope: DialogScope,
    ) -> Result<Vec<TabId>, DialogError> {
        if !self.is_attached() {
            return Err(DialogError::Detached);
        }
        let items = match scope {
            DialogScope::Group(tab) => collection.related_tabs(tab),
            DialogScope::Archived => collection.tab_ids(),
        };
        if items.is_empty() {
            return Err(DialogError::EmptyScope(format!(
                "{} has no tabs for {:?}",
                self.kind.display_name(),
                scope
            )));
        }
        Ok(items)
    }

    fn show_items(
        &mut self,
        collection: &dyn TabGroupView,
        scope: DialogScope,
        items: &[TabId],
        on_hidden: Vec<HiddenCallback>,
    ) -> ShowStatus {
        match self.state {
            DialogState::Showing | DialogState::Visible => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.reset(collection, Some(items), false);
                }
                self.scope = Some(scope);
                self.on_hidden.extend(on_hidden);
                self.refresh_header(collection);
                self.bind_view();
                log::info!("{} rescoped to {:?}", self.kind.display_name(), scope);
                ShowStatus::Rescoped
            }
            DialogState::Hiding => {
                log::debug!("{} still hiding, queueing show", self.kind.display_name());
                self.queue_show(scope, on_hidden);
                ShowStatus::Queued
            }
            DialogState::Hidden => {
                let token = BindingToken::new();
                let acquired = self
                    .view
                    .upgrade()
                    .is_some_and(|view| view.borrow_mut().acquire(token).is_ok());
                if !acquired {
                    log::debug!("{} waiting for the overlay", self.kind.display_name());
                    self.queue_show(scope, on_hidden);
                    return ShowStatus::Queued;
                }
                self.start(collection, token, scope, items, on_hidden);
                ShowStatus::Started
            }
        }
    }

    fn queue_show(&mut self, scope: DialogScope, on_hidden: Vec<HiddenCallback>) {
        let pending = self.pending_show.get_or_insert_with(|| PendingShow {
            scope,
            on_hidden: Vec::new(),
        });
        pending.scope = scope;
        pending.on_hidden.extend(on_hidden);
    }

    fn start(
        &mut self,
        collection: &dyn TabGroupView,
        token: BindingToken,
        scope: DialogScope,
        items: &[TabId],
        on_hidden: Vec<HiddenCallback>,
    ) {
        let mut engine = (self.make_engine)();
        engine.add_observer(Box::new(self.renderer.clone()));
        engine.add_observer(Box::new(StructuralFlag(Rc::clone(&self.structural))));
        engine.reset(collection, Some(items), false);
        self.engine = Some(engine);
        self.scope = Some(scope);
        self.on_hidden.extend(on_hidden);

        self.model.set_token(Some(token));
        self.refresh_header(collection);
        self.model.set(DialogKey::Visible, DialogValue::Flag(true));
        self.state = DialogState::Showing;
        log::info!(
            "{} showing {} tabs (token {})",
            self.kind.display_name(),
            items.len(),
            token
        );

        if self.config.enter_animation_ms == 0 {
            self.finish_showing();
        } else {
            self.animation = Some(Animation {
                phase: Phase::Enter,
                remaining_ms: self.config.enter_animation_ms,
            });
            self.model.set(DialogKey::Animating, DialogValue::Flag(true));
        }
        self.bind_view();
    }

    fn finish_showing(&mut self) {
        self.animation = None;
        self.state = DialogState::Visible;
        self.model.set(DialogKey::Animating, DialogValue::Flag(false));
        self.model
            .set(DialogKey::ListenersRegistered, DialogValue::Flag(true));
        crate::debug_info!("DIALOG", "{} visible", self.kind.display_name());
    }

    // ========================================================================
    // Hide
    // ========================================================================

    /// Start hiding. Without `animate` (or with a zero exit duration) the
    /// dialog is hidden synchronously.
    pub fn hide(&mut self, animate: bool) {
        match self.state {
            DialogState::Hidden | DialogState::Hiding => return,
            DialogState::Showing => self.finish_showing(),
            DialogState::Visible => {}
        }
        self.model
            .set(DialogKey::ListenersRegistered, DialogValue::Flag(false));
        self.state = DialogState::Hiding;
        log::info!("{} hiding", self.kind.display_name());

        if animate && self.config.exit_animation_ms > 0 {
            self.animation = Some(Animation {
                phase: Phase::Exit,
                remaining_ms: self.config.exit_animation_ms,
            });
            self.model.set(DialogKey::Animating, DialogValue::Flag(true));
            self.bind_view();
        } else {
            self.finish_hiding();
        }
    }

    /// Back press while the dialog is up hides it. Returns whether the press
    /// was consumed.
    pub fn handle_back_press(&mut self) -> bool {
        match self.state {
            DialogState::Showing | DialogState::Visible => {
                self.hide(true);
                true
            }
            DialogState::Hiding | DialogState::Hidden => false,
        }
    }

    fn finish_hiding(&mut self) {
        self.animation = None;
        if let Some(mut engine) = self.engine.take() {
            for (origin, counts) in engine.release() {
                crate::debug_info!(
                    "DIALOG",
                    "{:?}: {} committed, {} undone",
                    origin,
                    counts.committed,
                    counts.undone
                );
            }
        }
        self.model.set(DialogKey::Animating, DialogValue::Flag(false));
        self.model.set(DialogKey::Visible, DialogValue::Flag(false));
        self.bind_view();

        if let (Some(token), Some(view)) = (self.model.token(), self.view.upgrade()) {
            view.borrow_mut().release(token);
        }
        self.model.set_token(None);
        self.state = DialogState::Hidden;
        self.scope = None;
        log::info!("{} hidden", self.kind.display_name());

        for on_hidden in std::mem::take(&mut self.on_hidden) {
            on_hidden();
        }
        self.tasks.post(UiTask::OverlayReleased);
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Advance the running animation by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u64) {
        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        animation.remaining_ms = animation.remaining_ms.saturating_sub(elapsed_ms);
        if animation.remaining_ms == 0 {
            self.force_finish();
        }
    }

    /// Jump the running animation to its end state.
    pub fn force_finish(&mut self) {
        let Some(animation) = self.animation.take() else {
            return;
        };
        match animation.phase {
            Phase::Enter => {
                self.finish_showing();
                self.bind_view();
            }
            Phase::Exit => self.finish_hiding(),
        }
    }

    // ========================================================================
    // Events and tasks
    // ========================================================================

    /// Forward a collection event to the scoped engine while the dialog is
    /// up.
    pub fn handle_event(&mut self, collection: &dyn TabGroupView, event: &TabEvent) {
        if !matches!(self.state, DialogState::Showing | DialogState::Visible) {
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        self.structural.set(false);
        engine.handle_event(collection, event);
        let notices = engine.take_notices();

        if self.structural.get() && self.animation.is_some() {
            crate::debug_log!("DIALOG", "structural change during animation, finishing it");
            self.force_finish();
        }
        for notice in notices {
            match notice {
                EngineNotice::ScopeEmptied => {
                    if let Some(token) = self.model.token() {
                        // Let the removal finish propagating before tearing down.
                        self.tasks.post(UiTask::HideIfEmpty {
                            dialog: self.kind,
                            token,
                        });
                        log::debug!("{} is empty, hide scheduled", self.kind.display_name());
                    }
                }
                EngineNotice::GroupContentChanged { .. } => self.refresh_header(collection),
            }
        }
        self.refresh_header(collection);
        self.bind_view();
    }

    /// Run a posted task addressed to this dialog.
    pub fn run_task(&mut self, task: &UiTask) {
        if let UiTask::HideIfEmpty { dialog, token } = *task
            && dialog == self.kind
        {
            self.hide_if_empty(token);
        }
    }

    fn hide_if_empty(&mut self, token: BindingToken) {
        if self.model.token() != Some(token) {
            log::debug!("Dropping hide for a finished {} run", self.kind.display_name());
            return;
        }
        let remaining = self
            .engine
            .as_ref()
            .map_or(0, |engine| engine.cards().tab_card_count());
        if remaining > 0 {
            log::info!(
                "{} regained {} tabs, hide cancelled",
                self.kind.display_name(),
                remaining
            );
            return;
        }
        self.hide(true);
    }

    // ========================================================================
    // Header and binding
    // ========================================================================

    fn refresh_header(&mut self, collection: &dyn TabGroupView) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let count = engine.cards().tab_card_count();
        match self.scope {
            Some(DialogScope::Group(_)) => {
                let group = engine.scope_group();
                let title = group
                    .and_then(|group| collection.group_title(group))
                    .filter(|title| !title.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| tab_count_label(count));
                self.model.set(DialogKey::Title, DialogValue::Text(title));
                if let Some(group) = group {
                    self.model.set(
                        DialogKey::Color,
                        DialogValue::Color(collection.group_color(group)),
                    );
                }
            }
            Some(DialogScope::Archived) => {
                let title = if count == 1 {
                    "1 inactive tab".to_string()
                } else {
                    format!("{count} inactive tabs")
                };
                self.model.set(DialogKey::Title, DialogValue::Text(title));
            }
            None => return,
        }
        self.model.set(DialogKey::TabCount, DialogValue::Count(count));
    }

    fn bind_view(&mut self) {
        let Some(view) = self.view.upgrade() else {
            log::debug!("{} has no overlay view to bind", self.kind.display_name());
            return;
        };
        self.binder.bind(&mut self.model, &mut view.borrow_mut());
    }
}
