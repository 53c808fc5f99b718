//! Scripted scenarios run through a [`TabSwitcher`].
//!
//! A scenario is a YAML document describing the starting collections and a
//! list of steps:
//!
//! ```yaml
//! tabs:
//!   - { title: Docs, url: "https://docs.rs", group: work }
//!   - { title: Crates, url: "https://crates.io", group: work }
//!   - { title: News, url: "https://news.example.com" }
//! groups:
//!   work: { title: Work, color: blue }
//! selected: 3
//! steps:
//!   - op: show_switcher
//!   - op: close
//!     tab: 3
//!   - op: undo
//!     tab: 3
//! ```
//!
//! Tabs get ids `1..` in listing order, archived tabs continue the
//! numbering.

use crate::card::{Card, CardType, MessageKind};
use crate::collection::{LaunchType, NewTab, TabGroupView, TabInfo, TabMutator};
use crate::dialog::{DialogCoordinator, DialogState};
use crate::engine::{CloseOutcome, MenuItem};
use crate::error::ScenarioError;
use crate::fetch::{FetchOutcome, FetchRequest};
use crate::host::{Surface, TabSwitcher};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tab_grid_config::{Config, GroupColor, GroupId, TabId};

#[derive(Debug, Clone, Deserialize)]
pub struct TabSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// Key into the scenario's `groups` table
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: GroupColor,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceSpec {
    #[default]
    Grid,
    GroupDialog,
    ArchivedDialog,
}

impl From<SurfaceSpec> for Surface {
    fn from(spec: SurfaceSpec) -> Self {
        match spec {
            SurfaceSpec::Grid => Surface::Grid,
            SurfaceSpec::GroupDialog => Surface::GroupDialog,
            SurfaceSpec::ArchivedDialog => Surface::ArchivedDialog,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchSpec {
    #[default]
    FromLink,
    FromTabSwitcher,
    FromTabGroupUi,
    FromRestore,
}

impl From<LaunchSpec> for LaunchType {
    fn from(spec: LaunchSpec) -> Self {
        match spec {
            LaunchSpec::FromLink => LaunchType::FromLink,
            LaunchSpec::FromTabSwitcher => LaunchType::FromTabSwitcher,
            LaunchSpec::FromTabGroupUi => LaunchType::FromTabGroupUi,
            LaunchSpec::FromRestore => LaunchType::FromRestore,
        }
    }
}

/// One scripted user or collection action
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    ShowSwitcher {
        #[serde(default)]
        quick: bool,
    },
    HideSwitcher,
    NewTab {
        #[serde(default)]
        title: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        group: Option<String>,
        #[serde(default)]
        select: bool,
        #[serde(default)]
        launch: LaunchSpec,
    },
    Select {
        tab: TabId,
    },
    Click {
        tab: TabId,
        #[serde(default)]
        surface: SurfaceSpec,
    },
    Close {
        tab: TabId,
        #[serde(default)]
        surface: SurfaceSpec,
    },
    ConfirmClose,
    Undo {
        tab: TabId,
    },
    Commit,
    Merge {
        source: TabId,
        target: TabId,
    },
    Ungroup {
        tab: TabId,
        #[serde(default)]
        surface: SurfaceSpec,
    },
    Rename {
        tab: TabId,
        #[serde(default)]
        title: Option<String>,
    },
    Recolor {
        tab: TabId,
        color: GroupColor,
    },
    MoveInGroup {
        tab: TabId,
        index: usize,
    },
    MoveGroup {
        tab: TabId,
        position: usize,
    },
    SetTitle {
        tab: TabId,
        title: String,
    },
    SetUrl {
        tab: TabId,
        url: String,
    },
    OpenGroup {
        tab: TabId,
    },
    OpenArchived,
    Archive {
        tab: TabId,
    },
    Restore {
        tab: TabId,
    },
    Back,
    Tick {
        ms: u64,
    },
    AnswerFetches,
    AddMessage {
        text: String,
        #[serde(default)]
        index: usize,
    },
    Selectable {
        enabled: bool,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub tabs: Vec<TabSpec>,
    #[serde(default)]
    pub archived: Vec<TabSpec>,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupSpec>,
    #[serde(default)]
    pub selected: Option<TabId>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}

/// State of one dialog after a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogReport {
    pub state: DialogState,
    pub tabs: Vec<TabId>,
}

/// What a scenario left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// One line per grid card
    pub grid: Vec<String>,
    pub group_dialog: DialogReport,
    pub archived_dialog: DialogReport,
    pub overlay_title: Option<String>,
    pub awaiting_confirmation: bool,
    /// One line per step outcome worth reporting
    pub notes: Vec<String>,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grid ({} cards):", self.grid.len())?;
        for line in &self.grid {
            writeln!(f, "  {line}")?;
        }
        writeln!(
            f,
            "group dialog: {:?} {:?}",
            self.group_dialog.state, self.group_dialog.tabs
        )?;
        writeln!(
            f,
            "archived dialog: {:?} {:?}",
            self.archived_dialog.state, self.archived_dialog.tabs
        )?;
        if let Some(title) = &self.overlay_title {
            writeln!(f, "overlay title: {title}")?;
        }
        if self.awaiting_confirmation {
            writeln!(f, "close awaiting confirmation")?;
        }
        for note in &self.notes {
            writeln!(f, "note: {note}")?;
        }
        Ok(())
    }
}

/// Build the collections a scenario starts from and run its steps.
pub fn run_scenario(scenario: &Scenario, config: Config) -> Result<ReplayReport, ScenarioError> {
    let mut switcher = TabSwitcher::new(config);
    let groups = seed(&mut switcher, scenario)?;
    let mut notes = Vec::new();

    for (step_number, step) in scenario.steps.iter().enumerate() {
        crate::debug_info!("REPLAY", "step {}: {:?}", step_number, step);
        run_step(&mut switcher, &groups, step, step_number, &mut notes)?;
        switcher.pump();
    }

    Ok(report(&switcher, notes))
}

fn seed(
    switcher: &mut TabSwitcher,
    scenario: &Scenario,
) -> Result<BTreeMap<String, GroupId>, ScenarioError> {
    let regular = switcher.regular_mut();
    let mut members: BTreeMap<String, Vec<TabId>> = BTreeMap::new();
    for spec in &scenario.tabs {
        let id = regular.add_tab(NewTab::new(spec.title.clone(), spec.url.clone()));
        if let Some(group) = &spec.group {
            if !scenario.groups.contains_key(group) {
                return Err(ScenarioError::UnknownGroup(group.clone()));
            }
            members.entry(group.clone()).or_default().push(id);
        }
    }

    let mut groups = BTreeMap::new();
    for (name, spec) in &scenario.groups {
        let Some(tabs) = members.get(name) else {
            continue;
        };
        if let Some(group) = regular.create_group(tabs, spec.title.clone(), spec.color) {
            groups.insert(name.clone(), group);
        }
    }
    if let Some(selected) = scenario.selected {
        if regular.tab(selected).is_none() {
            return Err(ScenarioError::UnknownTab(selected));
        }
        TabMutator::select_tab(regular, selected);
    }

    // Archived tabs continue the regular numbering
    let mut next_id = regular.tab_ids().into_iter().max().unwrap_or(0) + 1;
    regular.drain_events();
    let archived = switcher.archived_mut();
    for spec in &scenario.archived {
        let info = TabInfo {
            id: next_id,
            title: spec.title.clone(),
            url: spec.url.clone(),
            group: None,
        };
        archived.adopt_tab(info, LaunchType::FromRestore, false);
        next_id += 1;
    }
    archived.drain_events();
    Ok(groups)
}

fn require_tab(switcher: &TabSwitcher, tab: TabId) -> Result<TabId, ScenarioError> {
    if switcher.regular().tab(tab).is_some() || switcher.archived().tab(tab).is_some() {
        Ok(tab)
    } else {
        Err(ScenarioError::UnknownTab(tab))
    }
}

fn require_group(groups: &BTreeMap<String, GroupId>, name: &str) -> Result<GroupId, ScenarioError> {
    groups
        .get(name)
        .copied()
        .ok_or_else(|| ScenarioError::UnknownGroup(name.to_string()))
}

fn run_step(
    switcher: &mut TabSwitcher,
    groups: &BTreeMap<String, GroupId>,
    step: &Step,
    step_number: usize,
    notes: &mut Vec<String>,
) -> Result<(), ScenarioError> {
    let dialog_error = |source| ScenarioError::Dialog {
        step: step_number,
        source,
    };
    match step {
        Step::ShowSwitcher { quick } => {
            if switcher.show_switcher(*quick) {
                notes.push(format!("step {step_number}: switcher shown without rebuild"));
            }
        }
        Step::HideSwitcher => switcher.hide_switcher(),
        Step::NewTab {
            title,
            url,
            group,
            select,
            launch,
        } => {
            let mut new_tab = NewTab::new(title.clone(), url.clone()).launched((*launch).into());
            if let Some(name) = group {
                new_tab = new_tab.in_group(require_group(groups, name)?);
            }
            if *select {
                new_tab = new_tab.selected();
            }
            let id = switcher.regular_mut().add_tab(new_tab);
            notes.push(format!("step {step_number}: opened tab {id}"));
        }
        Step::Select { tab } => {
            let tab = require_tab(switcher, *tab)?;
            TabMutator::select_tab(switcher.regular_mut(), tab);
        }
        Step::Click { tab, surface } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.click((*surface).into(), tab);
        }
        Step::Close { tab, surface } => {
            let tab = require_tab(switcher, *tab)?;
            match switcher.close((*surface).into(), tab) {
                CloseOutcome::NeedsConfirmation(request) => notes.push(format!(
                    "step {step_number}: closing {:?} needs confirmation",
                    request.ids
                )),
                CloseOutcome::Cancelled => {
                    notes.push(format!("step {step_number}: close cancelled"))
                }
                CloseOutcome::Ignored => {
                    notes.push(format!("step {step_number}: no card for tab {tab}"))
                }
                CloseOutcome::Closed(_) => {}
            }
        }
        Step::ConfirmClose => {
            switcher.confirm_close();
        }
        Step::Undo { tab } => {
            if !switcher.undo_close(*tab) {
                notes.push(format!("step {step_number}: tab {tab} is not pending closure"));
            }
        }
        Step::Commit => switcher.commit_closures(),
        Step::Merge { source, target } => {
            let source = require_tab(switcher, *source)?;
            let target = require_tab(switcher, *target)?;
            if !switcher.merge(source, target) {
                notes.push(format!("step {step_number}: merge of {source} into {target} refused"));
            }
        }
        Step::Ungroup { tab, surface } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.menu((*surface).into(), tab, MenuItem::Ungroup);
        }
        Step::Rename { tab, title } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.menu(Surface::Grid, tab, MenuItem::Rename(title.clone()));
        }
        Step::Recolor { tab, color } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.menu(Surface::Grid, tab, MenuItem::Recolor(*color));
        }
        Step::MoveInGroup { tab, index } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.regular_mut().move_tab_within_group(tab, *index);
        }
        Step::MoveGroup { tab, position } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.regular_mut().move_group(tab, *position);
        }
        Step::SetTitle { tab, title } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.regular_mut().update_tab_title(tab, title.clone());
        }
        Step::SetUrl { tab, url } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.regular_mut().update_tab_url(tab, url.clone());
        }
        Step::OpenGroup { tab } => {
            let tab = require_tab(switcher, *tab)?;
            let status = switcher.open_group_dialog(tab).map_err(dialog_error)?;
            notes.push(format!("step {step_number}: group dialog {status:?}"));
        }
        Step::OpenArchived => {
            let status = switcher.open_archived_dialog().map_err(dialog_error)?;
            notes.push(format!("step {step_number}: archived dialog {status:?}"));
        }
        Step::Archive { tab } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.archive_tab(tab);
        }
        Step::Restore { tab } => {
            let tab = require_tab(switcher, *tab)?;
            switcher.restore_archived(tab);
        }
        Step::Back => {
            if !switcher.back_press() {
                notes.push(format!("step {step_number}: back press not consumed"));
            }
        }
        Step::Tick { ms } => switcher.tick(*ms),
        Step::AnswerFetches => {
            let applied = switcher.answer_fetches(|request| match request {
                FetchRequest::Thumbnail(fetcher) => FetchOutcome::Image(fetcher.tab_id),
                FetchRequest::Favicon(fetcher) => FetchOutcome::Image(1000 + fetcher.tab_id),
            });
            notes.push(format!("step {step_number}: {applied} images applied"));
        }
        Step::AddMessage { text, index } => {
            let added = switcher.grid_mut().add_message_card(
                MessageKind::Announcement,
                Some(step_number as u64),
                text.clone(),
                *index,
            );
            if let Err(e) = added {
                log::warn!("Message card not added: {}", e);
            }
        }
        Step::Selectable { enabled } => switcher.set_selectable(*enabled),
    }
    Ok(())
}

fn card_line(index: usize, card: &Card) -> String {
    let kind = match card.card_type() {
        CardType::Tab => "tab",
        CardType::TabGroup => "group",
        CardType::Message => "message",
        CardType::Divider => "divider",
    };
    let mut line = format!("[{index}] {} {kind}", card.id());
    if let Some(title) = card.title().or(card.message_text()) {
        line.push_str(&format!(" \"{title}\""));
    }
    if let Some(count) = card.tab_count() {
        line.push_str(&format!(" ({count})"));
    }
    if card.is_selected() {
        line.push_str(" *");
    }
    line
}

fn dialog_report(dialog: &DialogCoordinator) -> DialogReport {
    DialogReport {
        state: dialog.state(),
        tabs: dialog
            .engine()
            .map(|engine| engine.cards().tab_ids())
            .unwrap_or_default(),
    }
}

fn report(switcher: &TabSwitcher, notes: Vec<String>) -> ReplayReport {
    let grid = switcher
        .grid()
        .cards()
        .iter()
        .enumerate()
        .map(|(index, card)| card_line(index, card))
        .collect();
    let overlay = switcher.overlay().borrow();
    ReplayReport {
        grid,
        group_dialog: dialog_report(switcher.group_dialog()),
        archived_dialog: dialog_report(switcher.archived_dialog()),
        overlay_title: overlay.title().map(str::to_string),
        awaiting_confirmation: switcher.pending_confirmation().is_some(),
        notes,
    }
}

