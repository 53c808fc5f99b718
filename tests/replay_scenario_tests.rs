//! Scripted scenarios run end to end through the switcher host.

mod common;

use common::config_dir;
use tab_grid::dialog::DialogState;
use tab_grid::error::{DialogError, ScenarioError};
use tab_grid::replay::{Scenario, run_scenario};
use tab_grid_config::Config;

const WORK_SCENARIO: &str = r#"
tabs:
  - { title: Docs, url: "https://docs.rs", group: work }
  - { title: Crates, url: "https://crates.io", group: work }
  - { title: News, url: "https://news.example.com" }
groups:
  work: { title: Work, color: blue }
selected: 3
steps: []
"#;

fn work_scenario(steps: &str) -> Scenario {
    let text = WORK_SCENARIO.replace("steps: []", steps);
    Scenario::from_yaml(&text).expect("scenario parses")
}

#[test]
fn test_close_and_undo_restores_grid() {
    let scenario = work_scenario(
        r#"
steps:
  - op: show_switcher
  - op: close
    tab: 3
  - op: undo
    tab: 3
"#,
    );
    let report = run_scenario(&scenario, Config::default()).expect("runs");

    assert_eq!(report.grid.len(), 2);
    assert!(report.grid[0].contains("group"), "{:?}", report.grid);
    assert!(report.grid[0].contains("\"Work\" (2)"), "{:?}", report.grid);
    assert!(report.grid[1].contains("\"News\""), "{:?}", report.grid);
    assert!(report.notes.is_empty(), "{:?}", report.notes);
    assert!(!report.awaiting_confirmation);
}

#[test]
fn test_group_dialog_close_leaves_sibling() {
    let scenario = work_scenario(
        r#"
steps:
  - op: show_switcher
  - op: open_group
    tab: 1
  - op: tick
    ms: 300
  - op: close
    tab: 1
    surface: group_dialog
"#,
    );
    let report = run_scenario(&scenario, Config::default()).expect("runs");

    assert_eq!(report.group_dialog.state, DialogState::Visible);
    assert_eq!(report.group_dialog.tabs, vec![2]);
    assert_eq!(report.overlay_title.as_deref(), Some("Work"));
    assert!(report.notes.iter().any(|note| note.contains("Started")));
}

#[test]
fn test_restoring_last_archived_tab_hides_dialog() {
    let text = r#"
tabs:
  - { title: Docs, url: "https://docs.rs" }
archived:
  - { title: Old, url: "https://old.example" }
steps:
  - op: show_switcher
  - op: open_archived
  - op: tick
    ms: 300
  - op: click
    tab: 2
    surface: archived_dialog
  - op: tick
    ms: 250
"#;
    let scenario = Scenario::from_yaml(text).expect("scenario parses");
    let report = run_scenario(&scenario, Config::default()).expect("runs");

    assert_eq!(report.archived_dialog.state, DialogState::Hidden);
    assert!(report.archived_dialog.tabs.is_empty());
    assert_eq!(report.grid.len(), 2);
    assert!(report.grid[1].contains("\"Old\""), "{:?}", report.grid);
}

#[test]
fn test_report_display_lists_cards() {
    let scenario = work_scenario("steps:\n  - op: show_switcher\n");
    let report = run_scenario(&scenario, Config::default()).expect("runs");
    let text = report.to_string();
    assert!(text.starts_with("grid (2 cards):"));
    assert!(text.contains("group dialog: Hidden []"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_tab_is_an_error() {
    let scenario = work_scenario("steps:\n  - op: close\n    tab: 99\n");
    assert!(matches!(
        run_scenario(&scenario, Config::default()),
        Err(ScenarioError::UnknownTab(99))
    ));
}

#[test]
fn test_unknown_group_is_an_error() {
    let scenario = work_scenario("steps:\n  - op: new_tab\n    title: Extra\n    group: play\n");
    assert!(matches!(
        run_scenario(&scenario, Config::default()),
        Err(ScenarioError::UnknownGroup(name)) if name == "play"
    ));

    let seeded =
        Scenario::from_yaml("tabs:\n  - { title: A, url: \"https://a.example\", group: ghost }\n")
            .expect("scenario parses");
    assert!(matches!(
        run_scenario(&seeded, Config::default()),
        Err(ScenarioError::UnknownGroup(_))
    ));
}

#[test]
fn test_empty_archive_fails_the_step() {
    let scenario = work_scenario("steps:\n  - op: show_switcher\n  - op: open_archived\n");
    match run_scenario(&scenario, Config::default()) {
        Err(ScenarioError::Dialog { step, source }) => {
            assert_eq!(step, 1);
            assert!(matches!(source, DialogError::EmptyScope(_)));
        }
        other => panic!("expected a dialog error, got {other:?}"),
    }
}

#[test]
fn test_unknown_op_fails_to_parse() {
    let result = Scenario::from_yaml("steps:\n  - op: teleport\n");
    assert!(matches!(result, Err(ScenarioError::Parse(_))));
}

#[test]
fn test_scenario_loads_from_file() {
    let dir = config_dir();
    let path = dir.path().join("scenario.yaml");
    std::fs::write(&path, WORK_SCENARIO).expect("write scenario");

    let scenario = Scenario::from_path(&path).expect("loads");
    assert_eq!(scenario.tabs.len(), 3);
    assert_eq!(scenario.selected, Some(3));

    let missing = Scenario::from_path(&dir.path().join("missing.yaml"));
    assert!(matches!(missing, Err(ScenarioError::Read { .. })));
}
