//! List engine synchronization tests: reset, selection, closures, groups.

mod common;

use common::{
    card_tabs, deliver, grid_engine, group, group_engine, numbered_model, selected_indices,
    show_grid,
};
use tab_grid::card::{CardType, ListChange};
use tab_grid::collection::{
    ClosedFrom, ClosureRequest, LaunchType, NewTab, TabGroupView, TabMutator,
};
use tab_grid::engine::{CloseOutcome, EngineNotice, MenuItem};

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_second_reset_refreshes_in_place() {
    let mut model = numbered_model(3);
    let mut t = grid_engine();

    assert!(!show_grid(&mut t.engine, &model));
    let inserted = t
        .changes
        .structural()
        .into_iter()
        .filter(|c| matches!(c, ListChange::Inserted { .. }))
        .count();
    assert_eq!(inserted, 3);

    assert!(show_grid(&mut t.engine, &model), "same items should take the quick path");
    assert!(t.changes.structural().is_empty());
    assert_eq!(card_tabs(&t.engine), vec![1, 2, 3]);

    model.select_tab(2);
    model.drain_events();
    assert!(show_grid(&mut t.engine, &model));
    assert_eq!(selected_indices(&t.engine), vec![1]);
}

#[test]
fn test_reset_with_new_items_rebuilds() {
    let mut model = numbered_model(3);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    t.changes.take();

    let reps = model.representatives();
    t.engine.reset(&model, Some(&reps[..2]), false);
    let changes = t.changes.structural();
    assert_eq!(changes.first(), Some(&ListChange::Cleared));
    assert_eq!(card_tabs(&t.engine), vec![1, 2]);

    // Hidden engines ignore events
    t.engine.reset(&model, None, false);
    assert!(!t.engine.is_showing());
    model.add_tab(NewTab::new("Late", "https://late.example"));
    deliver(&mut t.engine, &mut model);
    assert!(t.engine.cards().is_empty());
}

#[test]
fn test_reset_keeps_group_card_when_shown_member_changes() {
    let mut model = numbered_model(3);
    group(&mut model, &[1, 2], Some("Work"));
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    assert_eq!(card_tabs(&t.engine), vec![1, 3]);

    // Selecting tab 2 without telling the engine makes it the group's shown
    // member behind the engine's back
    model.select_tab(2);
    model.drain_events();
    t.changes.take();

    assert!(show_grid(&mut t.engine, &model));
    assert_eq!(card_tabs(&t.engine), vec![2, 3]);
    let changes = t.changes.take();
    assert!(changes.iter().any(|c| matches!(c, ListChange::Relabeled { index: 0, .. })));
    assert!(!changes.iter().any(ListChange::is_structural));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_only_one_card_is_selected() {
    let mut model = numbered_model(3);
    model.select_tab(1);
    model.drain_events();
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    assert_eq!(selected_indices(&t.engine), vec![0]);

    model.select_tab(3);
    deliver(&mut t.engine, &mut model);
    assert_eq!(selected_indices(&t.engine), vec![2]);

    model.select_tab(2);
    deliver(&mut t.engine, &mut model);
    assert_eq!(selected_indices(&t.engine), vec![1]);
}

#[test]
fn test_selecting_group_member_relabels_group_card() {
    let mut model = numbered_model(3);
    group(&mut model, &[1, 2], None);
    model.select_tab(3);
    model.drain_events();
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    model.select_tab(2);
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![2, 3]);
    assert_eq!(selected_indices(&t.engine), vec![0]);
}

// ============================================================================
// Closures
// ============================================================================

#[test]
fn test_closing_representative_relabels_surviving_group() {
    let mut model = numbered_model(3);
    group(&mut model, &[1, 2], Some("Work"));
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    assert_eq!(card_tabs(&t.engine), vec![1, 3]);

    model.close_tabs(ClosureRequest {
        ids: vec![1],
        allow_undo: true,
        origin: ClosedFrom::TabStrip,
    });
    deliver(&mut t.engine, &mut model);

    assert_eq!(card_tabs(&t.engine), vec![2, 3]);
    let card = t.engine.cards().get(0).expect("group card");
    assert_eq!(card.card_type(), CardType::TabGroup);
    assert_eq!(card.tab_count(), Some(1));
    assert_eq!(card.title(), Some("Work"));
}

#[test]
fn test_closing_group_card_closes_every_member() {
    let mut model = numbered_model(3);
    group(&mut model, &[1, 2], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let outcome = t.engine.on_close_clicked(&mut model, 1);
    let CloseOutcome::Closed(request) = outcome else {
        panic!("expected the group to close, got {outcome:?}");
    };
    assert_eq!(request.ids, vec![1, 2]);
    assert_eq!(request.origin, ClosedFrom::TabSwitcherGroup);

    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![3]);
}

#[test]
fn test_closing_last_tab_waits_for_confirmation() {
    let mut model = numbered_model(1);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let outcome = t.engine.on_close_clicked(&mut model, 1);
    let CloseOutcome::NeedsConfirmation(request) = outcome else {
        panic!("expected a confirmation request, got {outcome:?}");
    };
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1], "nothing closes before confirming");

    assert!(matches!(
        t.engine.confirm_close(&mut model, request),
        CloseOutcome::Closed(_)
    ));
    deliver(&mut t.engine, &mut model);
    assert!(card_tabs(&t.engine).is_empty());
    assert!(t.engine.take_notices().contains(&EngineNotice::ScopeEmptied));
}

#[test]
fn test_undo_restores_card_and_counts_it() {
    let mut model = numbered_model(3);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    t.engine.on_close_clicked(&mut model, 2);
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1, 3]);

    assert!(model.undo_closure(2));
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1, 2, 3]);

    let counts = t.engine.hard_cleanup();
    let grid = counts.get(&ClosedFrom::TabSwitcher).expect("grid counts");
    assert_eq!(grid.undone, 1);
    assert_eq!(grid.committed, 0);
}

#[test]
fn test_non_undoable_removal_of_group_representative() {
    let mut model = numbered_model(3);
    group(&mut model, &[1, 2], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    model.close_tabs(ClosureRequest {
        ids: vec![1],
        allow_undo: false,
        origin: ClosedFrom::External,
    });
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![2, 3]);
    assert_eq!(t.engine.cards().get(0).and_then(|c| c.tab_count()), Some(1));
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn test_merge_folds_two_cards_into_one_group_card() {
    let mut model = numbered_model(3);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    assert!(t.engine.merge_cards(&mut model, 1, 2));
    deliver(&mut t.engine, &mut model);

    assert_eq!(card_tabs(&t.engine), vec![2, 3]);
    let card = t.engine.cards().get(0).expect("group card");
    assert_eq!(card.card_type(), CardType::TabGroup);
    assert_eq!(card.tab_count(), Some(2));
    assert_eq!(card.title(), Some("2 tabs"));
    assert_eq!(card.content_description(), Some("Group with 2 tabs"));
}

#[test]
fn test_merge_refused_onto_own_group() {
    let mut model = numbered_model(3);
    group(&mut model, &[1, 2], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    assert!(!t.engine.merge_cards(&mut model, 2, 1));
    assert!(!t.engine.merge_cards(&mut model, 3, 3));
}

#[test]
fn test_rename_and_recolor_rebind_group_card() {
    let mut model = numbered_model(3);
    let id = group(&mut model, &[1, 2], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    t.engine
        .on_menu_item(&mut model, 1, MenuItem::Rename(Some("Work".into())));
    deliver(&mut t.engine, &mut model);
    let card = t.engine.cards().get(0).expect("group card");
    assert_eq!(card.title(), Some("Work"));
    assert_eq!(card.content_description(), Some("Work group, 2 tabs"));
    assert_eq!(card.close_button_description(), Some("Close Work group"));

    t.engine
        .on_menu_item(&mut model, 1, MenuItem::Rename(Some("   ".into())));
    deliver(&mut t.engine, &mut model);
    assert_eq!(model.group_title(id), None);
    assert_eq!(t.engine.cards().get(0).and_then(|c| c.title()), Some("2 tabs"));

    t.engine.on_menu_item(
        &mut model,
        1,
        MenuItem::Recolor(tab_grid_config::GroupColor::Purple),
    );
    deliver(&mut t.engine, &mut model);
    assert_eq!(
        t.engine.cards().get(0).and_then(|c| c.group_color()),
        Some(tab_grid_config::GroupColor::Purple)
    );
}

#[test]
fn test_ungroup_in_single_group_scope_removes_card() {
    let mut model = numbered_model(4);
    group(&mut model, &[1, 2, 3], None);
    let mut t = group_engine();
    let members = model.related_tabs(1);
    t.engine.reset(&model, Some(&members), false);
    assert_eq!(card_tabs(&t.engine), vec![1, 2, 3]);
    assert!(
        t.engine
            .cards()
            .iter()
            .all(|card| card.card_type() == CardType::Tab)
    );

    t.engine.ungroup_tab(&mut model, 2);
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1, 3]);
    assert!(
        t.engine
            .take_notices()
            .contains(&EngineNotice::GroupContentChanged { tab: Some(1) })
    );
}

#[test]
fn test_single_group_scope_adds_new_member_in_order() {
    let mut model = numbered_model(3);
    let id = group(&mut model, &[1, 2], None);
    let mut t = group_engine();
    let members = model.related_tabs(1);
    t.engine.reset(&model, Some(&members), false);

    let added = model.add_tab(NewTab::new("Joined", "https://joined.example").in_group(id));
    model.add_tab(NewTab::new("Elsewhere", "https://elsewhere.example"));
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1, 2, added]);
}

#[test]
fn test_move_group_moves_its_card() {
    let mut model = numbered_model(4);
    group(&mut model, &[3, 4], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    assert_eq!(card_tabs(&t.engine), vec![1, 2, 3]);

    assert!(model.move_group(3, 0));
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![3, 1, 2]);
}

#[test]
fn test_move_within_group_follows_neighbor() {
    let mut model = numbered_model(4);
    group(&mut model, &[1, 2, 3], None);
    let mut t = group_engine();
    let members = model.related_tabs(1);
    t.engine.reset(&model, Some(&members), false);
    t.changes.take();

    // Moving down lands after the tab that now precedes it
    assert!(model.move_tab_within_group(1, 2));
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![2, 3, 1]);
    assert_eq!(t.changes.structural(), vec![ListChange::Moved { from: 0, to: 2 }]);

    // Moving up lands before the tab that now follows it
    assert!(model.move_tab_within_group(3, 0));
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![3, 2, 1]);
    assert_eq!(t.changes.structural(), vec![ListChange::Moved { from: 1, to: 0 }]);
}

#[test]
fn test_move_within_group_keeps_grid_layout() {
    let mut model = numbered_model(4);
    group(&mut model, &[1, 2, 3], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    let before = card_tabs(&t.engine);
    t.changes.take();

    assert!(model.move_tab_within_group(2, 0));
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), before);
    assert!(t.changes.structural().is_empty());
}

// ============================================================================
// Tolerance
// ============================================================================

#[test]
fn test_events_before_restore_are_ignored() {
    let mut model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    t.changes.take();

    model.set_restored(false);
    model.add_tab(NewTab::new("Early", "https://early.example"));
    model.select_tab(2);
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1, 2]);
    assert!(t.changes.take().is_empty());

    model.set_restored(true);
    show_grid(&mut t.engine, &model);
    assert_eq!(card_tabs(&t.engine), vec![1, 2, 3]);
}

#[test]
fn test_group_events_for_tabs_outside_scope_are_ignored() {
    let mut model = numbered_model(5);
    group(&mut model, &[1, 2], None);
    group(&mut model, &[3, 4], None);
    let mut t = group_engine();
    let members = model.related_tabs(1);
    t.engine.reset(&model, Some(&members), false);
    t.changes.take();

    // Split and merge in the other group: neither tab has a card here
    model.move_tab_out_of_group(4);
    model.merge_into_group(3, &[5]);
    let events = deliver(&mut t.engine, &mut model);
    assert_eq!(events.len(), 2);

    assert_eq!(card_tabs(&t.engine), vec![1, 2]);
    assert!(t.changes.take().is_empty());
    assert!(t.engine.take_notices().is_empty());
}

#[test]
fn test_member_merged_into_other_group_leaves_group_list() {
    let mut model = numbered_model(4);
    group(&mut model, &[1, 2], None);
    group(&mut model, &[3, 4], None);
    let mut t = group_engine();
    let members = model.related_tabs(1);
    t.engine.reset(&model, Some(&members), false);
    t.changes.take();

    model.merge_into_group(3, &[2]);
    deliver(&mut t.engine, &mut model);
    assert_eq!(card_tabs(&t.engine), vec![1]);
    let structural = t.changes.structural();
    assert!(
        matches!(structural.as_slice(), [ListChange::Removed { index: 1, .. }]),
        "{structural:?}"
    );
    assert!(
        t.engine
            .take_notices()
            .contains(&EngineNotice::GroupContentChanged { tab: Some(2) })
    );
}

// ============================================================================
// Delayed add
// ============================================================================

#[test]
fn test_add_from_switcher_is_delayed_until_hidden() {
    let mut model = numbered_model(2);
    model.select_tab(1);
    model.drain_events();
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let added = model.add_tab(
        NewTab::new("Fresh", "https://fresh.example")
            .launched(LaunchType::FromTabSwitcher)
            .selected(),
    );
    deliver(&mut t.engine, &mut model);
    assert_eq!(t.engine.delayed_tab(), Some(added));
    assert_eq!(card_tabs(&t.engine), vec![1, 2]);

    t.engine.post_hiding(&model);
    assert_eq!(t.engine.delayed_tab(), None);
    assert_eq!(card_tabs(&t.engine), vec![1, 2, added]);
    assert_eq!(selected_indices(&t.engine), vec![2]);
}

#[test]
fn test_removing_delayed_tab_cancels_replay() {
    let mut model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let added = model.add_tab(
        NewTab::new("Fresh", "https://fresh.example")
            .launched(LaunchType::FromTabGroupUi)
            .selected(),
    );
    deliver(&mut t.engine, &mut model);
    assert_eq!(t.engine.delayed_tab(), Some(added));

    model.remove_tab(added);
    deliver(&mut t.engine, &mut model);
    assert_eq!(t.engine.delayed_tab(), None);
    t.engine.post_hiding(&model);
    assert_eq!(card_tabs(&t.engine), vec![1, 2]);
}
