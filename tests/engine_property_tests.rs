//! Property-based checks of card identity and list/collection agreement.
//!
//! Verifies:
//! 1. CardSequence: the id index always points at the card carrying that id
//! 2. Grid engine over ungrouped tabs: after any mix of opens, closes, undos,
//!    commits, selections and retitles, the cards mirror the live tabs in
//!    order, ids stay unique and at most one card is selected
//! 3. Grid and single-group engines under group merges, ungroups and moves
//!    mixed with the above: ids stay unique and at most one card is selected

mod common;

use common::{
    card_tabs, deliver, grid_engine, group, group_engine, numbered_model, selected_indices,
    show_grid,
};
use proptest::prelude::*;
use std::collections::HashSet;
use tab_grid::card::{Card, CardSequence};
use tab_grid::collection::{
    ClosedFrom, ClosureRequest, InMemoryTabModel, NewTab, TabGroupView, TabMutator,
};
use tab_grid::engine::TabListEngine;

// ── CardSequence ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum SeqOp {
    Insert(usize),
    Remove(usize),
    Move(usize, usize),
}

fn arb_seq_op() -> impl Strategy<Value = SeqOp> {
    prop_oneof![
        3 => (0usize..12).prop_map(SeqOp::Insert),
        1 => (0usize..12).prop_map(SeqOp::Remove),
        1 => (0usize..12, 0usize..12).prop_map(|(from, to)| SeqOp::Move(from, to)),
    ]
}

proptest! {
    #[test]
    fn sequence_index_tracks_every_card(ops in prop::collection::vec(arb_seq_op(), 0..40)) {
        let mut sequence = CardSequence::new();
        let mut next_divider = 0u32;
        for op in ops {
            let len = sequence.len();
            match op {
                SeqOp::Insert(at) => {
                    sequence
                        .insert(at.min(len), Card::divider(next_divider))
                        .expect("in range");
                    next_divider += 1;
                }
                SeqOp::Remove(at) if len > 0 => {
                    sequence.remove_at(at % len).expect("in range");
                }
                SeqOp::Move(from, to) if len > 0 => {
                    sequence.move_card(from % len, to % len).expect("in range");
                }
                _ => {}
            }

            let mut seen = HashSet::new();
            for (index, card) in sequence.iter().enumerate() {
                prop_assert!(seen.insert(card.id()), "duplicate id {}", card.id());
                prop_assert_eq!(sequence.index_of(card.id()), Some(index));
            }
        }
    }
}

// ── Grid engine ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum TabOp {
    Open,
    /// Close the n-th live tab (modulo the live count)
    Close(usize),
    /// Undo the n-th pending closure
    Undo(usize),
    Commit,
    Select(usize),
    Retitle(usize),
    /// Merge the second live tab into the first one's group
    Merge(usize, usize),
    Ungroup(usize),
    /// Move the group holding the n-th live tab to a representative slot
    MoveGroup(usize, usize),
    MoveWithinGroup(usize, usize),
}

fn arb_tab_op() -> impl Strategy<Value = TabOp> {
    prop_oneof![
        2 => Just(TabOp::Open),
        3 => any::<usize>().prop_map(TabOp::Close),
        2 => any::<usize>().prop_map(TabOp::Undo),
        1 => Just(TabOp::Commit),
        2 => any::<usize>().prop_map(TabOp::Select),
        1 => any::<usize>().prop_map(TabOp::Retitle),
    ]
}

fn arb_group_op() -> impl Strategy<Value = TabOp> {
    prop_oneof![
        6 => arb_tab_op(),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| TabOp::Merge(a, b)),
        1 => any::<usize>().prop_map(TabOp::Ungroup),
        1 => (any::<usize>(), 0usize..6).prop_map(|(n, to)| TabOp::MoveGroup(n, to)),
        1 => (any::<usize>(), 0usize..8).prop_map(|(n, to)| TabOp::MoveWithinGroup(n, to)),
    ]
}

fn apply(model: &mut InMemoryTabModel, op: TabOp, step: usize) {
    let live = model.tab_ids();
    let nth = |n: usize| live[n % live.len()];
    match op {
        TabOp::Open => {
            model.add_tab(NewTab::new(format!("Opened {step}"), "https://opened.example"));
        }
        TabOp::Undo(n) => {
            let pending = model.pending_closures();
            if !pending.is_empty() {
                model.undo_closure(pending[n % pending.len()]);
            }
        }
        TabOp::Commit => model.commit_closures(),
        _ if live.is_empty() => {}
        TabOp::Close(n) => model.close_tabs(ClosureRequest {
            ids: vec![nth(n)],
            allow_undo: true,
            origin: ClosedFrom::TabSwitcher,
        }),
        TabOp::Select(n) => model.select_tab(nth(n)),
        TabOp::Retitle(n) => model.update_tab_title(nth(n), format!("Renamed {step}")),
        TabOp::Merge(target, source) => model.merge_into_group(nth(target), &[nth(source)]),
        TabOp::Ungroup(n) => model.move_tab_out_of_group(nth(n)),
        TabOp::MoveGroup(n, to) => {
            model.move_group(nth(n), to);
        }
        TabOp::MoveWithinGroup(n, to) => {
            model.move_tab_within_group(nth(n), to);
        }
    }
}

fn assert_cards_consistent(engine: &TabListEngine) -> Result<(), TestCaseError> {
    let ids: HashSet<_> = engine.cards().iter().map(Card::id).collect();
    prop_assert_eq!(ids.len(), engine.cards().len());
    prop_assert!(selected_indices(engine).len() <= 1);
    Ok(())
}

proptest! {
    #[test]
    fn grid_mirrors_ungrouped_tabs(ops in prop::collection::vec(arb_tab_op(), 1..30)) {
        let mut model = numbered_model(3);
        let mut grid = grid_engine();
        show_grid(&mut grid.engine, &model);

        for (step, op) in ops.into_iter().enumerate() {
            apply(&mut model, op, step);
            deliver(&mut grid.engine, &mut model);

            prop_assert_eq!(card_tabs(&grid.engine), model.representatives());
            assert_cards_consistent(&grid.engine)?;
        }
    }

    #[test]
    fn grid_cards_stay_consistent_across_group_edits(
        ops in prop::collection::vec(arb_group_op(), 1..40)
    ) {
        let mut model = numbered_model(5);
        group(&mut model, &[1, 2], None);
        let mut grid = grid_engine();
        show_grid(&mut grid.engine, &model);

        for (step, op) in ops.into_iter().enumerate() {
            apply(&mut model, op, step);
            deliver(&mut grid.engine, &mut model);
            assert_cards_consistent(&grid.engine)?;
        }
    }

    #[test]
    fn group_cards_stay_consistent_across_group_edits(
        ops in prop::collection::vec(arb_group_op(), 1..40)
    ) {
        let mut model = numbered_model(5);
        group(&mut model, &[1, 2, 3], None);
        let mut dialog = group_engine();
        let members = model.related_tabs(1);
        dialog.engine.reset(&model, Some(&members), false);

        for (step, op) in ops.into_iter().enumerate() {
            apply(&mut model, op, step);
            deliver(&mut dialog.engine, &mut model);
            assert_cards_consistent(&dialog.engine)?;
        }
    }
}
