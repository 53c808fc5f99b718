//! Default values referenced by `#[serde(default = ...)]` attributes.

use crate::types::{CardSize, ListMode};

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_false() -> bool {
    false
}

pub fn bool_true() -> bool {
    true
}

// ── List ───────────────────────────────────────────────────────────────────

pub fn grid_card_size() -> CardSize {
    ListMode::Grid.default_card_size()
}

pub fn max_selected_tabs() -> usize {
    0
}

// ── Dialog animations ──────────────────────────────────────────────────────

pub fn dialog_enter_animation_ms() -> u64 {
    300
}

pub fn dialog_exit_animation_ms() -> u64 {
    250
}
