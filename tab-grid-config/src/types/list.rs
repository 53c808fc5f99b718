//! List presentation types.

use serde::{Deserialize, Serialize};

/// How the tab list is laid out
///
/// The engine's synchronization rules are identical in every mode; the mode
/// only changes default card sizes and which descriptive text is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// Two-column grid of thumbnail cards
    #[default]
    Grid,
    /// Single column of compact rows
    List,
    /// Horizontal favicon strip for the current group
    Strip,
}

impl ListMode {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            ListMode::Grid => "Grid",
            ListMode::List => "List",
            ListMode::Strip => "Strip",
        }
    }

    /// All available modes for UI iteration
    pub fn all() -> &'static [ListMode] {
        &[ListMode::Grid, ListMode::List, ListMode::Strip]
    }

    /// Whether cards in this mode show a thumbnail
    pub fn shows_thumbnails(&self) -> bool {
        matches!(self, ListMode::Grid)
    }

    /// Default card size for this mode
    pub fn default_card_size(&self) -> CardSize {
        match self {
            ListMode::Grid => CardSize::new(180, 240),
            ListMode::List => CardSize::new(360, 72),
            ListMode::Strip => CardSize::new(48, 48),
        }
    }
}

/// Size of a single card in layout units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: u32,
    pub height: u32,
}

impl CardSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for CardSize {
    fn default() -> Self {
        ListMode::Grid.default_card_size()
    }
}
