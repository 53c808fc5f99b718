//! Core `Config` struct definition.
//!
//! - [`persistence`] - load/save (YAML with atomic write) and path helpers

mod persistence;

use crate::error::ConfigError;
use crate::types::{CardSize, ListMode, LogLevel};
use serde::{Deserialize, Serialize};

/// Configuration for the tab switcher and its dialogs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // List Presentation
    // ========================================================================
    /// Layout of the primary tab list
    #[serde(default)]
    pub list_mode: ListMode,

    /// Size applied to every tab and group card
    #[serde(default = "crate::defaults::grid_card_size")]
    pub grid_card_size: CardSize,

    /// Request thumbnails for cards (disabled lists only fetch favicons)
    #[serde(default = "crate::defaults::bool_true")]
    pub thumbnails_enabled: bool,

    // ========================================================================
    // Engine Behavior
    // ========================================================================
    /// Coalesce "tab added" + "tab selected" into one update when a tab is
    /// opened from inside the switcher, replaying the add once it hides
    #[serde(default = "crate::defaults::bool_true")]
    pub delay_add_with_pending_selection: bool,

    /// Require an explicit confirmation before closing the last live tab
    #[serde(default = "crate::defaults::bool_true")]
    pub confirm_close_last_tab: bool,

    /// Closing from a card leaves the tab in a pending, undoable state
    #[serde(default = "crate::defaults::bool_true")]
    pub allow_undo_on_close: bool,

    /// Maximum number of selected cards in selectable mode (0 = unlimited)
    #[serde(default = "crate::defaults::max_selected_tabs")]
    pub max_selected_tabs: usize,

    // ========================================================================
    // Dialogs
    // ========================================================================
    #[serde(default)]
    pub dialog: DialogConfig,

    // ========================================================================
    // Debug Logging
    // ========================================================================
    /// Level for the debug log file
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Dialog overlay timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogConfig {
    /// Duration of the enter animation in milliseconds
    #[serde(default = "crate::defaults::dialog_enter_animation_ms")]
    pub enter_animation_ms: u64,

    /// Duration of the exit animation in milliseconds
    #[serde(default = "crate::defaults::dialog_exit_animation_ms")]
    pub exit_animation_ms: u64,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            enter_animation_ms: crate::defaults::dialog_enter_animation_ms(),
            exit_animation_ms: crate::defaults::dialog_exit_animation_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_mode: ListMode::default(),
            grid_card_size: crate::defaults::grid_card_size(),
            thumbnails_enabled: crate::defaults::bool_true(),
            delay_add_with_pending_selection: crate::defaults::bool_true(),
            confirm_close_last_tab: crate::defaults::bool_true(),
            allow_undo_on_close: crate::defaults::bool_true(),
            max_selected_tabs: crate::defaults::max_selected_tabs(),
            dialog: DialogConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the list mode and reset the card size to that mode's default
    pub fn with_list_mode(mut self, mode: ListMode) -> Self {
        self.list_mode = mode;
        self.grid_card_size = mode.default_card_size();
        self
    }

    /// Whether cards should carry a thumbnail fetcher
    pub fn wants_thumbnails(&self) -> bool {
        self.thumbnails_enabled && self.list_mode.shows_thumbnails()
    }

    /// Check field values that serde alone cannot reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_card_size.is_empty() {
            return Err(ConfigError::Validation(format!(
                "grid_card_size must be non-zero, got {}x{}",
                self.grid_card_size.width, self.grid_card_size.height
            )));
        }
        Ok(())
    }
}
