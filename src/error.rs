//! Typed error types for tab-grid.
//!
//! Stale references (an event naming a tab that has no card) are not errors
//! and never reach these types; handlers treat them as no-ops. What remains:
//! - card sequence misuse (bad positions, duplicate ids)
//! - dialog lifecycle misuse (overlay owned elsewhere, detached view)
//! - replay script failures

use crate::card::CardId;
use tab_grid_config::TabId;
use thiserror::Error;

/// Errors raised by [`CardSequence`](crate::card::CardSequence) mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------
    /// The index is outside the sequence (`len` is the size at the time).
    #[error("position {index} is out of range for a sequence of {len} cards")]
    InvalidPosition { index: usize, len: usize },

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------
    /// Inserting or relabeling would put the same id in two cards.
    #[error("card {0} is already present in the sequence")]
    DuplicateCard(CardId),

    /// The index map and the card at that index disagree.
    #[error("index for card {id} points at {index}, which holds {found}")]
    IndexMismatch {
        id: CardId,
        index: usize,
        found: CardId,
    },
}

/// Errors raised by the dialog coordinators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    /// Another dialog currently owns the shared overlay view.
    #[error("overlay view is owned by another dialog")]
    OverlayBusy,

    /// The shared overlay view has been dropped by its host.
    #[error("overlay view is no longer attached")]
    Detached,

    /// `show` was called with nothing to display.
    #[error("nothing to show: {0}")]
    EmptyScope(String),
}

/// Errors raised while loading or running a replay script.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("scenario references unknown tab {0}")]
    UnknownTab(TabId),

    #[error("scenario references unknown group '{0}'")]
    UnknownGroup(String),

    #[error("step {step} failed: {source}")]
    Dialog {
        step: usize,
        #[source]
        source: DialogError,
    },
}

/// Report a broken internal invariant.
///
/// Panics when debug assertions are enabled; release builds log the error and
/// the caller continues with a no-op.
pub fn invariant_violation(err: &ModelError) {
    if cfg!(debug_assertions) {
        panic!("card sequence invariant violated: {err}");
    }
    log::error!("card sequence invariant violated: {err}");
}
