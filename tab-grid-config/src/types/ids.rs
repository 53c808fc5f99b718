//! Tab and group identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a tab
pub type TabId = u64;

/// Identifier of a tab group, stable for the group's lifetime.
///
/// A group outlives its members while an undoable closure is pending, so a
/// `GroupId` can refer to a group that currently has no live tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

// ============================================================================
// Group Colors
// ============================================================================

/// Color swatch assigned to a tab group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupColor {
    #[default]
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            GroupColor::Grey => "Grey",
            GroupColor::Blue => "Blue",
            GroupColor::Red => "Red",
            GroupColor::Yellow => "Yellow",
            GroupColor::Green => "Green",
            GroupColor::Pink => "Pink",
            GroupColor::Purple => "Purple",
            GroupColor::Cyan => "Cyan",
            GroupColor::Orange => "Orange",
        }
    }

    /// All available colors for UI iteration
    pub fn all() -> &'static [GroupColor] {
        &[
            GroupColor::Grey,
            GroupColor::Blue,
            GroupColor::Red,
            GroupColor::Yellow,
            GroupColor::Green,
            GroupColor::Pink,
            GroupColor::Purple,
            GroupColor::Cyan,
            GroupColor::Orange,
        ]
    }

    /// Color handed to the n-th group created in a session, cycling the palette.
    pub fn nth(n: usize) -> GroupColor {
        let all = Self::all();
        all[n % all.len()]
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
