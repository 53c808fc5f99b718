//! Configuration types and enums.
//!
//! - `ids`     - tab and group identifiers, group color palette
//! - `list`    - list presentation mode and card size
//! - `logging` - log level for the debug log bridge

pub mod ids;
pub mod list;
pub mod logging;

pub use ids::{GroupColor, GroupId, TabId};
pub use list::{CardSize, ListMode};
pub use logging::LogLevel;
