//! Configuration system for the tab-grid engine.
//!
//! This crate provides configuration loading, saving, and default values
//! for the tab switcher. It also owns the identifier types shared by every
//! other module:
//!
//! - [`TabId`] / [`GroupId`] and the group [`GroupColor`] palette
//! - List presentation types ([`ListMode`], [`CardSize`])
//! - [`LogLevel`] for the debug log bridge

pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use config::{Config, DialogConfig};
pub use error::ConfigError;
pub use types::{CardSize, GroupColor, GroupId, ListMode, LogLevel, TabId};
