//! The externally-owned tab collection as seen by the engine.
//!
//! - `events` - [`TabEvent`] notifications and their context enums
//! - `view`   - [`TabGroupView`] queries, [`TabMutator`] mutations
//! - `memory` - [`InMemoryTabModel`], a complete collection implementing both

mod events;
mod memory;
mod view;

pub use events::{ClosedFrom, ContentChange, LaunchType, SelectionType, TabEvent};
pub use memory::{InMemoryTabModel, NewTab};
pub use view::{ClosureRequest, TabCollection, TabGroupView, TabInfo, TabMutator};
