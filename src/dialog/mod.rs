//! Dialog overlays layered over the tab switcher.
//!
//! - [`model`]       - dialog properties and the binding token
//! - [`overlay`]     - the single overlay view shared by every dialog
//! - [`coordinator`] - lifecycle of one dialog and its scoped engine

pub mod coordinator;
pub mod model;
pub mod overlay;

pub use coordinator::{
    DialogCoordinator, DialogKind, DialogScope, DialogState, HiddenCallback, ShowStatus, UiTask,
};
pub use model::{BindingToken, DialogKey, DialogModel, DialogValue};
pub use overlay::OverlayView;
