//! Model-to-view binding.
//!
//! Binding is one-directional: card and dialog properties flow into rendered
//! rows and the overlay view, never back.

mod list;
mod overlay;

pub use list::{ListRenderer, RenderedRow, RenderedRows, bind_row_property};
pub use overlay::{BindOutcome, OverlayBinder};
