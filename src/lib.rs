// Library exports for the replay binary and integration tests
//
// # Shared State Policy
//
// Everything in tab-grid runs on one thread, driven by collection events and
// user actions. Handles shared between an engine and the code observing it
// (fetch queue, selection set, intent queue, task queue, rendered rows,
// overlay view) are `Rc<RefCell<_>>`; a coordinator holds the overlay view
// through a `Weak` so a torn-down view shows up as "detached" instead of
// being kept alive. The only lock is the `parking_lot::Mutex` around the
// debug log file.

/// Crate version, reported by `tab-grid --version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod binder;
pub mod card;
pub mod cli;
pub mod collection;
pub mod delegates;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod host;
pub mod replay;
pub mod task_queue;

pub use tab_grid_config as config;
