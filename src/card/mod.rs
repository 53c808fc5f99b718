//! Card model: typed rows with sparse property bags, kept in an observable
//! ordered sequence.
//!
//! - `property` - generic key/value bag with change detection
//! - `item`     - [`Card`], its identity and property keys
//! - `sequence` - [`CardSequence`] with index-assisted id lookup and
//!   per-change observer notification

mod item;
mod property;
mod sequence;

pub use item::{
    AnimationStatus, Card, CardAction, CardId, CardKey, CardType, CardValue, ImageState,
    MessageKind,
};
pub use property::PropertyBag;
pub use sequence::{CardSequence, ListChange, ListObserver};
