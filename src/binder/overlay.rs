//! Token-gated binding of a dialog model onto the shared overlay view.

use crate::dialog::{DialogModel, OverlayView};

/// What a bind call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Model has no token or does not own the view; nothing applied
    Skipped,
    /// The view was bound to a different token; every property was reapplied
    Rebound,
    /// Only the changed keys were applied
    Updated(usize),
}

/// Applies [`DialogModel`] properties to an [`OverlayView`].
///
/// Updates are applied only while the model's token owns the view. When the
/// view was last bound under another token, it is wiped and rebound in full so
/// no property of the previous dialog survives.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlayBinder;

impl OverlayBinder {
    pub fn bind(&self, model: &mut DialogModel, view: &mut OverlayView) -> BindOutcome {
        let Some(token) = model.token() else {
            return BindOutcome::Skipped;
        };
        if view.owner() != Some(token) {
            crate::debug_log!("BINDER", "token {} does not own the overlay", token);
            return BindOutcome::Skipped;
        }

        if view.bound_token() != Some(token) {
            view.reset_binding(token);
            for key in model.keys().collect::<Vec<_>>() {
                view.show_value(key, model.get(key));
            }
            model.take_dirty();
            crate::debug_info!("BINDER", "overlay rebound to token {}", token);
            return BindOutcome::Rebound;
        }

        let dirty = model.take_dirty();
        for &key in &dirty {
            view.show_value(key, model.get(key));
        }
        BindOutcome::Updated(dirty.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{BindingToken, DialogKey, DialogValue};

    #[test]
    fn test_token_change_rebinds_from_scratch() {
        let binder = OverlayBinder;
        let mut view = OverlayView::new();

        let first = BindingToken::new();
        let mut group = DialogModel::new();
        group.set_token(Some(first));
        group.set(DialogKey::Title, DialogValue::Text("Work".into()));
        group.set(DialogKey::Color, DialogValue::Color(Default::default()));
        view.acquire(first).unwrap();
        assert_eq!(binder.bind(&mut group, &mut view), BindOutcome::Rebound);
        assert!(view.get(DialogKey::Color).is_some());
        view.release(first);

        let second = BindingToken::new();
        let mut archived = DialogModel::new();
        archived.set_token(Some(second));
        archived.set(DialogKey::Title, DialogValue::Text("2 inactive tabs".into()));
        view.acquire(second).unwrap();
        assert_eq!(binder.bind(&mut archived, &mut view), BindOutcome::Rebound);
        assert_eq!(view.title(), Some("2 inactive tabs"));
        assert!(view.get(DialogKey::Color).is_none(), "stale color leaked");
        assert_eq!(view.rebind_count(), 2);
    }

    #[test]
    fn test_non_owner_cannot_bind() {
        let binder = OverlayBinder;
        let mut view = OverlayView::new();
        let owner = BindingToken::new();
        view.acquire(owner).unwrap();

        let mut stale = DialogModel::new();
        stale.set_token(Some(BindingToken::new()));
        stale.set(DialogKey::Title, DialogValue::Text("old".into()));
        assert_eq!(binder.bind(&mut stale, &mut view), BindOutcome::Skipped);

        let mut untokened = DialogModel::new();
        untokened.set(DialogKey::Title, DialogValue::Text("none".into()));
        assert_eq!(binder.bind(&mut untokened, &mut view), BindOutcome::Skipped);
        assert!(view.title().is_none());
    }

    #[test]
    fn test_same_token_applies_only_changes() {
        let binder = OverlayBinder;
        let mut view = OverlayView::new();
        let token = BindingToken::new();
        view.acquire(token).unwrap();
        let mut model = DialogModel::new();
        model.set_token(Some(token));
        model.set(DialogKey::TabCount, DialogValue::Count(2));
        binder.bind(&mut model, &mut view);

        model.set(DialogKey::TabCount, DialogValue::Count(3));
        assert_eq!(binder.bind(&mut model, &mut view), BindOutcome::Updated(1));
        assert_eq!(view.get(DialogKey::TabCount), Some(&DialogValue::Count(3)));
        assert_eq!(binder.bind(&mut model, &mut view), BindOutcome::Updated(0));
    }
}
