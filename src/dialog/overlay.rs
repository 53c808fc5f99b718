//! The overlay view shared by the group and archived-tab dialogs.

use super::model::{BindingToken, DialogKey, DialogValue};
use crate::error::DialogError;
use std::collections::BTreeMap;

/// One reusable overlay view.
///
/// At most one dialog owns the view at a time (`acquire` / `release`); the
/// binder records which token the displayed properties came from.
#[derive(Debug, Default)]
pub struct OverlayView {
    owner: Option<BindingToken>,
    bound_token: Option<BindingToken>,
    displayed: BTreeMap<DialogKey, DialogValue>,
    /// Full rebinds performed so far
    rebinds: usize,
}

impl OverlayView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<BindingToken> {
        self.owner
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Claim the view for `token`. Re-acquiring with the current owner is a
    /// no-op.
    pub fn acquire(&mut self, token: BindingToken) -> Result<(), DialogError> {
        match self.owner {
            Some(owner) if owner != token => Err(DialogError::OverlayBusy),
            _ => {
                self.owner = Some(token);
                Ok(())
            }
        }
    }

    /// Give the view up. Returns `false` when `token` was not the owner.
    pub fn release(&mut self, token: BindingToken) -> bool {
        if self.owner != Some(token) {
            return false;
        }
        self.owner = None;
        true
    }

    pub fn bound_token(&self) -> Option<BindingToken> {
        self.bound_token
    }

    pub fn get(&self, key: DialogKey) -> Option<&DialogValue> {
        self.displayed.get(&key)
    }

    pub fn displayed(&self) -> &BTreeMap<DialogKey, DialogValue> {
        &self.displayed
    }

    pub fn rebind_count(&self) -> usize {
        self.rebinds
    }

    pub fn title(&self) -> Option<&str> {
        match self.displayed.get(&DialogKey::Title) {
            Some(DialogValue::Text(title)) => Some(title),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(
            self.displayed.get(&DialogKey::Visible),
            Some(DialogValue::Flag(true))
        )
    }

    // ========================================================================
    // Binder access
    // ========================================================================

    /// Drop everything displayed and start binding under `token`
    pub(crate) fn reset_binding(&mut self, token: BindingToken) {
        self.displayed.clear();
        self.bound_token = Some(token);
        self.rebinds += 1;
    }

    pub(crate) fn show_value(&mut self, key: DialogKey, value: Option<&DialogValue>) {
        match value {
            Some(value) => {
                self.displayed.insert(key, value.clone());
            }
            None => {
                self.displayed.remove(&key);
            }
        }
    }
}
