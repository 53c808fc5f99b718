//! Properties of a dialog and the token that gates who may bind them.

use crate::card::PropertyBag;
use std::fmt;
use tab_grid_config::GroupColor;
use uuid::Uuid;

/// Opaque identity of one logical dialog instance.
///
/// A new token is minted every time a dialog starts showing, so a dialog
/// reopened on the same view never shares a token with its previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingToken(Uuid);

impl BindingToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BindingToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BindingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First block is plenty to tell tokens apart in logs
        let text = self.0.simple().to_string();
        write!(f, "{}", &text[..8])
    }
}

/// Dialog-level property keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DialogKey {
    Title,
    TabCount,
    Color,
    /// Overlay is on screen (entering, visible or leaving)
    Visible,
    /// An enter or exit animation is running
    Animating,
    /// Back press and scroll listeners are registered
    ListenersRegistered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogValue {
    Text(String),
    Count(usize),
    Color(GroupColor),
    Flag(bool),
}

impl fmt::Display for DialogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogValue::Text(text) => write!(f, "{text}"),
            DialogValue::Count(count) => write!(f, "{count}"),
            DialogValue::Color(color) => write!(f, "{}", color.display_name()),
            DialogValue::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// Property model of one dialog plus the token it binds under.
#[derive(Debug, Clone, Default)]
pub struct DialogModel {
    token: Option<BindingToken>,
    properties: PropertyBag<DialogKey, DialogValue>,
    /// Keys changed since the last bind
    dirty: Vec<DialogKey>,
}

impl DialogModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<BindingToken> {
        self.token
    }

    /// Start a new binding generation; every property is dropped.
    pub fn set_token(&mut self, token: Option<BindingToken>) {
        self.token = token;
        self.properties = PropertyBag::new();
        self.dirty.clear();
    }

    pub fn get(&self, key: DialogKey) -> Option<&DialogValue> {
        self.properties.get(key)
    }

    pub fn set(&mut self, key: DialogKey, value: DialogValue) {
        if self.properties.set(key, value) && !self.dirty.contains(&key) {
            self.dirty.push(key);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = DialogKey> + '_ {
        self.properties.keys()
    }

    pub(crate) fn take_dirty(&mut self) -> Vec<DialogKey> {
        std::mem::take(&mut self.dirty)
    }

    pub fn title(&self) -> Option<&str> {
        match self.get(DialogKey::Title) {
            Some(DialogValue::Text(title)) => Some(title),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_distinct() {
        assert_ne!(BindingToken::new(), BindingToken::new());
        assert_eq!(BindingToken::new().to_string().len(), 8);
    }

    #[test]
    fn test_dirty_keys_only_track_changes() {
        let mut model = DialogModel::new();
        model.set(DialogKey::Title, DialogValue::Text("Work".into()));
        model.set(DialogKey::Title, DialogValue::Text("Work".into()));
        model.set(DialogKey::TabCount, DialogValue::Count(2));
        assert_eq!(model.take_dirty(), vec![DialogKey::Title, DialogKey::TabCount]);
        assert!(model.take_dirty().is_empty());

        model.set_token(Some(BindingToken::new()));
        assert_eq!(model.keys().count(), 0);
    }
}
