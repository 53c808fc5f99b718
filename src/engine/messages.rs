//! Message and divider cards injected between tab cards.

use super::TabListEngine;
use crate::card::{Card, CardId, MessageKind};
use crate::error::ModelError;

impl TabListEngine {
    /// Insert a message card at `index` (clamped to the end of the list).
    ///
    /// Message cards are not counted when tab cards are positioned, so they
    /// stay where they were put while tabs come and go around them.
    pub fn add_message_card(
        &mut self,
        kind: MessageKind,
        secondary: Option<u64>,
        text: impl Into<String>,
        index: usize,
    ) -> Result<usize, ModelError> {
        let index = index.min(self.cards.len());
        self.cards
            .insert(index, Card::message(kind, secondary, text))?;
        log::debug!("Added {:?} message card at {}", kind, index);
        Ok(index)
    }

    /// Remove message cards of `kind`; `None` matches any secondary id.
    /// Returns how many were removed.
    pub fn remove_message_cards(&mut self, kind: MessageKind, secondary: Option<u64>) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.cards.len() {
            let matches = match self.cards.get(index).map(Card::id) {
                Some(CardId::Message {
                    kind: card_kind,
                    secondary: card_secondary,
                }) => card_kind == kind && (secondary.is_none() || card_secondary == secondary),
                _ => false,
            };
            if matches && self.cards.remove_at(index).is_ok() {
                removed += 1;
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Insert a divider at `index` (clamped) and return its id.
    pub fn add_divider(&mut self, index: usize) -> Result<CardId, ModelError> {
        let n = self.next_divider;
        self.next_divider += 1;
        let index = index.min(self.cards.len());
        self.cards.insert(index, Card::divider(n))?;
        Ok(CardId::Divider(n))
    }

    pub fn remove_divider(&mut self, id: CardId) -> bool {
        match self.cards.index_of(id) {
            Some(index) if matches!(id, CardId::Divider(_)) => self.cards.remove_at(index).is_ok(),
            _ => false,
        }
    }
}
