//! Ordered, observable card sequence.

use super::item::{Card, CardId, CardKey, CardType, CardValue};
use crate::error::{ModelError, invariant_violation};
use std::collections::HashMap;
use std::fmt;
use tab_grid_config::TabId;

/// A single mutation of a [`CardSequence`], delivered to observers after it
/// has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange {
    Inserted { index: usize },
    Removed { index: usize, id: CardId },
    Moved { from: usize, to: usize },
    /// One property of one card changed (or was cleared)
    Changed { index: usize, key: CardKey },
    /// The card switched between tab and group presentation
    Retyped { index: usize },
    /// The card at `index` now stands for a different id
    Relabeled { index: usize, previous: CardId },
    Cleared,
}

impl ListChange {
    /// Inserts, removals, moves and clears; everything else is a row refresh.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ListChange::Inserted { .. }
                | ListChange::Removed { .. }
                | ListChange::Moved { .. }
                | ListChange::Cleared
        )
    }
}

/// Receives every change made to a [`CardSequence`].
pub trait ListObserver {
    fn on_list_changed(&mut self, cards: &[Card], change: &ListChange);
}

/// The ordered sequence of cards backing the visible list.
///
/// Lookup by id goes through an index map that is refreshed for the affected
/// range after every structural mutation. A lookup whose map entry disagrees
/// with the card actually stored at that position is an invariant violation.
pub struct CardSequence {
    cards: Vec<Card>,
    positions: HashMap<CardId, usize>,
    observers: Vec<Box<dyn ListObserver>>,
}

impl fmt::Debug for CardSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardSequence")
            .field("cards", &self.cards)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for CardSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSequence {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            positions: HashMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ListObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// Position of the card with `id`.
    pub fn index_of(&self, id: CardId) -> Option<usize> {
        let index = *self.positions.get(&id)?;
        match self.cards.get(index) {
            Some(card) if card.id() == id => Some(index),
            Some(card) => {
                invariant_violation(&ModelError::IndexMismatch {
                    id,
                    index,
                    found: card.id(),
                });
                None
            }
            None => {
                invariant_violation(&ModelError::InvalidPosition {
                    index,
                    len: self.cards.len(),
                });
                None
            }
        }
    }

    /// Position of the tab or group card standing for `tab_id`.
    pub fn index_of_tab(&self, tab_id: TabId) -> Option<usize> {
        self.index_of(CardId::Tab(tab_id))
    }

    // ========================================================================
    // Structural mutation
    // ========================================================================

    pub fn insert(&mut self, index: usize, card: Card) -> Result<(), ModelError> {
        if index > self.cards.len() {
            return Err(ModelError::InvalidPosition {
                index,
                len: self.cards.len(),
            });
        }
        if self.positions.contains_key(&card.id()) {
            return Err(ModelError::DuplicateCard(card.id()));
        }
        self.cards.insert(index, card);
        self.reindex(index, self.cards.len());
        self.notify(ListChange::Inserted { index });
        Ok(())
    }

    pub fn push(&mut self, card: Card) -> Result<(), ModelError> {
        self.insert(self.cards.len(), card)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Card, ModelError> {
        if index >= self.cards.len() {
            return Err(ModelError::InvalidPosition {
                index,
                len: self.cards.len(),
            });
        }
        let card = self.cards.remove(index);
        self.positions.remove(&card.id());
        self.reindex(index, self.cards.len());
        self.notify(ListChange::Removed {
            index,
            id: card.id(),
        });
        Ok(card)
    }

    /// Move the card at `from` so that it ends up at `to`.
    pub fn move_card(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        let len = self.cards.len();
        for index in [from, to] {
            if index >= len {
                return Err(ModelError::InvalidPosition { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let card = self.cards.remove(from);
        self.cards.insert(to, card);
        self.reindex(from.min(to), from.max(to) + 1);
        self.notify(ListChange::Moved { from, to });
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.cards.clear();
        self.positions.clear();
        self.notify(ListChange::Cleared);
    }

    // ========================================================================
    // Row mutation
    // ========================================================================

    /// Set one property, notifying only when the value changed.
    pub fn set_property(&mut self, index: usize, key: CardKey, value: CardValue) -> bool {
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        let changed = card.properties_mut().set(key, value);
        if changed {
            crate::debug_trace!("MODEL", "card {} key {:?} changed", index, key);
            self.notify(ListChange::Changed { index, key });
        }
        changed
    }

    pub fn clear_property(&mut self, index: usize, key: CardKey) -> bool {
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        let changed = card.properties_mut().remove(key);
        if changed {
            self.notify(ListChange::Changed { index, key });
        }
        changed
    }

    pub fn set_card_type(&mut self, index: usize, card_type: CardType) -> bool {
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        let changed = card.set_type(card_type);
        if changed {
            self.notify(ListChange::Retyped { index });
        }
        changed
    }

    /// Relabel the card at `index`. Returns `Ok(false)` when the id is unchanged.
    pub fn set_id(&mut self, index: usize, id: CardId) -> Result<bool, ModelError> {
        let len = self.cards.len();
        let Some(card) = self.cards.get_mut(index) else {
            return Err(ModelError::InvalidPosition { index, len });
        };
        let previous = card.id();
        if previous == id {
            return Ok(false);
        }
        if self.positions.contains_key(&id) {
            return Err(ModelError::DuplicateCard(id));
        }
        card.set_id(id);
        self.positions.remove(&previous);
        self.positions.insert(id, index);
        self.notify(ListChange::Relabeled { index, previous });
        Ok(true)
    }

    // ========================================================================
    // Tab-card positions
    // ========================================================================

    /// Index of the `n`-th tab or group card, counting only those cards.
    ///
    /// When there are `n` or fewer tab cards this is the slot right after the
    /// last one (0 for a list without tab cards), so message and divider
    /// cards never shift where a tab lands.
    pub fn index_of_nth_tab_card(&self, n: usize) -> usize {
        let mut seen = 0;
        let mut after_last = 0;
        for (index, card) in self.cards.iter().enumerate() {
            if card.is_tab_like() {
                if seen == n {
                    return index;
                }
                seen += 1;
                after_last = index + 1;
            }
        }
        after_last
    }

    pub fn tab_card_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_tab_like()).count()
    }

    /// Tab ids of the tab and group cards, in visual order
    pub fn tab_ids(&self) -> Vec<TabId> {
        self.cards.iter().filter_map(Card::tab_id).collect()
    }

    fn reindex(&mut self, start: usize, end: usize) {
        for index in start..end.min(self.cards.len()) {
            self.positions.insert(self.cards[index].id(), index);
        }
    }

    fn notify(&mut self, change: ListChange) {
        for observer in self.observers.iter_mut() {
            observer.on_list_changed(&self.cards, &change);
        }
    }
}
