//! Rendered rows kept in step with a card sequence.

use crate::card::{Card, CardId, CardKey, CardType, CardValue, ImageState, ListChange, ListObserver};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Rows kept for reuse after removal
const RECYCLE_POOL_SIZE: usize = 8;

/// One on-screen row: the card it shows and the text of each bound key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedRow {
    pub card: Option<CardId>,
    pub card_type: Option<CardType>,
    pub fields: BTreeMap<CardKey, String>,
    /// Times this row was bound to a card from scratch
    pub full_binds: usize,
}

impl RenderedRow {
    pub fn field(&self, key: CardKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct RenderedRows {
    pub rows: Vec<RenderedRow>,
    pool: Vec<RenderedRow>,
    /// Rows taken from the pool instead of created
    pub recycled: usize,
}

impl RenderedRows {
    fn obtain(&mut self) -> RenderedRow {
        match self.pool.pop() {
            Some(row) => {
                self.recycled += 1;
                row
            }
            None => RenderedRow::default(),
        }
    }

    fn recycle(&mut self, row: RenderedRow) {
        if self.pool.len() < RECYCLE_POOL_SIZE {
            self.pool.push(row);
        }
    }

    fn bind_full(row: &mut RenderedRow, card: &Card) {
        row.fields.clear();
        row.card = Some(card.id());
        row.card_type = Some(card.card_type());
        row.full_binds += 1;
        for key in card.property_keys() {
            bind_row_property(row, card, key);
        }
    }

    fn apply(&mut self, cards: &[Card], change: &ListChange) {
        match *change {
            ListChange::Inserted { index } => {
                let Some(card) = cards.get(index) else {
                    return;
                };
                let mut row = self.obtain();
                Self::bind_full(&mut row, card);
                let index = index.min(self.rows.len());
                self.rows.insert(index, row);
            }
            ListChange::Removed { index, .. } => {
                if index < self.rows.len() {
                    let row = self.rows.remove(index);
                    self.recycle(row);
                }
            }
            ListChange::Moved { from, to } => {
                if from < self.rows.len() && to < self.rows.len() {
                    let row = self.rows.remove(from);
                    self.rows.insert(to, row);
                }
            }
            ListChange::Changed { index, key } => {
                if let (Some(row), Some(card)) = (self.rows.get_mut(index), cards.get(index)) {
                    bind_row_property(row, card, key);
                }
            }
            ListChange::Retyped { index } | ListChange::Relabeled { index, .. } => {
                if let (Some(row), Some(card)) = (self.rows.get_mut(index), cards.get(index)) {
                    Self::bind_full(row, card);
                }
            }
            ListChange::Cleared => {
                let rows = std::mem::take(&mut self.rows);
                for row in rows {
                    self.recycle(row);
                }
            }
        }
    }
}

/// Bind one property of `card` onto `row`. A key the card no longer carries
/// is cleared from the row.
pub fn bind_row_property(row: &mut RenderedRow, card: &Card, key: CardKey) {
    match card.get(key) {
        Some(value) => {
            row.fields.insert(key, render_value(value));
        }
        None => {
            row.fields.remove(&key);
        }
    }
}

fn render_value(value: &CardValue) -> String {
    match value {
        CardValue::Text(text) => text.clone(),
        CardValue::Flag(flag) => flag.to_string(),
        CardValue::Color(color) => color.display_name().to_string(),
        CardValue::Count(count) => count.to_string(),
        CardValue::ThumbnailFetcher(fetcher) => format!("fetching#{}", fetcher.generation),
        CardValue::FaviconFetcher(fetcher) => format!("fetching#{}", fetcher.generation),
        CardValue::Image(ImageState::Ready(handle)) => format!("image#{handle}"),
        CardValue::Image(ImageState::Placeholder) => "placeholder".to_string(),
        CardValue::Action(action) => format!("{action:?}"),
        CardValue::Animation(status) => format!("{status:?}"),
        CardValue::Size(size) => format!("{}x{}", size.width, size.height),
    }
}

/// Observer that renders a card sequence into rows.
///
/// Clones share the same rows, so one handle can be registered on the
/// sequence while another is used to read what is on screen.
#[derive(Debug, Clone, Default)]
pub struct ListRenderer {
    rows: Rc<RefCell<RenderedRows>>,
}

impl ListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().rows.is_empty()
    }

    /// Copy of the rendered rows
    pub fn snapshot(&self) -> Vec<RenderedRow> {
        self.rows.borrow().rows.clone()
    }

    pub fn recycled(&self) -> usize {
        self.rows.borrow().recycled
    }
}

impl ListObserver for ListRenderer {
    fn on_list_changed(&mut self, cards: &[Card], change: &ListChange) {
        self.rows.borrow_mut().apply(cards, change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardSequence, MessageKind};

    #[test]
    fn test_rows_follow_sequence() {
        let renderer = ListRenderer::new();
        let mut cards = CardSequence::new();
        cards.add_observer(Box::new(renderer.clone()));

        cards.push(Card::for_tab(1, CardType::Tab)).unwrap();
        cards.push(Card::message(MessageKind::Iph, None, "Try groups")).unwrap();
        cards.push(Card::for_tab(2, CardType::Tab)).unwrap();
        cards
            .set_property(0, CardKey::Title, CardValue::Text("Docs".into()));
        cards.move_card(2, 0).unwrap();

        let rows = renderer.snapshot();
        let ids: Vec<_> = rows.iter().map(|row| row.card).collect();
        assert_eq!(
            ids,
            vec![
                Some(CardId::Tab(2)),
                Some(CardId::Tab(1)),
                Some(CardId::Message {
                    kind: MessageKind::Iph,
                    secondary: None
                })
            ]
        );
        assert_eq!(rows[1].field(CardKey::Title), Some("Docs"));
        assert_eq!(rows[2].field(CardKey::MessageText), Some("Try groups"));
    }

    #[test]
    fn test_removed_rows_are_recycled_clean() {
        let renderer = ListRenderer::new();
        let mut cards = CardSequence::new();
        cards.add_observer(Box::new(renderer.clone()));

        cards.push(Card::for_tab(1, CardType::Tab)).unwrap();
        cards.set_property(0, CardKey::Title, CardValue::Text("Old".into()));
        cards.remove_at(0).unwrap();
        cards.push(Card::for_tab(2, CardType::Tab)).unwrap();

        let rows = renderer.snapshot();
        assert_eq!(renderer.recycled(), 1);
        assert_eq!(rows[0].card, Some(CardId::Tab(2)));
        assert_eq!(rows[0].field(CardKey::Title), None);
    }
}
