//! A single row of the tab list.

use super::property::PropertyBag;
use crate::fetch::{FaviconFetcher, ThumbnailFetcher};
use std::fmt;
use tab_grid_config::{CardSize, GroupColor, TabId};

/// Kind of row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    /// A single tab
    Tab,
    /// A collapsed tab group, labeled by its representative tab
    TabGroup,
    /// An injected message (promo, notice, in-product help)
    Message,
    /// A visual separator
    Divider,
}

impl CardType {
    /// Tab and group cards both stand for tabs and share positional counting.
    pub fn is_tab_like(self) -> bool {
        matches!(self, CardType::Tab | CardType::TabGroup)
    }
}

/// Message card categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    /// "N inactive tabs archived" notice
    ArchivedTabs,
    /// In-product help
    Iph,
    /// Generic announcement
    Announcement,
    /// Host-defined kind
    Custom(u16),
}

/// Stable identity of a card.
///
/// Tab and group cards share the `Tab` variant: a group card is identified by
/// its representative tab, so the card keeps its identity while switching
/// between the two card types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardId {
    Tab(TabId),
    Message {
        kind: MessageKind,
        secondary: Option<u64>,
    },
    Divider(u32),
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardId::Tab(id) => write!(f, "tab:{id}"),
            CardId::Message {
                kind,
                secondary: Some(secondary),
            } => write!(f, "message:{kind:?}/{secondary}"),
            CardId::Message {
                kind,
                secondary: None,
            } => write!(f, "message:{kind:?}"),
            CardId::Divider(n) => write!(f, "divider:{n}"),
        }
    }
}

/// Where a tap on the card is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    /// Select the tab and leave the switcher
    SelectTab,
    /// Open the group dialog for the group the card stands for
    OpenGroup,
    /// Toggle membership in the external selection set
    ToggleSelection,
}

/// Card animation hint read by the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    CardRestore,
    SelectedCardZoomIn,
    SelectedCardZoomOut,
    HoveredCardZoomIn,
    HoveredCardZoomOut,
}

/// State of an image slot filled by an asynchronous fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    /// Provider returned an image; the handle is opaque to the engine
    Ready(u64),
    /// Fetch failed or returned nothing
    Placeholder,
}

/// Property keys understood by the row binder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardKey {
    Title,
    UrlDomain,
    IsSelected,
    GroupColor,
    TabCount,
    ThumbnailFetcher,
    Thumbnail,
    FaviconFetcher,
    Favicon,
    ContentDescription,
    CloseButtonDescription,
    ActionButtonDescription,
    Action,
    AnimationStatus,
    CardSize,
    MessageText,
}

/// Property values; each key is paired with exactly one variant
#[derive(Debug, Clone, PartialEq)]
pub enum CardValue {
    Text(String),
    Flag(bool),
    Color(GroupColor),
    Count(usize),
    ThumbnailFetcher(ThumbnailFetcher),
    FaviconFetcher(FaviconFetcher),
    Image(ImageState),
    Action(CardAction),
    Animation(AnimationStatus),
    Size(CardSize),
}

/// One row in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    card_type: CardType,
    id: CardId,
    properties: PropertyBag<CardKey, CardValue>,
}

impl Card {
    /// New tab or group card with no properties
    pub fn for_tab(tab_id: TabId, card_type: CardType) -> Self {
        Self {
            card_type,
            id: CardId::Tab(tab_id),
            properties: PropertyBag::new(),
        }
    }

    pub fn message(kind: MessageKind, secondary: Option<u64>, text: impl Into<String>) -> Self {
        let mut properties = PropertyBag::new();
        properties.set(CardKey::MessageText, CardValue::Text(text.into()));
        Self {
            card_type: CardType::Message,
            id: CardId::Message { kind, secondary },
            properties,
        }
    }

    pub fn divider(n: u32) -> Self {
        Self {
            card_type: CardType::Divider,
            id: CardId::Divider(n),
            properties: PropertyBag::new(),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    /// The tab this card stands for, if it is a tab or group card
    pub fn tab_id(&self) -> Option<TabId> {
        match self.id {
            CardId::Tab(id) if self.card_type.is_tab_like() => Some(id),
            _ => None,
        }
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn is_tab_like(&self) -> bool {
        self.card_type.is_tab_like()
    }

    pub fn get(&self, key: CardKey) -> Option<&CardValue> {
        self.properties.get(key)
    }

    pub fn property_keys(&self) -> impl Iterator<Item = CardKey> + '_ {
        self.properties.keys()
    }

    pub(super) fn set_type(&mut self, card_type: CardType) -> bool {
        let changed = self.card_type != card_type;
        self.card_type = card_type;
        changed
    }

    pub(super) fn set_id(&mut self, id: CardId) {
        self.id = id;
    }

    pub(super) fn properties_mut(&mut self) -> &mut PropertyBag<CardKey, CardValue> {
        &mut self.properties
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    fn text(&self, key: CardKey) -> Option<&str> {
        match self.get(key) {
            Some(CardValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.text(CardKey::Title)
    }

    pub fn url_domain(&self) -> Option<&str> {
        self.text(CardKey::UrlDomain)
    }

    pub fn content_description(&self) -> Option<&str> {
        self.text(CardKey::ContentDescription)
    }

    pub fn close_button_description(&self) -> Option<&str> {
        self.text(CardKey::CloseButtonDescription)
    }

    pub fn message_text(&self) -> Option<&str> {
        self.text(CardKey::MessageText)
    }

    pub fn is_selected(&self) -> bool {
        matches!(self.get(CardKey::IsSelected), Some(CardValue::Flag(true)))
    }

    pub fn group_color(&self) -> Option<GroupColor> {
        match self.get(CardKey::GroupColor) {
            Some(CardValue::Color(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn tab_count(&self) -> Option<usize> {
        match self.get(CardKey::TabCount) {
            Some(CardValue::Count(count)) => Some(*count),
            _ => None,
        }
    }

    pub fn thumbnail_fetcher(&self) -> Option<&ThumbnailFetcher> {
        match self.get(CardKey::ThumbnailFetcher) {
            Some(CardValue::ThumbnailFetcher(fetcher)) => Some(fetcher),
            _ => None,
        }
    }

    pub fn favicon_fetcher(&self) -> Option<&FaviconFetcher> {
        match self.get(CardKey::FaviconFetcher) {
            Some(CardValue::FaviconFetcher(fetcher)) => Some(fetcher),
            _ => None,
        }
    }

    pub fn thumbnail(&self) -> Option<&ImageState> {
        match self.get(CardKey::Thumbnail) {
            Some(CardValue::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn favicon(&self) -> Option<&ImageState> {
        match self.get(CardKey::Favicon) {
            Some(CardValue::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn action(&self) -> Option<CardAction> {
        match self.get(CardKey::Action) {
            Some(CardValue::Action(action)) => Some(*action),
            _ => None,
        }
    }

    pub fn animation_status(&self) -> Option<AnimationStatus> {
        match self.get(CardKey::AnimationStatus) {
            Some(CardValue::Animation(status)) => Some(*status),
            _ => None,
        }
    }

    pub fn card_size(&self) -> Option<CardSize> {
        match self.get(CardKey::CardSize) {
            Some(CardValue::Size(size)) => Some(*size),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_only_for_tab_like_cards() {
        assert_eq!(Card::for_tab(7, CardType::TabGroup).tab_id(), Some(7));
        assert_eq!(
            Card::message(MessageKind::Iph, None, "hint").tab_id(),
            None
        );
        assert_eq!(Card::divider(0).tab_id(), None);
    }

    #[test]
    fn test_card_id_display() {
        assert_eq!(CardId::Tab(3).to_string(), "tab:3");
        let id = CardId::Message {
            kind: MessageKind::Custom(4),
            secondary: Some(9),
        };
        assert_eq!(id.to_string(), "message:Custom(4)/9");
    }
}
