//! Card content tests: images, message cards, text bindings, selectable mode.

mod common;

use common::{
    card_tabs, deliver, grid_engine, group, model_with_tabs, numbered_model, show_grid,
    test_engine,
};
use tab_grid::card::{CardAction, CardId, ImageState, MessageKind};
use tab_grid::collection::{NewTab, TabMutator};
use tab_grid::delegates::{SelectionDelegate, UserIntent};
use tab_grid::engine::{ActionState, ListScope};
use tab_grid::fetch::{FaviconSource, FetchOutcome, FetchRequest};
use tab_grid_config::{CardSize, Config, ListMode};

// ============================================================================
// Thumbnails and favicons
// ============================================================================

#[test]
fn test_stale_thumbnail_result_is_dropped() {
    let mut model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    t.fetches.take_pending();

    let first = t
        .engine
        .cards()
        .get(0)
        .and_then(|card| card.thumbnail_fetcher())
        .cloned()
        .expect("thumbnail fetcher installed");

    // Selecting forces a fresh capture, replacing the descriptor
    model.select_tab(1);
    deliver(&mut t.engine, &mut model);
    let second = t
        .engine
        .cards()
        .get(0)
        .and_then(|card| card.thumbnail_fetcher())
        .cloned()
        .expect("new thumbnail fetcher");
    assert!(second.generation > first.generation);
    assert!(second.force_update);

    assert!(!t.engine.complete_thumbnail(&first, FetchOutcome::Image(7)));
    assert_eq!(t.engine.cards().get(0).and_then(|c| c.thumbnail()), None);

    assert!(t.engine.complete_thumbnail(&second, FetchOutcome::Image(8)));
    assert_eq!(
        t.engine.cards().get(0).and_then(|c| c.thumbnail()),
        Some(&ImageState::Ready(8))
    );
}

#[test]
fn test_failed_fetch_shows_placeholder() {
    let model = numbered_model(1);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let mut applied = 0;
    for request in t.fetches.take_pending() {
        let used = match request {
            FetchRequest::Thumbnail(fetcher) => t
                .engine
                .complete_thumbnail(&fetcher, FetchOutcome::Failed("gpu lost".into())),
            FetchRequest::Favicon(fetcher) => {
                t.engine.complete_favicon(&fetcher, FetchOutcome::Empty)
            }
        };
        applied += usize::from(used);
    }
    assert_eq!(applied, 2);
    let card = t.engine.cards().get(0).expect("card");
    assert_eq!(card.thumbnail(), Some(&ImageState::Placeholder));
    assert_eq!(card.favicon(), Some(&ImageState::Placeholder));
}

#[test]
fn test_result_for_removed_card_is_dropped() {
    let mut model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    let fetcher = t
        .engine
        .cards()
        .get(1)
        .and_then(|card| card.thumbnail_fetcher())
        .cloned()
        .expect("fetcher");

    t.engine.on_close_clicked(&mut model, 2);
    deliver(&mut t.engine, &mut model);
    assert!(!t.engine.complete_thumbnail(&fetcher, FetchOutcome::Image(1)));
}

#[test]
fn test_group_favicon_uses_member_urls() {
    let mut model = numbered_model(6);
    group(&mut model, &[1, 2, 3, 4, 5], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let fetcher = t
        .engine
        .cards()
        .get(0)
        .and_then(|card| card.favicon_fetcher())
        .expect("favicon fetcher");
    let FaviconSource::Group { urls } = &fetcher.source else {
        panic!("group card should compose its favicon, got {:?}", fetcher.source);
    };
    assert_eq!(urls.len(), 4);
    assert_eq!(urls[0], "https://site1.example/page");

    let single = t
        .engine
        .cards()
        .get(1)
        .and_then(|card| card.favicon_fetcher())
        .expect("favicon fetcher");
    assert_eq!(
        single.source,
        FaviconSource::Page {
            url: "https://site6.example/page".into()
        }
    );
}

#[test]
fn test_list_mode_without_thumbnails_requests_favicons_only() {
    let config = Config::default().with_list_mode(ListMode::List);
    let model = numbered_model(2);
    let mut t = test_engine(ListScope::Representatives, &config);
    show_grid(&mut t.engine, &model);

    let pending = t.fetches.take_pending();
    assert_eq!(pending.len(), 2);
    assert!(
        pending
            .iter()
            .all(|request| matches!(request, FetchRequest::Favicon(_)))
    );
    assert!(
        t.engine
            .cards()
            .iter()
            .all(|card| card.thumbnail_fetcher().is_none())
    );
}

#[test]
fn test_soft_cleanup_releases_images_but_keeps_cards() {
    let model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    t.engine.soft_cleanup();
    assert_eq!(card_tabs(&t.engine), vec![1, 2]);
    for card in t.engine.cards().iter() {
        assert!(card.thumbnail_fetcher().is_none());
        assert!(card.favicon_fetcher().is_none());
        assert_eq!(card.title().map(str::is_empty), Some(false));
    }
}

// ============================================================================
// Text bindings
// ============================================================================

#[test]
fn test_tab_text_and_fallbacks() {
    let mut model = model_with_tabs(&[
        ("Docs", "https://www.docs.rs/tab-grid"),
        ("", "https://crates.io/crates"),
        ("", ""),
    ]);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let cards = t.engine.cards();
    let first = cards.get(0).expect("card");
    assert_eq!(first.title(), Some("Docs"));
    assert_eq!(first.url_domain(), Some("docs.rs"));
    assert_eq!(first.content_description(), Some("Tab: Docs"));
    assert_eq!(first.close_button_description(), Some("Close Docs tab"));
    assert_eq!(cards.get(1).and_then(|c| c.title()), Some("crates.io"));
    assert_eq!(cards.get(2).and_then(|c| c.title()), Some("New tab"));

    model.update_tab_title(3, "Settled");
    deliver(&mut t.engine, &mut model);
    assert_eq!(t.engine.cards().get(2).and_then(|c| c.title()), Some("Settled"));
}

#[test]
fn test_url_change_refreshes_domain_and_favicon() {
    let mut model = numbered_model(1);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    let before = t
        .engine
        .cards()
        .get(0)
        .and_then(|c| c.favicon_fetcher())
        .cloned()
        .expect("favicon");

    model.update_tab_url(1, "https://moved.example/new");
    deliver(&mut t.engine, &mut model);
    let card = t.engine.cards().get(0).expect("card");
    assert_eq!(card.url_domain(), Some("moved.example"));
    let after = card.favicon_fetcher().expect("favicon");
    assert!(after.generation > before.generation);
    assert_eq!(
        after.source,
        FaviconSource::Page {
            url: "https://moved.example/new".into()
        }
    );
}

#[test]
fn test_card_size_applies_to_tab_cards() {
    let model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);
    t.engine
        .add_message_card(MessageKind::Iph, None, "Try groups", 1)
        .expect("message added");

    let size = CardSize {
        width: 120,
        height: 90,
    };
    t.engine.set_card_size(size);
    for card in t.engine.cards().iter() {
        if card.is_tab_like() {
            assert_eq!(card.card_size(), Some(size));
        } else {
            assert_eq!(card.card_size(), None);
        }
    }
}

// ============================================================================
// Message cards
// ============================================================================

#[test]
fn test_message_card_keeps_its_slot_as_tabs_arrive() {
    let mut model = numbered_model(3);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let index = t
        .engine
        .add_message_card(MessageKind::Announcement, Some(1), "Welcome", 1)
        .expect("message added");
    assert_eq!(index, 1);

    let added = model.add_tab(NewTab::new("Fourth", "https://four.example"));
    deliver(&mut t.engine, &mut model);

    let ids: Vec<CardId> = t.engine.cards().iter().map(|card| card.id()).collect();
    assert_eq!(
        ids,
        vec![
            CardId::Tab(1),
            CardId::Message {
                kind: MessageKind::Announcement,
                secondary: Some(1)
            },
            CardId::Tab(2),
            CardId::Tab(3),
            CardId::Tab(added),
        ]
    );
    assert_eq!(card_tabs(&t.engine), vec![1, 2, 3, added]);
}

#[test]
fn test_duplicate_message_is_rejected_and_removal_matches_kind() {
    let model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    t.engine
        .add_message_card(MessageKind::Iph, Some(1), "one", 0)
        .expect("first");
    assert!(
        t.engine
            .add_message_card(MessageKind::Iph, Some(1), "again", 2)
            .is_err()
    );
    t.engine
        .add_message_card(MessageKind::Iph, Some(2), "two", 99)
        .expect("clamped to the end");
    t.engine
        .add_message_card(MessageKind::ArchivedTabs, None, "archived", 0)
        .expect("other kind");

    assert_eq!(t.engine.remove_message_cards(MessageKind::Iph, None), 2);
    assert_eq!(t.engine.cards().len(), 3);
    assert_eq!(t.engine.remove_message_cards(MessageKind::ArchivedTabs, None), 1);
    assert_eq!(card_tabs(&t.engine), vec![1, 2]);
}

#[test]
fn test_dividers_have_unique_ids() {
    let model = numbered_model(2);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    let a = t.engine.add_divider(1).expect("divider");
    let b = t.engine.add_divider(1).expect("divider");
    assert_ne!(a, b);
    assert!(t.engine.remove_divider(a));
    assert!(!t.engine.remove_divider(a));
    assert!(!t.engine.remove_divider(CardId::Tab(1)));
    assert_eq!(t.engine.cards().len(), 3);
}

// ============================================================================
// Actions and selectable mode
// ============================================================================

#[test]
fn test_click_routes_through_delegate() {
    let mut model = numbered_model(3);
    group(&mut model, &[2, 3], None);
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    t.engine.on_card_clicked(&mut model, 1);
    t.engine.on_card_clicked(&mut model, 2);
    t.engine.on_long_press(1);
    assert_eq!(
        t.intents.take(),
        vec![
            UserIntent::Navigate(1),
            UserIntent::OpenGroup(2),
            UserIntent::LongPress(1)
        ]
    );
    assert_eq!(tab_grid::collection::TabGroupView::selected_tab(&model), Some(1));
}

#[test]
fn test_selectable_mode_toggles_without_touching_collection() {
    let mut model = numbered_model(3);
    model.select_tab(1);
    model.drain_events();
    let mut t = grid_engine();
    show_grid(&mut t.engine, &model);

    t.engine.set_action_state(&model, ActionState::Selectable);
    assert!(
        t.engine
            .cards()
            .iter()
            .all(|card| card.action() == Some(CardAction::ToggleSelection) && !card.is_selected())
    );

    t.engine.on_card_clicked(&mut model, 2);
    t.engine.on_card_clicked(&mut model, 3);
    t.engine.on_card_clicked(&mut model, 3);
    assert_eq!(t.selection.selected(), vec![2]);
    assert!(t.engine.cards().get(1).is_some_and(|c| c.is_selected()));
    assert!(t.intents.take().is_empty());

    // Collection selection changes do not disturb the selectable list
    model.select_tab(3);
    deliver(&mut t.engine, &mut model);
    assert!(!t.engine.cards().get(2).is_some_and(|c| c.is_selected()));

    t.engine.set_action_state(&model, ActionState::Closable);
    assert_eq!(
        t.engine.cards().get(2).and_then(|c| c.action()),
        Some(CardAction::SelectTab)
    );
    assert!(t.engine.cards().get(2).is_some_and(|c| c.is_selected()));
}
