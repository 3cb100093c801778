use bookify_application::{CardPane, CardRef, Pane, PaneState, SessionError};
use bookify_core::{
    CardAction, CardMode, FETCH_FAILED_MESSAGE, LoginError, NO_BOOKS_MESSAGE, RatingDisplay,
    Screen,
};
use bookify_storage::{FAVORITES_KEY, SESSION_KEY, USERNAME_KEY};

use super::*;

fn logged_in(catalog: &Arc<StubCatalog>) -> anyhow::Result<AppContext> {
    let mut ctx = in_memory_context()?;
    let ticket = ctx.attempt_login("user123", "1234")?;
    run_fetch(&mut ctx, catalog, &ticket);
    Ok(ctx)
}

fn search(ctx: &mut AppContext, catalog: &Arc<StubCatalog>, query: &str) {
    ctx.show_screen(Screen::Search);
    ctx.search.input = query.to_string();
    if let Some(ticket) = ctx.submit_search() {
        assert!(run_fetch(ctx, catalog, &ticket));
    }
}

#[test]
fn title_less_items_are_dropped_from_cards() -> anyhow::Result<()> {
    init_tracing();
    let catalog = StubCatalog::serving(volumes_body(&[("a", Some("Dune")), ("b", None)]));
    let ctx = logged_in(&catalog)?;

    assert_eq!(catalog.queries(), vec!["bestsellers".to_string()]);
    let cards = ctx.home.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].book.id, "a");
    assert_eq!(cards[0].mode, CardMode::Browsable);
    Ok(())
}

#[test]
fn favorite_from_search_then_remove_from_favorites() -> anyhow::Result<()> {
    init_tracing();
    let catalog = StubCatalog::serving(volumes_body(&[("a", Some("Dune")), ("b", Some("Emma"))]));
    let mut ctx = logged_in(&catalog)?;
    search(&mut ctx, &catalog, "classics");

    let search_card = CardRef::new(CardPane::Search, 1);
    ctx.activate_card(search_card, CardAction::ToggleFavorite)?;
    assert!(ctx.card(search_card).is_some_and(|card| card.favorited));

    ctx.show_screen(Screen::Favorites);
    let view = &ctx.favorites_view;
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].book.id, "b");
    assert_eq!(view.cards[0].mode, CardMode::Removable);

    ctx.activate_card(CardRef::new(CardPane::Favorites, 0), CardAction::Remove)?;
    assert!(ctx.favorites_view.placeholder_visible());
    assert!(ctx.card(search_card).is_some_and(|card| !card.favorited));
    assert!(ctx.storage().load_favorites()?.is_empty());
    Ok(())
}

#[test]
fn empty_result_and_failure_show_different_messages() -> anyhow::Result<()> {
    init_tracing();
    let catalog = StubCatalog::serving(r#"{"totalItems": 0}"#.to_string());
    let mut ctx = logged_in(&catalog)?;
    assert_eq!(ctx.home.state, PaneState::NoResults);

    search(&mut ctx, &catalog, "zzzz");
    assert_eq!(ctx.search.results.state.message(), Some(NO_BOOKS_MESSAGE));

    catalog.respond_with(Err(FetchError::Status(503)));
    search(&mut ctx, &catalog, "dune");
    assert_eq!(ctx.search.results.state, PaneState::Failed);
    assert_eq!(ctx.search.results.state.message(), Some(FETCH_FAILED_MESSAGE));

    catalog.respond_with(Ok("<html>".to_string()));
    search(&mut ctx, &catalog, "dune");
    assert_eq!(ctx.search.results.state, PaneState::Failed);
    Ok(())
}

#[test]
fn all_title_less_items_read_as_no_results() -> anyhow::Result<()> {
    let catalog = StubCatalog::serving(volumes_body(&[("a", None), ("b", None)]));
    let mut ctx = logged_in(&catalog)?;
    assert_eq!(ctx.home.state, PaneState::NoResults);

    search(&mut ctx, &catalog, "untitled");
    assert!(ctx.search.results.cards().is_empty());
    assert_eq!(ctx.search.results.state.message(), Some(NO_BOOKS_MESSAGE));
    Ok(())
}

#[test]
fn unreachable_catalog_fails_home_pane() -> anyhow::Result<()> {
    let catalog = StubCatalog::failing(FetchError::Transport("connection refused".to_string()));
    let ctx = logged_in(&catalog)?;
    assert_eq!(ctx.home.state, PaneState::Failed);
    assert_eq!(ctx.home.state.message(), Some(FETCH_FAILED_MESSAGE));
    assert!(ctx.home.cards().is_empty());
    assert_eq!(catalog.queries(), vec!["bestsellers".to_string()]);
    Ok(())
}

#[test]
fn newest_search_wins() -> anyhow::Result<()> {
    let catalog = StubCatalog::serving(volumes_body(&[("old", Some("Old"))]));
    let mut ctx = logged_in(&catalog)?;

    ctx.search.input = "first".to_string();
    let first = ctx.submit_search().expect("first ticket");
    ctx.search.input = "second".to_string();
    let second = ctx.submit_search().expect("second ticket");

    catalog.respond_with(Ok(volumes_body(&[("new", Some("New"))])));
    assert!(run_fetch(&mut ctx, &catalog, &second));
    catalog.respond_with(Ok(volumes_body(&[("old", Some("Old"))])));
    assert!(!run_fetch(&mut ctx, &catalog, &first));

    assert_eq!(ctx.search.results.cards()[0].book.id, "new");
    assert_eq!(ctx.search.label, "Results for: \"second\"");
    Ok(())
}

#[test]
fn wrong_credentials_leave_session_untouched() -> anyhow::Result<()> {
    let mut ctx = in_memory_context()?;
    let err = ctx.attempt_login("user123", "123").unwrap_err();
    assert!(matches!(err, SessionError::Login(LoginError::InvalidCredentials)));
    assert_eq!(err.to_string(), "Invalid username or password");
    assert_eq!(ctx.storage().get(SESSION_KEY)?, None);
    assert_eq!(ctx.storage().get(USERNAME_KEY)?, None);
    assert!(!ctx.is_logged_in());
    Ok(())
}

#[test]
fn session_and_favorites_survive_restart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("bookify.db");

    {
        let mut ctx = make_context(Storage::open(&db)?)?;
        ctx.attempt_login("user123", "1234")?;
        ctx.toggle_favorite(&make_book("a"), bookify_application::ToggleOrigin::Details)?;
    }

    let mut ctx = make_context(Storage::open(&db)?)?;
    assert!(ctx.is_logged_in());
    assert!(ctx.is_favorite("a"));
    let ticket = ctx.start().expect("home fetch on resume");
    assert_eq!(ticket.pane, Pane::Home);

    ctx.show_screen(Screen::Profile);
    assert_eq!(ctx.profile().username, "user123");

    ctx.logout()?;
    ctx.logout()?;
    let ctx = make_context(Storage::open(&db)?)?;
    assert!(!ctx.is_logged_in());
    assert!(ctx.is_favorite("a"));
    Ok(())
}

#[test]
fn toggling_twice_restores_persisted_bytes() -> anyhow::Result<()> {
    let catalog = StubCatalog::serving(volumes_body(&[("a", Some("Dune"))]));
    let mut ctx = logged_in(&catalog)?;
    ctx.toggle_favorite(&make_book("z"), bookify_application::ToggleOrigin::Details)?;
    let before = ctx.storage().get(FAVORITES_KEY)?;

    let home_card = CardRef::new(CardPane::Home, 0);
    ctx.activate_card(home_card, CardAction::ToggleFavorite)?;
    ctx.activate_card(home_card, CardAction::ToggleFavorite)?;

    assert_eq!(ctx.storage().get(FAVORITES_KEY)?, before);
    Ok(())
}

#[test]
fn details_toggle_from_search_result() -> anyhow::Result<()> {
    let catalog = StubCatalog::serving(volumes_body(&[("a", Some("Dune"))]));
    let mut ctx = logged_in(&catalog)?;
    ctx.activate_card(CardRef::new(CardPane::Home, 0), CardAction::Details)?;
    assert_eq!(ctx.active_screen(), Screen::Details);

    let details = ctx.details().expect("details view");
    assert_eq!(details.rating, RatingDisplay::Stars { full: 4, half: true, empty: 0 });
    assert_eq!(details.rating_text, "4.5 average (0 votes)");

    assert_eq!(ctx.toggle_details_favorite()?, Some(true));
    assert!(ctx.card(CardRef::new(CardPane::Home, 0)).is_some_and(|card| card.favorited));
    Ok(())
}

#[test]
fn star_counts_always_total_five() {
    for tenth in 0..=50 {
        let rating = f64::from(tenth) / 10.0;
        match RatingDisplay::from_rating(Some(rating)) {
            RatingDisplay::Stars { full, half, empty } => {
                assert_eq!(full + u8::from(half) + empty, 5, "rating {rating}");
                assert_eq!(u32::from(full), rating.floor() as u32);
            }
            RatingDisplay::NotAvailable => panic!("rating {rating} should render stars"),
        }
    }
    for bad in [-0.5, 5.5, f64::NAN, f64::INFINITY] {
        assert_eq!(RatingDisplay::from_rating(Some(bad)).glyphs(), "N/A");
    }
}
