use bookify_core::{BookRecord, Config, Screen};
use tracing::debug;

use crate::AppContext;
use crate::views::{DetailsView, ProfileView};

impl AppContext {
    /// Activates `screen` and runs its entry action. Ignored while logged out.
    pub fn show_screen(&mut self, screen: Screen) {
        if !self.logged_in {
            debug!("show_screen({screen}) ignored while logged out");
            return;
        }

        self.active = screen;
        match screen {
            Screen::Favorites => self.render_favorites(),
            Screen::Profile => self.setup_profile(),
            Screen::Home | Screen::Search | Screen::Details => {}
        }
        debug!("screen -> {screen}");
    }

    /// No history: back always lands on home.
    pub fn back(&mut self) {
        self.show_screen(Screen::Home);
    }

    pub fn show_book_details(&mut self, book: BookRecord) {
        self.details = Some(DetailsView::render(book.clone(), &self.favorites));
        self.selected = Some(book);
        self.show_screen(Screen::Details);
    }

    fn setup_profile(&mut self) {
        let username = self.display_username();
        self.profile = ProfileView {
            avatar_url: avatar_url(&self.config, &username),
            username,
        };
    }
}

/// Deterministic avatar image for a username.
pub fn avatar_url(config: &Config, username: &str) -> String {
    format!(
        "{}?seed={}&radius=50&backgroundColor={}",
        config.avatar_url,
        urlencoding::encode(username),
        config.avatar_background
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn navigation_is_fully_connected() {
        let mut ctx = logged_in_context();
        for from in Screen::NAV {
            for to in [
                Screen::Home,
                Screen::Search,
                Screen::Favorites,
                Screen::Details,
                Screen::Profile,
            ] {
                ctx.show_screen(from);
                ctx.show_screen(to);
                assert_eq!(ctx.active_screen(), to);
            }
        }
    }

    #[test]
    fn back_always_returns_home() {
        let mut ctx = logged_in_context();
        for screen in [Screen::Search, Screen::Favorites, Screen::Details, Screen::Profile] {
            ctx.show_screen(screen);
            ctx.back();
            assert_eq!(ctx.active_screen(), Screen::Home);
        }
    }

    #[test]
    fn navigation_is_gated_by_login() {
        let mut ctx = context();
        ctx.show_screen(Screen::Favorites);
        assert_eq!(ctx.active_screen(), Screen::Home);
        assert!(!ctx.is_logged_in());
    }

    #[test]
    fn profile_uses_stored_username() {
        let mut ctx = logged_in_context();
        ctx.show_screen(Screen::Profile);
        assert_eq!(ctx.profile().username, "user123");
        assert_eq!(
            ctx.profile().avatar_url,
            "https://api.dicebear.com/9.x/avataaars/svg?seed=user123&radius=50&backgroundColor=06b6d4,22c55e"
        );
    }

    #[test]
    fn profile_falls_back_to_configured_username() -> anyhow::Result<()> {
        let mut ctx = logged_in_context();
        ctx.storage().remove(bookify_storage::USERNAME_KEY)?;
        ctx.show_screen(Screen::Profile);
        assert_eq!(ctx.profile().username, ctx.config.username);
        Ok(())
    }

    #[test]
    fn avatar_url_escapes_username() {
        let url = avatar_url(&Config::default(), "jane doe");
        assert!(url.contains("seed=jane%20doe&"));
    }

    #[test]
    fn details_sets_selection_before_switching() {
        let mut ctx = logged_in_context();
        ctx.show_book_details(book("a"));
        assert_eq!(ctx.active_screen(), Screen::Details);
        assert_eq!(ctx.selected_book().map(|b| b.id.as_str()), Some("a"));
        assert_eq!(ctx.details().map(|d| d.book.id.as_str()), Some("a"));

        ctx.back();
        assert_eq!(ctx.selected_book().map(|b| b.id.as_str()), Some("a"));
    }
}
