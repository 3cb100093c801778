//! Application state and orchestration layer for Bookify.
//!
//! Everything the terminal host shows is derived from one [`AppContext`]. The
//! host mounts the view models exposed here and feeds user actions and fetch
//! completions back in; nothing in this crate touches the terminal.

use bookify_core::{BookRecord, Config, Favorites, Screen};
use bookify_storage::Storage;
use tracing::warn;

mod cards;
mod favorites;
mod router;
mod session;
mod views;

pub use cards::{Card, CardPane, CardRef};
pub use favorites::ToggleOrigin;
pub use router::avatar_url;
pub use session::{LoginField, LoginForm, SessionError};
pub use views::{
    DetailsView, FavoritesView, Pane, PaneState, ProfileView, ResultsPane, SearchTicket,
    SearchView,
};

#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    storage: Storage,
    logged_in: bool,
    pub login_form: LoginForm,
    active: Screen,
    favorites: Favorites,
    selected: Option<BookRecord>,
    pub home: ResultsPane,
    pub search: SearchView,
    pub favorites_view: FavoritesView,
    details: Option<DetailsView>,
    profile: ProfileView,
}

impl AppContext {
    pub fn new(mut config: Config, storage: Storage) -> anyhow::Result<Self> {
        config.normalize();
        let logged_in = storage
            .session_token()?
            .is_some_and(|token| token == config.session_token);
        let favorites = storage.load_favorites()?;

        Ok(Self {
            config,
            storage,
            logged_in,
            login_form: LoginForm::default(),
            active: Screen::Home,
            favorites,
            selected: None,
            home: ResultsPane::default(),
            search: SearchView::default(),
            favorites_view: FavoritesView::default(),
            details: None,
            profile: ProfileView::default(),
        })
    }

    /// Opens the shell straight away when a valid session marker survived from
    /// a previous run. Returns the home fetch to run, if any.
    pub fn start(&mut self) -> Option<SearchTicket> {
        if self.logged_in {
            Some(self.unlock_shell())
        } else {
            None
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn active_screen(&self) -> Screen {
        self.active
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn selected_book(&self) -> Option<&BookRecord> {
        self.selected.as_ref()
    }

    pub fn details(&self) -> Option<&DetailsView> {
        self.details.as_ref()
    }

    pub fn profile(&self) -> &ProfileView {
        &self.profile
    }

    fn display_username(&self) -> String {
        match self.storage.current_username() {
            Ok(Some(name)) if !name.is_empty() => name,
            Ok(_) => self.config.username.clone(),
            Err(err) => {
                warn!("read display username: {err:#}");
                self.config.username.clone()
            }
        }
    }
}
