use bookify_core::{LoginError, Screen};
use thiserror::Error;
use tracing::{info, warn};

use crate::AppContext;
use crate::views::{Pane, SearchTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
    Submit,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Submit,
            LoginField::Submit => LoginField::Username,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginField::Username => LoginField::Submit,
            LoginField::Password => LoginField::Username,
            LoginField::Submit => LoginField::Password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AppContext {
    /// Exact match against the configured pair. On success the session is
    /// persisted and the home fetch is returned for the host to run.
    pub fn attempt_login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<SearchTicket, SessionError> {
        if !self.config.credentials_match(username, password) {
            warn!("rejected login for {username:?}");
            return Err(LoginError::InvalidCredentials.into());
        }

        self.storage
            .save_session(&self.config.session_token, username)?;
        info!("logged in as {username}");
        Ok(self.unlock_shell())
    }

    pub fn submit_login(&mut self) -> Result<SearchTicket, SessionError> {
        let username = self.login_form.username.clone();
        let password = self.login_form.password.clone();
        self.attempt_login(&username, &password)
    }

    /// Clears the session unconditionally. Safe to call when logged out.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.storage.clear_session()?;
        self.logged_in = false;
        self.login_form = Default::default();
        info!("logged out");
        Ok(())
    }

    pub(crate) fn unlock_shell(&mut self) -> SearchTicket {
        self.logged_in = true;
        self.show_screen(Screen::Home);
        let query = self.config.default_query.clone();
        self.begin_fetch(Pane::Home, &query)
    }
}
