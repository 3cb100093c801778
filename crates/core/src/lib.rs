//! Core domain types for Bookify.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const NO_DESCRIPTION: &str = "No description available for this book.";
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

pub const RATING_NOT_AVAILABLE: &str = "N/A";
pub const MAX_STARS: u8 = 5;

/// A catalog item normalized for display. Built once from a catalog response
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ratings_count: u64,
}

impl BookRecord {
    pub fn has_cover(&self) -> bool {
        !self.image.is_empty() && self.image != PLACEHOLDER_IMAGE
    }

    /// `"4.5 average (12 votes)"`, or `"N/A average (0 votes)"` without a rating.
    pub fn rating_summary(&self) -> String {
        let rating = match self.rating {
            Some(rating) if rating != 0.0 && rating.is_finite() => rating.to_string(),
            _ => RATING_NOT_AVAILABLE.to_string(),
        };
        format!("{rating} average ({} votes)", self.ratings_count)
    }
}

/// Favorited books keyed by catalog identifier.
pub type Favorites = BTreeMap<String, BookRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Search,
    Favorites,
    Details,
    Profile,
}

impl Screen {
    /// Screens reachable from the bottom navigation bar, in bar order.
    pub const NAV: [Screen; 4] = [
        Screen::Home,
        Screen::Search,
        Screen::Favorites,
        Screen::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Search => "search",
            Screen::Favorites => "favorites",
            Screen::Details => "details",
            Screen::Profile => "profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Search => "Search",
            Screen::Favorites => "Favorites",
            Screen::Details => "Details",
            Screen::Profile => "Profile",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    /// Home and search results: details + favorite toggle.
    Browsable,
    /// Favorites view: details + unconditional remove.
    Removable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Details,
    ToggleFavorite,
    Remove,
}

impl CardMode {
    pub fn actions(&self) -> &'static [CardAction] {
        match self {
            CardMode::Browsable => &[CardAction::Details, CardAction::ToggleFavorite],
            CardMode::Removable => &[CardAction::Details, CardAction::Remove],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingDisplay {
    Stars { full: u8, half: bool, empty: u8 },
    NotAvailable,
}

impl RatingDisplay {
    pub fn from_rating(rating: Option<f64>) -> Self {
        let Some(rating) = rating else {
            return RatingDisplay::NotAvailable;
        };
        if !rating.is_finite() || !(0.0..=f64::from(MAX_STARS)).contains(&rating) {
            return RatingDisplay::NotAvailable;
        }

        let full = rating.floor() as u8;
        let half = rating.fract() >= 0.5;
        let empty = MAX_STARS - full - u8::from(half);
        RatingDisplay::Stars { full, half, empty }
    }

    pub fn glyphs(&self) -> String {
        match self {
            RatingDisplay::Stars { full, half, empty } => {
                let mut out = String::new();
                for _ in 0..*full {
                    out.push('★');
                }
                if *half {
                    out.push('⯪');
                }
                for _ in 0..*empty {
                    out.push('☆');
                }
                out
            }
            RatingDisplay::NotAvailable => RATING_NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Any failure while querying the catalog. The variants only matter for the
/// log; users always see [`FETCH_FAILED_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("catalog returned HTTP {0}")]
    Status(u16),
    #[error("malformed catalog response: {0}")]
    Parse(String),
}

pub const FETCH_FAILED_MESSAGE: &str = "Failed to load data. Check network connection.";
pub const NO_BOOKS_MESSAGE: &str = "No books found for your query.";
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search term.";
pub const NO_FAVORITES_MESSAGE: &str = "You haven't added any favorites yet.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub session_token: String,
    pub catalog_url: String,
    pub max_results: u32,
    pub default_query: String,
    pub avatar_url: String,
    pub avatar_background: String,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: "user123".to_string(),
            password: "1234".to_string(),
            session_token: "bookify_user_session_f7g9h2j4k6l8m0n1".to_string(),
            catalog_url: "https://www.googleapis.com/books/v1/volumes".to_string(),
            max_results: 20,
            default_query: "bestsellers".to_string(),
            avatar_url: "https://api.dicebear.com/9.x/avataaars/svg".to_string(),
            avatar_background: "06b6d4,22c55e".to_string(),
            request_timeout_secs: 15,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn normalize(&mut self) {
        let defaults = Config::default();
        for (value, default) in [
            (&mut self.session_token, defaults.session_token),
            (&mut self.catalog_url, defaults.catalog_url),
            (&mut self.default_query, defaults.default_query),
            (&mut self.avatar_url, defaults.avatar_url),
            (&mut self.avatar_background, defaults.avatar_background),
            (&mut self.log_filter, defaults.log_filter),
        ] {
            let trimmed = value.trim();
            *value = if trimmed.is_empty() {
                default
            } else {
                trimmed.to_string()
            };
        }
        self.max_results = self.max_results.clamp(1, 40);
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
    }

    /// Exact comparison: no trimming, no case folding.
    pub fn credentials_match(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}
