use bookify_core::{BookRecord, CardAction, CardMode, Favorites, RatingDisplay};

/// A rendered book card: the record, its display mode, and the state of its
/// controls at the time it was rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub book: BookRecord,
    pub mode: CardMode,
    /// Heart state of the toggle control. Always false for removable cards.
    pub favorited: bool,
    pub rating: RatingDisplay,
}

impl Card {
    pub fn render(book: BookRecord, mode: CardMode, favorites: &Favorites) -> Self {
        let favorited = mode == CardMode::Browsable && favorites.contains_key(&book.id);
        let rating = RatingDisplay::from_rating(book.rating);
        Self {
            book,
            mode,
            favorited,
            rating,
        }
    }

    pub fn actions(&self) -> &'static [CardAction] {
        self.mode.actions()
    }

    pub fn supports(&self, action: CardAction) -> bool {
        self.actions().contains(&action)
    }

    pub fn heart(&self) -> &'static str {
        if self.favorited { "♥" } else { "♡" }
    }
}

/// Where a card is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPane {
    Home,
    Search,
    Favorites,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardRef {
    pub pane: CardPane,
    pub index: usize,
}

impl CardRef {
    pub fn new(pane: CardPane, index: usize) -> Self {
        Self { pane, index }
    }
}
