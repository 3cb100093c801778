use bookify_core::{
    BookRecord, CardMode, EMPTY_QUERY_MESSAGE, FETCH_FAILED_MESSAGE, FetchError, Favorites,
    NO_BOOKS_MESSAGE, RatingDisplay,
};
use tracing::{debug, info, warn};

use crate::AppContext;
use crate::cards::{Card, CardPane, CardRef};

pub const SEARCH_LABEL: &str = "Search Results";

/// Panes that show catalog results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Home,
    Search,
}

impl Pane {
    pub fn card_pane(&self) -> CardPane {
        match self {
            Pane::Home => CardPane::Home,
            Pane::Search => CardPane::Search,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaneState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Card>),
    NoResults,
    Failed,
    EmptyQuery,
}

impl PaneState {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            PaneState::NoResults => Some(NO_BOOKS_MESSAGE),
            PaneState::Failed => Some(FETCH_FAILED_MESSAGE),
            PaneState::EmptyQuery => Some(EMPTY_QUERY_MESSAGE),
            PaneState::Idle | PaneState::Loading | PaneState::Loaded(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultsPane {
    pub state: PaneState,
    pub selected: usize,
    generation: u64,
}

impl ResultsPane {
    pub fn cards(&self) -> &[Card] {
        match &self.state {
            PaneState::Loaded(cards) => cards.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn cards_mut(&mut self) -> &mut [Card] {
        match &mut self.state {
            PaneState::Loaded(cards) => cards.as_mut_slice(),
            _ => &mut [],
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == PaneState::Loading
    }

    pub fn selected_index(&self) -> Option<usize> {
        clamp_selection(self.selected, self.cards().len())
    }

    pub fn select_next(&mut self) {
        self.selected = step_selection(self.selected, self.cards().len(), 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = step_selection(self.selected, self.cards().len(), -1);
    }
}

#[derive(Debug, Clone)]
pub struct SearchView {
    pub input: String,
    pub label: String,
    pub results: ResultsPane,
}

impl Default for SearchView {
    fn default() -> Self {
        Self {
            input: String::new(),
            label: SEARCH_LABEL.to_string(),
            results: ResultsPane::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FavoritesView {
    pub cards: Vec<Card>,
    pub selected: usize,
}

impl FavoritesView {
    pub fn render(favorites: &Favorites) -> Self {
        let cards = favorites
            .values()
            .cloned()
            .map(|book| Card::render(book, CardMode::Removable, favorites))
            .collect();
        Self { cards, selected: 0 }
    }

    pub fn placeholder_visible(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        clamp_selection(self.selected, self.cards.len())
    }

    pub fn select_next(&mut self) {
        self.selected = step_selection(self.selected, self.cards.len(), 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = step_selection(self.selected, self.cards.len(), -1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsView {
    pub book: BookRecord,
    pub rating: RatingDisplay,
    pub rating_text: String,
    pub favorited: bool,
}

impl DetailsView {
    pub fn render(book: BookRecord, favorites: &Favorites) -> Self {
        Self {
            rating: RatingDisplay::from_rating(book.rating),
            rating_text: book.rating_summary(),
            favorited: favorites.contains_key(&book.id),
            book,
        }
    }

    pub fn favorite_label(&self) -> &'static str {
        if self.favorited {
            "Remove from Favorites ❤"
        } else {
            "Add to Favorites ❤"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileView {
    pub username: String,
    pub avatar_url: String,
}

/// A catalog fetch the host has to run. Hand it back to
/// [`AppContext::finish_fetch`] together with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub pane: Pane,
    pub query: String,
    generation: u64,
}

impl AppContext {
    pub fn pane(&self, pane: Pane) -> &ResultsPane {
        match pane {
            Pane::Home => &self.home,
            Pane::Search => &self.search.results,
        }
    }

    fn pane_mut(&mut self, pane: Pane) -> &mut ResultsPane {
        match pane {
            Pane::Home => &mut self.home,
            Pane::Search => &mut self.search.results,
        }
    }

    /// Clears the pane, shows the loading state, and issues a ticket. Only the
    /// newest ticket per pane may write its result back.
    pub fn begin_fetch(&mut self, pane: Pane, query: &str) -> SearchTicket {
        let target = self.pane_mut(pane);
        target.generation += 1;
        target.state = PaneState::Loading;
        target.selected = 0;
        debug!("fetch {pane:?} #{}: {query}", target.generation);
        SearchTicket {
            pane,
            query: query.to_string(),
            generation: target.generation,
        }
    }

    /// Applies a fetch result to its pane. Returns false when a newer request
    /// for the same pane superseded this one.
    pub fn finish_fetch(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<BookRecord>, FetchError>,
    ) -> bool {
        if self.pane(ticket.pane).generation != ticket.generation {
            debug!(
                "dropping superseded {:?} result for {:?}",
                ticket.pane, ticket.query
            );
            return false;
        }

        let state = match result {
            Ok(books) if books.is_empty() => PaneState::NoResults,
            Ok(books) => {
                info!("{:?}: {} books for {:?}", ticket.pane, books.len(), ticket.query);
                PaneState::Loaded(
                    books
                        .into_iter()
                        .map(|book| Card::render(book, CardMode::Browsable, &self.favorites))
                        .collect(),
                )
            }
            Err(err) => {
                warn!("catalog fetch for {:?} failed: {err}", ticket.query);
                PaneState::Failed
            }
        };

        let target = self.pane_mut(ticket.pane);
        target.state = state;
        target.selected = 0;
        true
    }

    /// Submits the search box. An empty (or blank) query shows a prompt
    /// instead of fetching.
    pub fn submit_search(&mut self) -> Option<SearchTicket> {
        let query = self.search.input.trim().to_string();
        if query.is_empty() {
            self.search.label = SEARCH_LABEL.to_string();
            let results = &mut self.search.results;
            results.generation += 1;
            results.state = PaneState::EmptyQuery;
            results.selected = 0;
            return None;
        }

        self.search.label = format!("Results for: \"{query}\"");
        Some(self.begin_fetch(Pane::Search, &query))
    }

    pub fn card(&self, at: CardRef) -> Option<&Card> {
        match at.pane {
            CardPane::Home => self.home.cards().get(at.index),
            CardPane::Search => self.search.results.cards().get(at.index),
            CardPane::Favorites => self.favorites_view.cards.get(at.index),
        }
    }

    pub(crate) fn card_mut(&mut self, at: CardRef) -> Option<&mut Card> {
        match at.pane {
            CardPane::Home => self.home.cards_mut().get_mut(at.index),
            CardPane::Search => self.search.results.cards_mut().get_mut(at.index),
            CardPane::Favorites => self.favorites_view.cards.get_mut(at.index),
        }
    }

    /// Mounted browsable cards, home first.
    pub(crate) fn browsable_cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.home
            .cards_mut()
            .iter_mut()
            .chain(self.search.results.cards_mut().iter_mut())
    }
}

fn clamp_selection(selected: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(selected.min(len - 1))
    }
}

fn step_selection(selected: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let current = selected.min(len - 1);
    current.saturating_add_signed(delta).min(len - 1)
}
