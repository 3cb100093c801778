use bookify_core::{BookRecord, CardAction, CardMode, Screen};
use tracing::{debug, info};

use crate::AppContext;
use crate::cards::CardRef;
use crate::views::{FavoritesView, Pane};

/// The control a favorite toggle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOrigin {
    Card(CardRef),
    /// The details view button. Syncs the first mounted card for the book.
    Details,
}

impl AppContext {
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains_key(id)
    }

    /// Flips membership of `book`, persists the whole set, and refreshes every
    /// view that shows it. Returns the new membership.
    pub fn toggle_favorite(
        &mut self,
        book: &BookRecord,
        origin: ToggleOrigin,
    ) -> anyhow::Result<bool> {
        // Persist first so a failed write leaves memory and storage in step.
        let mut updated = self.favorites.clone();
        let adding = if updated.remove(&book.id).is_some() {
            false
        } else {
            updated.insert(book.id.clone(), book.clone());
            true
        };
        self.storage.save_favorites(&updated)?;
        self.favorites = updated;
        info!(
            "{} favorite {} ({} total)",
            if adding { "added" } else { "removed" },
            book.id,
            self.favorites.len()
        );

        let origin_card = match origin {
            ToggleOrigin::Card(at) => Some(at),
            ToggleOrigin::Details => self.first_mounted_card(&book.id),
        };
        if let Some(card) = origin_card.and_then(|at| self.card_mut(at))
            && card.mode == CardMode::Browsable
        {
            card.favorited = adding;
        }

        if self.active == Screen::Details
            && let Some(details) = self.details.as_mut()
            && details.book.id == book.id
        {
            details.favorited = adding;
        }

        if self.active == Screen::Favorites {
            self.render_favorites();
        }

        Ok(adding)
    }

    /// Removes `id` if present. Absent ids leave storage untouched, but mounted
    /// controls and the favorites view are refreshed either way.
    pub fn remove_favorite(&mut self, id: &str) -> anyhow::Result<()> {
        if self.favorites.contains_key(id) {
            let mut updated = self.favorites.clone();
            updated.remove(id);
            self.storage.save_favorites(&updated)?;
            self.favorites = updated;
            info!("removed favorite {id} ({} total)", self.favorites.len());
        } else {
            debug!("remove_favorite: {id} not present");
        }

        for card in self.browsable_cards_mut() {
            if card.book.id == id {
                card.favorited = false;
            }
        }

        self.render_favorites();
        Ok(())
    }

    pub fn render_favorites(&mut self) {
        let selected = self.favorites_view.selected;
        self.favorites_view = FavoritesView::render(&self.favorites);
        self.favorites_view.selected =
            selected.min(self.favorites_view.cards.len().saturating_sub(1));
    }

    /// The favorite button on the details view.
    pub fn toggle_details_favorite(&mut self) -> anyhow::Result<Option<bool>> {
        let Some(book) = self.selected.clone() else {
            return Ok(None);
        };
        let favorited = self.toggle_favorite(&book, ToggleOrigin::Details)?;
        self.show_book_details(book);
        Ok(Some(favorited))
    }

    /// Runs a card action. Actions the card does not offer are ignored.
    pub fn activate_card(&mut self, at: CardRef, action: CardAction) -> anyhow::Result<()> {
        let Some(card) = self.card(at) else {
            return Ok(());
        };
        if !card.supports(action) {
            debug!("{action:?} not offered by card {at:?}");
            return Ok(());
        }
        let book = card.book.clone();

        match action {
            CardAction::Details => self.show_book_details(book),
            CardAction::ToggleFavorite => {
                self.toggle_favorite(&book, ToggleOrigin::Card(at))?;
            }
            CardAction::Remove => self.remove_favorite(&book.id)?,
        }
        Ok(())
    }

    fn first_mounted_card(&self, id: &str) -> Option<CardRef> {
        [Pane::Home, Pane::Search].into_iter().find_map(|pane| {
            self.pane(pane)
                .cards()
                .iter()
                .position(|card| card.mode == CardMode::Browsable && card.book.id == id)
                .map(|index| CardRef::new(pane.card_pane(), index))
        })
    }
}
