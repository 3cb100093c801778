use std::sync::Arc;

use bookify_catalog::{CatalogSource, PendingFetch, spawn_cover_fetch};
use bookify_core::BookRecord;
use image::DynamicImage;
use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::Protocol as ImageProtocol;
use ratatui_image::{Image as ImageWidget, Resize};
use tracing::{debug, warn};

use crate::image_protocol;

#[derive(Default)]
enum CoverState {
    #[default]
    Empty,
    Missing,
    Loading,
    Decoded {
        image: DynamicImage,
        protocol: Option<ImageProtocol>,
        area: Option<Rect>,
    },
}

/// Cover art for the book on the details view.
#[derive(Default)]
pub(crate) struct CoverPanel {
    book_id: Option<String>,
    pending: Option<PendingFetch<Vec<u8>>>,
    state: CoverState,
}

impl CoverPanel {
    /// Starts fetching the cover of `book` unless it is already shown.
    pub(crate) fn sync(&mut self, book: &BookRecord, catalog: &Arc<dyn CatalogSource>) {
        if self.book_id.as_deref() == Some(book.id.as_str()) {
            return;
        }

        self.book_id = Some(book.id.clone());
        if book.has_cover() {
            debug!("fetching cover for {}", book.id);
            self.pending = Some(spawn_cover_fetch(Arc::clone(catalog), book.image.clone()));
            self.state = CoverState::Loading;
        } else {
            self.pending = None;
            self.state = CoverState::Missing;
        }
    }

    /// Returns true when a fetch finished and the panel changed.
    pub(crate) fn poll(&mut self) -> bool {
        let Some(result) = self.pending.as_ref().and_then(PendingFetch::try_take) else {
            return false;
        };
        self.pending = None;
        let id = self.book_id.as_deref().unwrap_or_default();

        self.state = match result {
            Ok(bytes) => match image::load_from_memory(&bytes) {
                Ok(image) => CoverState::Decoded {
                    image,
                    protocol: None,
                    area: None,
                },
                Err(err) => {
                    warn!("decode cover for {id}: {err}");
                    CoverState::Missing
                }
            },
            Err(err) => {
                warn!("cover fetch for {id} failed: {err}");
                CoverState::Missing
            }
        };
        true
    }

    pub(crate) fn render(&mut self, frame: &mut ratatui::Frame, area: Rect, picker: &Picker) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Cover ({})", image_protocol::protocol_label(picker)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let placeholder = match &mut self.state {
            CoverState::Empty => "",
            CoverState::Missing => "[no cover]",
            CoverState::Loading => "Loading cover...",
            CoverState::Decoded {
                image,
                protocol,
                area: built_for,
            } => {
                if *built_for != Some(inner) {
                    *built_for = Some(inner);
                    *protocol = match picker.new_protocol(image.clone(), inner, Resize::Fit(None)) {
                        Ok(protocol) => Some(protocol),
                        Err(err) => {
                            warn!("build cover protocol: {err}");
                            None
                        }
                    };
                }

                match protocol.as_ref() {
                    Some(protocol) => {
                        let proto_area = protocol.area();
                        let width = proto_area.width.min(inner.width);
                        let height = proto_area.height.min(inner.height);
                        let draw_area = Rect::new(
                            inner.x + inner.width.saturating_sub(width) / 2,
                            inner.y + inner.height.saturating_sub(height) / 2,
                            width,
                            height,
                        );
                        frame.render_widget(ImageWidget::new(protocol), draw_area);
                        return;
                    }
                    None => "[no cover]",
                }
            }
        };

        frame.render_widget(
            Paragraph::new(placeholder).alignment(Alignment::Center),
            inner,
        );
    }
}
