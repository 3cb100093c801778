//! Test helpers and fixtures.

use std::sync::{Arc, Mutex};

use bookify_application::{AppContext, SearchTicket};
use bookify_catalog::{CatalogSource, parse_volumes, spawn_search};
use bookify_core::{BookRecord, Config, FetchError, PLACEHOLDER_IMAGE};
use bookify_storage::Storage;

#[cfg(test)]
mod scenarios;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

pub fn make_book(id: &str) -> BookRecord {
    BookRecord {
        id: id.to_string(),
        title: format!("Title {id}"),
        author: "Some Author".to_string(),
        image: PLACEHOLDER_IMAGE.to_string(),
        description: "A book.".to_string(),
        rating: Some(3.5),
        ratings_count: 7,
    }
}

pub fn make_config() -> Config {
    Config {
        catalog_url: "https://catalog.test/volumes".to_string(),
        ..Config::default()
    }
}

/// Builds a volumes response body with one item per `(id, title)`. A `None`
/// title leaves the field out.
pub fn volumes_body(items: &[(&str, Option<&str>)]) -> String {
    let items = items
        .iter()
        .map(|(id, title)| {
            let mut info = serde_json::json!({ "authors": ["A. Writer"], "averageRating": 4.5 });
            if let Some(title) = title {
                info["title"] = serde_json::json!(title);
            }
            serde_json::json!({ "id": id, "volumeInfo": info })
        })
        .collect::<Vec<_>>();
    serde_json::json!({ "items": items }).to_string()
}

/// Serves a canned response body for every query and records the queries.
pub struct StubCatalog {
    response: Mutex<Result<String, FetchError>>,
    queries: Mutex<Vec<String>>,
}

impl StubCatalog {
    pub fn new(response: Result<String, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(response),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn serving(body: String) -> Arc<Self> {
        Self::new(Ok(body))
    }

    pub fn failing(err: FetchError) -> Arc<Self> {
        Self::new(Err(err))
    }

    pub fn respond_with(&self, response: Result<String, FetchError>) {
        if let Ok(mut slot) = self.response.lock() {
            *slot = response;
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl CatalogSource for StubCatalog {
    fn search(&self, query: &str) -> Result<Vec<BookRecord>, FetchError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        let response = self
            .response
            .lock()
            .map_err(|_| FetchError::Transport("stub poisoned".to_string()))?
            .clone();
        parse_volumes(&response?)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Transport(format!("no bytes for {url}")))
    }
}

pub fn make_context(storage: Storage) -> anyhow::Result<AppContext> {
    AppContext::new(make_config(), storage)
}

pub fn in_memory_context() -> anyhow::Result<AppContext> {
    make_context(Storage::open_in_memory()?)
}

/// Runs `ticket` on a worker thread, waits, and applies the result.
pub fn run_fetch(
    ctx: &mut AppContext,
    catalog: &Arc<StubCatalog>,
    ticket: &SearchTicket,
) -> bool {
    let source: Arc<dyn CatalogSource> = catalog.clone();
    let result = spawn_search(source, ticket.query.clone()).wait();
    ctx.finish_fetch(ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volumes_body_omits_missing_titles() {
        let books = parse_volumes(&volumes_body(&[("a", Some("Dune")), ("b", None)])).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].author, "A. Writer");
    }

    #[test]
    fn stub_records_queries() {
        let catalog = StubCatalog::serving(volumes_body(&[]));
        assert!(catalog.search("dune").unwrap().is_empty());
        assert_eq!(catalog.queries(), vec!["dune".to_string()]);
    }
}
