//! Google Books catalog client.

use std::time::Duration;

use anyhow::Context as _;
use bookify_core::{
    BookRecord, Config, FetchError, NO_DESCRIPTION, PLACEHOLDER_IMAGE, UNKNOWN_AUTHOR,
};
use serde::Deserialize;
use tracing::{debug, info};

mod worker;

pub use worker::{PendingFetch, spawn_cover_fetch, spawn_search};

/// Anything that can answer a catalog search. The terminal host uses
/// [`HttpCatalog`]; tests plug in canned results.
pub trait CatalogSource: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<BookRecord>, FetchError>;

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::blocking::Client,
    base_url: String,
    max_results: u32,
}

impl HttpCatalog {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("bookify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: config.catalog_url.clone(),
            max_results: config.max_results,
        })
    }

    pub fn request_url(&self, query: &str) -> String {
        search_url(&self.base_url, query, self.max_results)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

impl CatalogSource for HttpCatalog {
    fn search(&self, query: &str) -> Result<Vec<BookRecord>, FetchError> {
        let url = self.request_url(query);
        info!("catalog search: {url}");
        let body = self
            .get(&url)?
            .text()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let books = parse_volumes(&body)?;
        debug!("catalog search returned {} books", books.len());
        Ok(books)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// `<base>?q=<escaped query>&maxResults=<n>`
pub fn search_url(base_url: &str, query: &str, max_results: u32) -> String {
    format!(
        "{base_url}?q={}&maxResults={max_results}",
        urlencoding::encode(query)
    )
}

#[derive(Debug, Deserialize)]
struct VolumesEnvelope {
    #[serde(default)]
    items: Option<Vec<VolumeItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    image_links: Option<ImageLinks>,
    description: Option<String>,
    average_rating: Option<f64>,
    ratings_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    small_thumbnail: Option<String>,
    thumbnail: Option<String>,
}

/// Parses a volumes response. Items without a title are dropped.
pub fn parse_volumes(body: &str) -> Result<Vec<BookRecord>, FetchError> {
    let envelope: VolumesEnvelope =
        serde_json::from_str(body).map_err(|err| FetchError::Parse(err.to_string()))?;

    Ok(envelope
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(format_book)
        .collect())
}

fn format_book(item: VolumeItem) -> Option<BookRecord> {
    let info = item.volume_info?;
    let title = non_empty(info.title)?;

    let author = info
        .authors
        .filter(|authors| !authors.is_empty())
        .map(|authors| authors.join(", "))
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let image = info
        .image_links
        .and_then(|links| non_empty(links.thumbnail).or_else(|| non_empty(links.small_thumbnail)))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
    let description = non_empty(info.description).unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let rating = info.average_rating.filter(|rating| *rating != 0.0);

    Some(BookRecord {
        id: item.id,
        title,
        author,
        image,
        description,
        rating,
        ratings_count: info.ratings_count.unwrap_or(0),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
