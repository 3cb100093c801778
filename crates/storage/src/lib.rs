//! Sqlite-backed key-value persistence.

use std::path::Path;

use anyhow::Context as _;
use bookify_core::Favorites;
use rusqlite::{Connection, OptionalExtension as _};
use tracing::warn;

pub const SESSION_KEY: &str = "loggedInToken";
pub const USERNAME_KEY: &str = "currentUsername";
pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug)]
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("open sqlite db at {}", path.as_ref().display()))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    fn migrate(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (unixepoch())
            );
            "#,
            )
            .context("create kv table")?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("read key {key}"))?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?, ?, unixepoch())
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
                (key, value),
            )
            .with_context(|| format!("write key {key}"))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?", [key])
            .with_context(|| format!("delete key {key}"))?;
        Ok(())
    }

    pub fn session_token(&self) -> anyhow::Result<Option<String>> {
        self.get(SESSION_KEY)
    }

    pub fn current_username(&self) -> anyhow::Result<Option<String>> {
        self.get(USERNAME_KEY)
    }

    /// Marker and username are written together or not at all.
    pub fn save_session(&self, token: &str, username: &str) -> anyhow::Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin session write")?;
        self.set(SESSION_KEY, token)?;
        self.set(USERNAME_KEY, username)?;
        tx.commit().context("commit session write")?;
        Ok(())
    }

    pub fn clear_session(&self) -> anyhow::Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin session clear")?;
        self.remove(SESSION_KEY)?;
        self.remove(USERNAME_KEY)?;
        tx.commit().context("commit session clear")?;
        Ok(())
    }

    /// Missing or unreadable favorites load as an empty set.
    pub fn load_favorites(&self) -> anyhow::Result<Favorites> {
        let Some(raw) = self.get(FAVORITES_KEY)? else {
            return Ok(Favorites::new());
        };

        match serde_json::from_str::<Option<Favorites>>(&raw) {
            Ok(favorites) => Ok(favorites.unwrap_or_default()),
            Err(err) => {
                warn!("ignoring unreadable favorites: {err}");
                Ok(Favorites::new())
            }
        }
    }

    pub fn save_favorites(&self, favorites: &Favorites) -> anyhow::Result<()> {
        let json = serde_json::to_string(favorites).context("serialize favorites")?;
        self.set(FAVORITES_KEY, &json)
    }
}
