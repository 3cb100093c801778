use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use bookify_application::AppContext;
use bookify_catalog::HttpCatalog;
use bookify_core::Config;
use bookify_storage::Storage;
use bookify_ui::Ui;
use directories::ProjectDirs;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BOOKIFY_LOG";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "bookify", "bookify").context("resolve project dirs")?;

    let config_dir = project_dirs.config_dir();
    fs::create_dir_all(config_dir)
        .with_context(|| format!("create config dir {}", config_dir.display()))?;
    let config = load_config(&config_dir.join("config.toml"))?;

    let data_dir = project_dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;
    configure_logging(&data_dir.join("bookify.log"), &config.log_filter)?;
    info!("bookify {} starting", env!("CARGO_PKG_VERSION"));

    let storage = Storage::open(config_dir.join("bookify.db"))?;
    let catalog = HttpCatalog::new(&config)?;
    let ctx = AppContext::new(config, storage)?;

    let mut ui = Ui::new(ctx, Arc::new(catalog));
    let result = ui.run();
    match &result {
        Ok(()) => info!("bookify exiting"),
        Err(err) => error!("bookify failed: {err:#}"),
    }
    result
}

/// A missing file means defaults; anything unreadable or malformed is fatal.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("read config {}", path.display()));
        }
    };
    parse_config(&raw).with_context(|| format!("parse config {}", path.display()))
}

fn parse_config(raw: &str) -> anyhow::Result<Config> {
    let mut config: Config = toml::from_str(raw)?;
    config.normalize();
    Ok(config)
}

/// The UI owns the terminal, so traces go to a file.
fn configure_logging(path: &Path, fallback_filter: &str) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!("init logging: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() -> anyhow::Result<()> {
        assert_eq!(parse_config("")?, Config::default());
        Ok(())
    }

    #[test]
    fn partial_config_overrides_fields() -> anyhow::Result<()> {
        let config = parse_config(
            r#"
            username = "reader"
            password = "s3cret"
            max_results = 10
            default_query = "  science fiction "
            "#,
        )?;
        assert_eq!(config.username, "reader");
        assert!(config.credentials_match("reader", "s3cret"));
        assert_eq!(config.max_results, 10);
        assert_eq!(config.default_query, "science fiction");
        assert_eq!(config.catalog_url, Config::default().catalog_url);
        Ok(())
    }

    #[test]
    fn out_of_range_values_are_clamped() -> anyhow::Result<()> {
        let config = parse_config("max_results = 500\nrequest_timeout_secs = 0\nlog_filter = \"\"")?;
        assert_eq!(config.max_results, 40);
        assert_eq!(config.request_timeout_secs, 1);
        assert_eq!(config.log_filter, "info");
        Ok(())
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(parse_config("max_results = \"many\"").is_err());
        assert!(parse_config("username = ").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = load_config(&dir.path().join("config.toml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn load_config_names_the_file_on_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_results = [")?;
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
        Ok(())
    }
}
