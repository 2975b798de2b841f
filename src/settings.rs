use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

/// Default image shown when a title has no usable poster on its detail page.
pub const PLACEHOLDER_POSTER_URL: &str =
    "http://ia.media-imdb.com/images/G/01/imdb/images/nopicture/180x268/unknown-3315334037._CB288986052_.png";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Tab-separated list of (imdb id, date added) pairs.
    pub source_path: PathBuf,
    pub db_path: PathBuf,
    pub covers_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub title_base_url: String,
    pub placeholder_poster_url: String,
    pub http_timeout_secs: u64,
    /// Zero-based column positions in the source list.
    pub id_column: usize,
    pub date_column: usize,
    pub skip_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("movies.tsv"),
            db_path: PathBuf::from("collection.sqlite"),
            covers_dir: PathBuf::from("covers"),
            catalog_path: PathBuf::from("movies.html"),
            title_base_url: "http://www.imdb.com/title/".to_string(),
            placeholder_poster_url: PLACEHOLDER_POSTER_URL.to_string(),
            http_timeout_secs: 30,
            id_column: 0,
            date_column: 1,
            skip_header: false,
        }
    }
}

impl Settings {
    /// Built-in defaults overridden by IMDB_* environment variables
    /// (IMDB_DB_PATH, IMDB_SOURCE_PATH, ...).
    pub fn load() -> Result<Self> {
        let cfg = defaults_builder()?
            .add_source(config::Environment::with_prefix("IMDB"))
            .build()
            .context("failed to load settings")?;
        cfg.try_deserialize().context("invalid settings")
    }
}

fn defaults_builder() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
    let d = Settings::default();
    let builder = Config::builder()
        .set_default("source_path", path_str(&d.source_path))?
        .set_default("db_path", path_str(&d.db_path))?
        .set_default("covers_dir", path_str(&d.covers_dir))?
        .set_default("catalog_path", path_str(&d.catalog_path))?
        .set_default("title_base_url", d.title_base_url)?
        .set_default("placeholder_poster_url", d.placeholder_poster_url)?
        .set_default("http_timeout_secs", d.http_timeout_secs as i64)?
        .set_default("id_column", d.id_column as i64)?
        .set_default("date_column", d.date_column as i64)?
        .set_default("skip_header", d.skip_header)?;
    Ok(builder)
}

fn path_str(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}
