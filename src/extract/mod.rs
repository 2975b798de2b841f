mod fields;

use scraper::Html;
use thiserror::Error;

use crate::fetch::{Fetch, FetchError};
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poster {
    /// No poster container on the page at all.
    Absent,
    /// Container present but no image link inside it.
    NoCover,
    Url(String),
}

impl Poster {
    /// URL to actually download, substituting `placeholder` for the
    /// missing and sentinel cases.
    pub fn url_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            Poster::Url(url) => url,
            Poster::Absent | Poster::NoCover => placeholder,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapedMovie {
    pub identifier: String,
    pub title: String,
    pub year: String,
    pub categories: Vec<String>,
    pub director: String,
    pub actors: Vec<String>,
    pub user_rating: Option<f64>,
    pub mpaa_rating: String,
    pub summary: String,
    pub poster: Poster,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("page for {0} has no usable title element")]
    MissingTitle(String),
    #[error("unparseable user rating {value:?} for {identifier}")]
    BadRating {
        identifier: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Fetch the detail page for one identifier and parse it. Exactly one
/// outbound request per call; no retries.
pub fn scrape(
    fetcher: &impl Fetch,
    settings: &Settings,
    identifier: &str,
) -> Result<ScrapedMovie, ExtractError> {
    let url = format!("{}{}", settings.title_base_url, identifier);
    let html = fetcher.page(&url)?;
    parse_movie_page(identifier, &html)
}

/// Parse one detail page. Field lookups are independent and each tolerates
/// its element being missing, with two exceptions: the title is required, and
/// a rating that is present but non-numeric is an error rather than a default.
pub fn parse_movie_page(identifier: &str, html: &str) -> Result<ScrapedMovie, ExtractError> {
    let doc = Html::parse_document(html);

    let title = fields::title(&doc)
        .ok_or_else(|| ExtractError::MissingTitle(identifier.to_string()))?;

    let user_rating = match fields::user_rating_raw(&doc) {
        None => None,
        Some(raw) => Some(raw.parse::<f64>().map_err(|source| ExtractError::BadRating {
            identifier: identifier.to_string(),
            value: raw.clone(),
            source,
        })?),
    };

    Ok(ScrapedMovie {
        identifier: identifier.to_string(),
        title,
        year: fields::year(&doc),
        categories: fields::categories(&doc),
        director: fields::director(&doc),
        actors: fields::actors(&doc),
        user_rating,
        mpaa_rating: fields::mpaa_rating(&doc),
        summary: fields::summary(&doc),
        poster: fields::poster(&doc),
    })
}
