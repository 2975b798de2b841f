use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::Poster;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static POSTER_DIV: LazyLock<Selector> = LazyLock::new(|| sel("div.poster"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| sel("a"));
static IMG: LazyLock<Selector> = LazyLock::new(|| sel("img"));
static TITLE_H1: LazyLock<Selector> =
    LazyLock::new(|| sel(r#"div.title_wrapper h1[itemprop="name"]"#));
static YEAR_SPAN: LazyLock<Selector> = LazyLock::new(|| sel("span#titleYear"));
static SUMMARY_DIV: LazyLock<Selector> = LazyLock::new(|| sel(r#"div[itemprop="description"]"#));
static GENRE_SPAN: LazyLock<Selector> = LazyLock::new(|| sel(r#"span.itemprop[itemprop="genre"]"#));
static DIRECTOR_SPAN: LazyLock<Selector> = LazyLock::new(|| sel(r#"span[itemprop="director"]"#));
static NAME_SPAN: LazyLock<Selector> = LazyLock::new(|| sel(r#"span[itemprop="name"]"#));
static ACTOR_SPAN: LazyLock<Selector> = LazyLock::new(|| sel(r#"span[itemprop="actors"]"#));
static ITEMPROP_SPAN: LazyLock<Selector> = LazyLock::new(|| sel("span.itemprop"));
static RATING_SPAN: LazyLock<Selector> = LazyLock::new(|| sel(r#"span[itemprop="ratingValue"]"#));
static MPAA_SPAN: LazyLock<Selector> = LazyLock::new(|| sel(r#"span[itemprop="contentRating"]"#));

fn text_of(el: scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Three-way poster lookup: no container, container without an image link,
/// or a real image URL.
pub fn poster(doc: &Html) -> Poster {
    let Some(div) = doc.select(&POSTER_DIV).next() else {
        return Poster::Absent;
    };
    let Some(a) = div.select(&ANCHOR).next() else {
        return Poster::NoCover;
    };
    a.select(&IMG)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| Poster::Url(src.to_string()))
        .unwrap_or(Poster::NoCover)
}

/// The h1 holds the bare title as its first text node; the year span that may
/// follow is a separate element. Returns None when the heading is missing or
/// carries no text, which marks the page as unexpectedly formatted.
pub fn title(doc: &Html) -> Option<String> {
    let h1 = doc.select(&TITLE_H1).next()?;
    let text = h1.text().next()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Release year as displayed, "-" when the page has no year element. The span
/// wraps the year in parentheses and a link, so pull the first run of four
/// digits rather than relying on exact nesting.
pub fn year(doc: &Html) -> String {
    doc.select(&YEAR_SPAN)
        .next()
        .map(|span| span.text().collect::<String>())
        .and_then(|text| YEAR_RE.find(&text).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "-".to_string())
}

pub fn summary(doc: &Html) -> String {
    doc.select(&SUMMARY_DIV)
        .next()
        .map(text_of)
        .unwrap_or_default()
}

pub fn categories(doc: &Html) -> Vec<String> {
    doc.select(&GENRE_SPAN)
        .map(text_of)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn director(doc: &Html) -> String {
    doc.select(&DIRECTOR_SPAN)
        .next()
        .and_then(|span| span.select(&NAME_SPAN).next())
        .map(text_of)
        .unwrap_or_default()
}

pub fn actors(doc: &Html) -> Vec<String> {
    doc.select(&ACTOR_SPAN)
        .filter_map(|span| span.select(&ITEMPROP_SPAN).next())
        .map(text_of)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Raw rating text; numeric parsing and its failure mode belong to the caller.
pub fn user_rating_raw(doc: &Html) -> Option<String> {
    doc.select(&RATING_SPAN).next().map(text_of)
}

pub fn mpaa_rating(doc: &Html) -> String {
    doc.select(&MPAA_SPAN)
        .next()
        .map(text_of)
        .unwrap_or_else(|| "no rating".to_string())
}
