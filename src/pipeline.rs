use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db::{self, MovieRecord};
use crate::extract::{self, ScrapedMovie};
use crate::fetch::Fetch;
use crate::settings::Settings;
use crate::source::{self, CollectionEntry};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub added: usize,
    pub already_present: usize,
    pub skipped_blank: usize,
    pub failed: usize,
}

/// Process the collection list sequentially: skip blank identifiers and ids
/// already in the store, then scrape, insert, and download the poster. A
/// failed entry is abandoned for this run; it stays absent from the store and
/// is naturally retried on the next invocation.
pub fn run(
    conn: &Connection,
    fetcher: &impl Fetch,
    settings: &Settings,
    entries: &[CollectionEntry],
) -> Result<RunReport> {
    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut report = RunReport::default();
    for entry in entries {
        pb.inc(1);
        let identifier = entry.identifier.trim();
        if identifier.is_empty() {
            report.skipped_blank += 1;
            continue;
        }
        if db::exists(conn, identifier)? {
            debug!(identifier, "already in store");
            report.already_present += 1;
            continue;
        }
        pb.set_message(identifier.to_string());
        match import_entry(conn, fetcher, settings, identifier, &entry.date_added) {
            Ok(()) => report.added += 1,
            Err(e) => {
                warn!(identifier, error = %format!("{e:#}"), "entry abandoned for this run");
                report.failed += 1;
            }
        }
    }
    pb.finish_and_clear();
    Ok(report)
}

fn import_entry(
    conn: &Connection,
    fetcher: &impl Fetch,
    settings: &Settings,
    identifier: &str,
    date_raw: &str,
) -> Result<()> {
    let date_added = source::parse_date_added(date_raw)
        .with_context(|| format!("malformed date {date_raw:?}"))?;

    let scraped = extract::scrape(fetcher, settings, identifier)?;
    let poster = scraped.poster.clone();
    db::insert(conn, &to_record(scraped, date_added))?;

    // A poster failure after a successful insert does not undo the row; the
    // movie is in the collection either way.
    let url = poster.url_or(&settings.placeholder_poster_url);
    let dest = settings.covers_dir.join(format!("{identifier}.jpg"));
    if let Err(e) = fetcher.download(url, &dest) {
        warn!(identifier, url, error = %e, "poster download failed");
    }
    Ok(())
}

fn to_record(scraped: ScrapedMovie, date_added: NaiveDate) -> MovieRecord {
    MovieRecord {
        identifier: scraped.identifier,
        title: scraped.title,
        year: scraped.year,
        categories: scraped.categories,
        director: scraped.director,
        actors: scraped.actors,
        user_rating: scraped.user_rating,
        mpaa_rating: scraped.mpaa_rating,
        summary: scraped.summary,
        date_added,
    }
}
