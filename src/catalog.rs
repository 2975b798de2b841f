use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{self, MovieRecord};

/// Regenerate the catalog file from the full store contents. Returns the
/// number of records rendered.
pub fn write(conn: &Connection, path: &Path) -> Result<usize> {
    let records = db::list_all(conn)?;
    fs::write(path, render(&records))
        .with_context(|| format!("failed to write catalog {}", path.display()))?;
    Ok(records.len())
}

/// One self-contained HTML document, styling inline, one entry block per
/// record in store order.
pub fn render(records: &[MovieRecord]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str("<meta http-equiv='content-type' content='text/html; charset=UTF-8'>\n");
    out.push_str("<title>My Movies</title>\n");
    out.push_str("<style>\n");
    out.push_str("table { border-collapse: collapse; }\n");
    out.push_str("span.title { font-family: Arial; font-weight: bold; font-size: 22px; }\n");
    out.push_str("span.infoheading { font-family: Arial; font-weight: bold; font-size: 14px; }\n");
    out.push_str("span.infodetail { font-family: Arial; font-size: 14px; }\n");
    out.push_str("span.plot { font-family: Arial; font-style: italic; font-size: 14px; }\n");
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str("<table border width='600'>\n<tbody>\n");
    for record in records {
        render_record(&mut out, record);
    }
    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

fn render_record(out: &mut String, r: &MovieRecord) {
    let rating = r
        .user_rating
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());

    let _ = write!(
        out,
        "<tr>\n<td style='width: 250px;'><img alt='' src='covers/{}.jpg'></td>\n",
        escape(&r.identifier)
    );
    out.push_str("<td style='width: 100%; vertical-align: top;'>\n");
    out.push_str("<table style='width: 100%;' border='0'>\n<tbody>\n");
    let _ = writeln!(
        out,
        "<tr><td colspan='2'><span class='title'>{}</span></td></tr>",
        escape(&r.title)
    );
    info_row(out, "Year:", &r.year);
    info_row(out, "Categories:", &r.categories.join(", "));
    info_row(out, "Directed by:", &r.director);
    info_row(out, "Top cast:", &r.actors.join(", "));
    info_row(out, "User rating:", &rating);
    info_row(out, "MPAA rating:", &r.mpaa_rating);
    info_row(out, "Added:", &r.date_added.format("%Y-%m-%d").to_string());
    let _ = writeln!(
        out,
        "<tr><td colspan='2'><span class='plot'>{}</span></td></tr>",
        escape(&r.summary)
    );
    out.push_str("</tbody>\n</table>\n</td>\n</tr>\n");
}

fn info_row(out: &mut String, heading: &str, value: &str) {
    let _ = writeln!(
        out,
        "<tr><td style='white-space: nowrap;'><span class='infoheading'>{}</span></td>\
         <td><span class='infodetail'>{}</span></td></tr>",
        heading,
        escape(value)
    );
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> MovieRecord {
        MovieRecord {
            identifier: "tt0111161".to_string(),
            title: "The Shawshank Redemption".to_string(),
            year: "1994".to_string(),
            categories: vec!["Action".to_string(), "Drama".to_string()],
            director: "Frank Darabont".to_string(),
            actors: vec!["Tim Robbins".to_string(), "Morgan Freeman".to_string()],
            user_rating: Some(9.3),
            mpaa_rating: "R".to_string(),
            summary: "Hope is a good thing.".to_string(),
            date_added: NaiveDate::from_ymd_opt(2016, 1, 15).unwrap(),
        }
    }

    #[test]
    fn renders_one_entry_block() {
        let html = render(&[record()]);
        assert!(html.contains("covers/tt0111161.jpg"));
        assert!(html.contains("The Shawshank Redemption"));
        assert!(html.contains("Action, Drama"));
        assert!(html.contains("Tim Robbins, Morgan Freeman"));
        assert!(html.contains("9.3"));
        assert!(html.contains("2016-01-15"));
    }

    #[test]
    fn date_is_calendar_only() {
        let html = render(&[record()]);
        assert!(html.contains("2016-01-15"));
        assert!(!html.contains("00:00"));
    }

    #[test]
    fn absent_rating_renders_as_dash() {
        let mut r = record();
        r.user_rating = None;
        let html = render(&[r]);
        assert!(html.contains("<span class='infodetail'>-</span>"));
    }

    #[test]
    fn text_is_html_escaped() {
        let mut r = record();
        r.title = "Fast & <Furious>".to_string();
        let html = render(&[r]);
        assert!(html.contains("Fast &amp; &lt;Furious&gt;"));
        assert!(!html.contains("<Furious>"));
    }

    #[test]
    fn empty_store_renders_a_valid_shell() {
        let html = render(&[]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(!html.contains("covers/"));
    }

    #[test]
    fn records_appear_in_store_order() {
        let mut second = record();
        second.identifier = "tt0068646".to_string();
        second.title = "The Godfather".to_string();
        let html = render(&[record(), second]);
        let first_at = html.find("tt0111161").unwrap();
        let second_at = html.find("tt0068646").unwrap();
        assert!(first_at < second_at);
    }
}
