use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::settings::Settings;

/// Date format used by the collection list: month/day/year.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone)]
pub struct CollectionEntry {
    pub identifier: String,
    /// Raw date cell. Parsed only when the entry is actually processed, so a
    /// blank-identifier row never trips over its date column.
    pub date_added: String,
}

/// Read the tab-separated collection list. A row that is too short to hold
/// both configured columns is a configuration error and fails the whole read;
/// a blank identifier cell is a valid row that the pipeline will skip.
pub fn read_entries(path: &Path, settings: &Settings) -> Result<Vec<CollectionEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read source list {}", path.display()))?;

    let needed = settings.id_column.max(settings.date_column) + 1;
    let mut entries = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        if settings.skip_header && lineno == 0 {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() < needed {
            bail!(
                "source list {} line {}: expected at least {} tab-separated columns, got {}",
                path.display(),
                lineno + 1,
                needed,
                cells.len()
            );
        }
        entries.push(CollectionEntry {
            identifier: cells[settings.id_column].trim().to_string(),
            date_added: cells[settings.date_column].trim().to_string(),
        });
    }
    Ok(entries)
}

pub fn parse_date_added(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_list(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_id_and_date_cells() {
        let f = write_list("tt0111161\t01/15/2016\n\ntt0068646\t03/02/2017\n");
        let entries = read_entries(f.path(), &Settings::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "tt0111161");
        assert_eq!(entries[0].date_added, "01/15/2016");
        assert_eq!(entries[1].identifier, "tt0068646");
    }

    #[test]
    fn blank_identifier_cell_is_kept() {
        let f = write_list("\t01/15/2016\n");
        let entries = read_entries(f.path(), &Settings::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "");
    }

    #[test]
    fn short_row_is_a_configuration_error() {
        let f = write_list("tt0111161\t01/15/2016\ntt0068646\n");
        let err = read_entries(f.path(), &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn header_row_can_be_skipped() {
        let f = write_list("imdb_id\tdate_added\ntt0111161\t01/15/2016\n");
        let settings = Settings {
            skip_header: true,
            ..Settings::default()
        };
        let entries = read_entries(f.path(), &settings).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "tt0111161");
    }

    #[test]
    fn columns_are_configurable() {
        let f = write_list("My Movie\tBlu-ray\ttt0111161\t01/15/2016\n");
        let settings = Settings {
            id_column: 2,
            date_column: 3,
            ..Settings::default()
        };
        let entries = read_entries(f.path(), &settings).unwrap();
        assert_eq!(entries[0].identifier, "tt0111161");
        assert_eq!(entries[0].date_added, "01/15/2016");
    }

    #[test]
    fn date_parsing() {
        assert_eq!(
            parse_date_added("01/15/2016").unwrap(),
            NaiveDate::from_ymd_opt(2016, 1, 15).unwrap()
        );
        assert!(parse_date_added("2016-01-15").is_err());
        assert!(parse_date_added("13/45/2016").is_err());
    }
}
