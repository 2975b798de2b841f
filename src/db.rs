use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

/// One movie as persisted: a record is written once on first encounter of its
/// identifier and never updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub identifier: String,
    pub title: String,
    pub year: String,
    pub categories: Vec<String>,
    pub director: String,
    pub actors: Vec<String>,
    pub user_rating: Option<f64>,
    pub mpaa_rating: String,
    pub summary: String,
    pub date_added: NaiveDate,
}

const LIST_SEPARATOR: &str = ", ";

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS movies (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            year        TEXT NOT NULL,
            categories  TEXT NOT NULL,
            director    TEXT NOT NULL,
            actors      TEXT NOT NULL,
            user_rating REAL,
            mpaa_rating TEXT NOT NULL,
            summary     TEXT NOT NULL,
            date_added  TEXT NOT NULL
        );",
    )?;
    Ok(())
}

/// Explicit existence check. Store errors propagate; they are never folded
/// into "not found".
pub fn exists(conn: &Connection, identifier: &str) -> Result<bool> {
    let id: Option<String> = conn
        .query_row("SELECT id FROM movies WHERE id = ?1", [identifier], |r| r.get(0))
        .optional()
        .with_context(|| format!("existence check for {identifier} failed"))?;
    Ok(id.is_some())
}

/// Plain INSERT: a duplicate identifier is a primary key violation. Callers
/// check `exists` first; there is a single writer by contract.
pub fn insert(conn: &Connection, record: &MovieRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO movies (id, title, year, categories, director, actors,
                             user_rating, mpaa_rating, summary, date_added)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            record.identifier,
            record.title,
            record.year,
            record.categories.join(LIST_SEPARATOR),
            record.director,
            record.actors.join(LIST_SEPARATOR),
            record.user_rating,
            record.mpaa_rating,
            record.summary,
            record.date_added,
        ],
    )
    .with_context(|| format!("failed to insert {}", record.identifier))?;
    Ok(())
}

/// All records in insertion order.
pub fn list_all(conn: &Connection) -> Result<Vec<MovieRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, year, categories, director, actors,
                user_rating, mpaa_rating, summary, date_added
         FROM movies ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MovieRecord {
                identifier: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                categories: split_list(&row.get::<_, String>(3)?),
                director: row.get(4)?,
                actors: split_list(&row.get::<_, String>(5)?),
                user_rating: row.get(6)?,
                mpaa_rating: row.get(7)?,
                summary: row.get(8)?,
                date_added: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count(conn: &Connection) -> Result<usize> {
    let n: usize = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
    Ok(n)
}

fn split_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(LIST_SEPARATOR).map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn record(id: &str) -> MovieRecord {
        MovieRecord {
            identifier: id.to_string(),
            title: "Some Movie".to_string(),
            year: "1994".to_string(),
            categories: vec!["Action".to_string(), "Drama".to_string()],
            director: "Jane Doe".to_string(),
            actors: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            user_rating: Some(8.5),
            mpaa_rating: "R".to_string(),
            summary: "A movie.".to_string(),
            date_added: NaiveDate::from_ymd_opt(2016, 1, 15).unwrap(),
        }
    }

    #[test]
    fn insert_then_exists_and_list() {
        let conn = test_conn();
        assert!(!exists(&conn, "tt1").unwrap());
        insert(&conn, &record("tt1")).unwrap();
        assert!(exists(&conn, "tt1").unwrap());

        let all = list_all(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], record("tt1"));
    }

    #[test]
    fn exists_propagates_store_errors() {
        // No schema: the query itself fails, and that failure must surface
        // instead of reading as "not found".
        let conn = Connection::open_in_memory().unwrap();
        assert!(exists(&conn, "tt1").is_err());
    }

    #[test]
    fn duplicate_insert_is_an_error() {
        let conn = test_conn();
        insert(&conn, &record("tt1")).unwrap();
        assert!(insert(&conn, &record("tt1")).is_err());
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn categories_persist_comma_joined() {
        let conn = test_conn();
        insert(&conn, &record("tt1")).unwrap();
        let stored: String = conn
            .query_row("SELECT categories FROM movies WHERE id = 'tt1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "Action, Drama");
    }

    #[test]
    fn empty_lists_round_trip() {
        let conn = test_conn();
        let mut r = record("tt1");
        r.categories.clear();
        r.actors.clear();
        r.user_rating = None;
        insert(&conn, &r).unwrap();
        let back = &list_all(&conn).unwrap()[0];
        assert!(back.categories.is_empty());
        assert!(back.actors.is_empty());
        assert_eq!(back.user_rating, None);
    }

    #[test]
    fn list_all_is_insertion_ordered() {
        let conn = test_conn();
        for id in ["tt9", "tt1", "tt5"] {
            insert(&conn, &record(id)).unwrap();
        }
        let ids: Vec<String> = list_all(&conn).unwrap().into_iter().map(|r| r.identifier).collect();
        assert_eq!(ids, vec!["tt9", "tt1", "tt5"]);
    }
}
