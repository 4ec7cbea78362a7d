use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::ingest::RawTermFile;
use crate::parser::ParsedRecord;
use crate::settings;

pub fn connect() -> Result<Connection> {
    let path = settings::load().db_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let conn =
        Connection::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS raw_terms (
            id          INTEGER PRIMARY KEY,
            semester    TEXT NOT NULL CHECK(semester IN ('Fall','Spring','Summer','Winter')),
            year        INTEGER NOT NULL,
            source_file TEXT NOT NULL,
            payload     TEXT NOT NULL,
            processed   BOOLEAN NOT NULL DEFAULT 0,
            ingested_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(semester, year)
        );
        CREATE INDEX IF NOT EXISTS idx_raw_terms_processed ON raw_terms(processed);

        CREATE TABLE IF NOT EXISTS class_sections (
            id             INTEGER PRIMARY KEY,
            term_id        INTEGER NOT NULL REFERENCES raw_terms(id),
            semester       TEXT NOT NULL,
            year           INTEGER NOT NULL,
            dept_abbr      TEXT NOT NULL,
            dept_title     TEXT NOT NULL,
            course_number  TEXT NOT NULL,
            course_title   TEXT NOT NULL,
            units          TEXT NOT NULL,
            group_id       TEXT NOT NULL,
            section_type   TEXT NOT NULL CHECK(section_type IN ('lab','lec','sem','sup','act','add')),
            section_number TEXT NOT NULL,
            class_number   TEXT NOT NULL,
            instructor_fn  TEXT NOT NULL,
            instructor_ln  TEXT NOT NULL,
            days           TEXT NOT NULL,
            time_raw       TEXT NOT NULL,
            time_start     INTEGER NOT NULL,
            time_end       INTEGER NOT NULL,
            location       TEXT NOT NULL,
            comment        TEXT NOT NULL,
            created_at     TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_sections_term ON class_sections(semester, year);
        CREATE INDEX IF NOT EXISTS idx_sections_dept ON class_sections(dept_abbr);
        CREATE INDEX IF NOT EXISTS idx_sections_group ON class_sections(group_id);
        ",
    )?;
    Ok(())
}

// ── Staging ──

/// Stage raw term files. A term re-ingested for the same semester+year
/// replaces the previous payload and goes back to unprocessed.
pub fn stage_raw_terms(conn: &Connection, terms: &[RawTermFile]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO raw_terms (semester, year, source_file, payload, processed)
             VALUES (?1, ?2, ?3, ?4, 0)
             ON CONFLICT(semester, year) DO UPDATE SET
                 source_file = excluded.source_file,
                 payload = excluded.payload,
                 processed = 0,
                 ingested_at = datetime('now')",
        )?;
        for t in terms {
            count += stmt.execute(rusqlite::params![
                t.term.semester.as_str(),
                t.term.year,
                t.source_file,
                t.payload,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub struct StagedTerm {
    pub id: i64,
    pub semester: String,
    pub year: i32,
    pub payload: String,
}

pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<StagedTerm>> {
    let sql = format!(
        "SELECT id, semester, year, payload FROM raw_terms
         WHERE processed = 0 ORDER BY year, semester{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StagedTerm {
                id: row.get(0)?,
                semester: row.get(1)?,
                year: row.get(2)?,
                payload: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Records ──

/// Remove carriage returns, newlines, and double quotes from free-text
/// fields before storage.
fn clean(s: &str) -> String {
    s.replace(['\r', '\n', '"'], "")
}

/// Replace a term's records with the given set and mark the term processed.
/// Stored rows are the flat projection: day codes comma-joined in canonical
/// order, start/end as minute offsets from midnight.
pub fn save_records(conn: &Connection, term_id: i64, records: &[ParsedRecord]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        tx.execute("DELETE FROM class_sections WHERE term_id = ?1", [term_id])?;
        let mut stmt = tx.prepare(
            "INSERT INTO class_sections
             (term_id, semester, year, dept_abbr, dept_title, course_number, course_title,
              units, group_id, section_type, section_number, class_number,
              instructor_fn, instructor_ln, days, time_raw, time_start, time_end,
              location, comment)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
        )?;
        for r in records {
            let days: Vec<&str> = r.days.iter().map(|d| d.label()).collect();
            stmt.execute(rusqlite::params![
                term_id,
                r.semester.as_str(),
                r.year,
                r.dept_abbr,
                clean(&r.dept_title),
                r.course_number,
                clean(&r.course_title),
                r.units,
                r.group_id,
                r.section_type.as_str(),
                r.section_number,
                r.class_number,
                clean(&r.instructor.first_name),
                clean(&r.instructor.last_name),
                days.join(","),
                r.time.raw_range,
                r.time.start.raw_minutes,
                r.time.end.raw_minutes,
                clean(&r.location),
                clean(&r.comment),
            ])?;
        }
        tx.execute("UPDATE raw_terms SET processed = 1 WHERE id = ?1", [term_id])?;
    }
    tx.commit()?;
    Ok(())
}

/// One stored record in its flat form.
pub struct SectionRecordRow {
    pub semester: String,
    pub year: i32,
    pub dept_abbr: String,
    pub dept_title: String,
    pub course_number: String,
    pub course_title: String,
    pub units: String,
    pub group_id: String,
    pub section_type: String,
    pub section_number: String,
    pub class_number: String,
    pub instructor_fn: String,
    pub instructor_ln: String,
    pub days: String,
    pub time_raw: String,
    pub time_start: i64,
    pub time_end: i64,
    pub location: String,
    pub comment: String,
}

pub fn fetch_records(
    conn: &Connection,
    semester: Option<&str>,
    year: Option<i32>,
    dept: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<SectionRecordRow>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(s) = semester {
        conditions.push(format!("semester = ?{}", params.len() + 1));
        params.push(Box::new(s.to_string()));
    }
    if let Some(y) = year {
        conditions.push(format!("year = ?{}", params.len() + 1));
        params.push(Box::new(y));
    }
    if let Some(d) = dept {
        conditions.push(format!("dept_abbr = ?{}", params.len() + 1));
        params.push(Box::new(d.to_string()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let limit_clause = match limit {
        Some(n) => format!(" LIMIT {}", n),
        None => String::new(),
    };

    let sql = format!(
        "SELECT semester, year, dept_abbr, dept_title, course_number, course_title,
                units, group_id, section_type, section_number, class_number,
                instructor_fn, instructor_ln, days, time_raw, time_start, time_end,
                location, comment
         FROM class_sections{}
         ORDER BY year, semester, dept_abbr, course_number, id{}",
        where_clause, limit_clause
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(SectionRecordRow {
                semester: row.get(0)?,
                year: row.get(1)?,
                dept_abbr: row.get(2)?,
                dept_title: row.get(3)?,
                course_number: row.get(4)?,
                course_title: row.get(5)?,
                units: row.get(6)?,
                group_id: row.get(7)?,
                section_type: row.get(8)?,
                section_number: row.get(9)?,
                class_number: row.get(10)?,
                instructor_fn: row.get(11)?,
                instructor_ln: row.get(12)?,
                days: row.get(13)?,
                time_raw: row.get(14)?,
                time_start: row.get(15)?,
                time_end: row.get(16)?,
                location: row.get(17)?,
                comment: row.get(18)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub terms: usize,
    pub processed: usize,
    pub unprocessed: usize,
    pub records: usize,
    pub departments: usize,
    pub groups: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let terms: usize = conn.query_row("SELECT COUNT(*) FROM raw_terms", [], |r| r.get(0))?;
    let processed: usize = conn.query_row(
        "SELECT COUNT(*) FROM raw_terms WHERE processed = 1",
        [],
        |r| r.get(0),
    )?;
    let records: usize =
        conn.query_row("SELECT COUNT(*) FROM class_sections", [], |r| r.get(0))?;
    let departments: usize = conn.query_row(
        "SELECT COUNT(DISTINCT dept_abbr) FROM class_sections",
        [],
        |r| r.get(0),
    )?;
    let groups: usize = conn.query_row(
        "SELECT COUNT(DISTINCT group_id) FROM class_sections",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        terms,
        processed,
        unprocessed: terms - processed,
        records,
        departments,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::TermSchedule;
    use crate::parser::{self, dedup::GroupIdSource};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn fixture_records() -> Vec<ParsedRecord> {
        let json = std::fs::read_to_string("tests/fixtures/fall_2020.json").unwrap();
        let term: TermSchedule = serde_json::from_str(&json).unwrap();
        parser::flatten_term(&term, &GroupIdSource::new())
    }

    fn stage_fixture(conn: &Connection) -> i64 {
        let json = std::fs::read_to_string("tests/fixtures/fall_2020.json").unwrap();
        conn.execute(
            "INSERT INTO raw_terms (semester, year, source_file, payload)
             VALUES ('Fall', 2020, 'fall_2020.json', ?1)",
            rusqlite::params![json],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn records_round_trip() {
        let conn = memory_db();
        let term_id = stage_fixture(&conn);
        let records = fixture_records();
        save_records(&conn, term_id, &records).unwrap();

        let rows = fetch_records(&conn, None, None, None, None).unwrap();
        assert_eq!(rows.len(), records.len());

        let lec = rows.iter().find(|r| r.class_number == "12345").unwrap();
        assert_eq!(lec.days, "Tu,Th");
        assert_eq!(lec.time_start, 660);
        assert_eq!(lec.time_end, 735);
        assert_eq!(lec.section_type, "lec");
    }

    #[test]
    fn reprocessing_replaces_rows() {
        let conn = memory_db();
        let term_id = stage_fixture(&conn);
        let records = fixture_records();
        save_records(&conn, term_id, &records).unwrap();
        save_records(&conn, term_id, &records).unwrap();

        let rows = fetch_records(&conn, None, None, None, None).unwrap();
        assert_eq!(rows.len(), records.len());
    }

    #[test]
    fn save_marks_term_processed() {
        let conn = memory_db();
        let term_id = stage_fixture(&conn);
        save_records(&conn, term_id, &fixture_records()).unwrap();

        assert!(fetch_unprocessed(&conn, None).unwrap().is_empty());
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.terms, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.records, 4);
        assert_eq!(stats.departments, 2);
        assert_eq!(stats.groups, 3);
    }

    #[test]
    fn fetch_filters_by_dept() {
        let conn = memory_db();
        let term_id = stage_fixture(&conn);
        save_records(&conn, term_id, &fixture_records()).unwrap();

        let rows = fetch_records(&conn, None, None, Some("BIOL"), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].section_type, "add");
    }

    #[test]
    fn clean_strips_quotes_and_newlines() {
        assert_eq!(clean("a\"b\r\nc"), "abc");
        assert_eq!(clean("plain"), "plain");
    }
}
