//! CSV export of stored schedule records.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{self, SectionRecordRow};

const HEADER: &[&str] = &[
    "semester",
    "year",
    "dept_abbr",
    "dept_title",
    "course_number",
    "course_title",
    "units",
    "group_id",
    "section_type",
    "section_number",
    "class_number",
    "instructor_fn",
    "instructor_ln",
    "days",
    "time_start",
    "time_end",
    "location",
    "comment",
];

/// Write stored records, optionally filtered by term, to `out` as CSV.
/// Returns the number of data rows written.
pub fn write_csv(
    conn: &Connection,
    out: &Path,
    semester: Option<&str>,
    year: Option<i32>,
) -> Result<usize> {
    let rows = db::fetch_records(conn, semester, year, None, None)?;

    let mut writer =
        csv::Writer::from_path(out).with_context(|| format!("Failed to create {:?}", out))?;
    writer.write_record(HEADER)?;
    for row in &rows {
        writer.write_record(csv_fields(row))?;
    }
    writer.flush()?;
    Ok(rows.len())
}

fn csv_fields(row: &SectionRecordRow) -> Vec<String> {
    vec![
        row.semester.clone(),
        row.year.to_string(),
        row.dept_abbr.clone(),
        row.dept_title.clone(),
        row.course_number.clone(),
        row.course_title.clone(),
        row.units.clone(),
        row.group_id.clone(),
        row.section_type.clone(),
        row.section_number.clone(),
        row.class_number.clone(),
        row.instructor_fn.clone(),
        row.instructor_ln.clone(),
        row.days.clone(),
        row.time_start.to_string(),
        row.time_end.to_string(),
        row.location.clone(),
        row.comment.clone(),
    ]
}
