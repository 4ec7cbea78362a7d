//! Raw term intake. The scraper that walks the catalog site lives outside
//! this repo and writes one JSON file per term; ingest scans a directory,
//! deserializes each file, and hands the payloads to the database layer for
//! staging.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// School term seasons as printed by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Semester {
    Fall,
    Spring,
    Summer,
    Winter,
}

impl Semester {
    pub fn as_str(self) -> &'static str {
        match self {
            Semester::Fall => "Fall",
            Semester::Spring => "Spring",
            Semester::Summer => "Summer",
            Semester::Winter => "Winter",
        }
    }
}

/// One table cell plus the raw text of its column header.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSectionPiece {
    pub raw_key: String,
    pub value: String,
}

/// One source sub-table of sections (e.g. a lecture+lab pairing). Each
/// section is the ordered list of its row's cells.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    #[allow(dead_code)]
    pub group_number: i64,
    pub sections: Vec<Vec<RawSectionPiece>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCourse {
    pub course_number: String,
    pub course_title: String,
    pub units: String,
    pub groups: Vec<RawGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDepartment {
    pub dept: String,
    pub courses: Vec<RawCourse>,
}

/// One term's full raw tree as produced by the scraper.
#[derive(Debug, Clone, Deserialize)]
pub struct TermSchedule {
    pub semester: Semester,
    pub year: i32,
    pub departments: Vec<RawDepartment>,
}

/// A raw term file read from disk, ready for staging.
pub struct RawTermFile {
    pub term: TermSchedule,
    pub source_file: String,
    pub payload: String,
}

/// Read every parseable term file in `dir`. Files that fail to read or
/// deserialize are reported and skipped; a bad file must not sink the rest
/// of the batch.
pub fn load_directory(dir: &Path) -> Result<Vec<RawTermFile>> {
    let files = list_json_files(dir)?;
    info!("Found {} raw term files in {:?}", files.len(), dir);

    let mut terms = Vec::new();
    for path in &files {
        let payload = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };
        let term: TermSchedule = match serde_json::from_str(&payload) {
            Ok(term) => term,
            Err(e) => {
                warn!("Skipping {:?}: malformed term JSON: {}", path, e);
                continue;
            }
        };

        let source_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        info!(
            "Loaded {} {} ({} departments, {} sections) from {}",
            term.semester.as_str(),
            term.year,
            term.departments.len(),
            total_sections(&term),
            source_file,
        );
        terms.push(RawTermFile {
            term,
            source_file,
            payload,
        });
    }
    Ok(terms)
}

/// List the `.json` files in a directory, sorted for deterministic runs.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read raw term directory {:?}", dir))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

/// Section count across a whole raw tree, for ingest and process reporting.
pub fn total_sections(term: &TermSchedule) -> usize {
    term.departments
        .iter()
        .flat_map(|d| &d.courses)
        .flat_map(|c| &c.groups)
        .map(|g| g.sections.len())
        .sum()
}
