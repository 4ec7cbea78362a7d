//! Normalization pipeline for a university course catalog: raw scraped term
//! trees in, typed schedule records out, with SQLite staging/storage and CSV
//! export around the core.

pub mod db;
pub mod export;
pub mod ingest;
pub mod parser;
pub mod settings;
