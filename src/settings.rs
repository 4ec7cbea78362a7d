use std::path::PathBuf;

use config::Config;

const DEFAULT_DB_PATH: &str = "data/catalog.sqlite";
const DEFAULT_RAW_DIR: &str = "data/raw";

/// Environment-backed settings, prefix `CATALOG_` (e.g. `CATALOG_DB_PATH`).
pub struct Settings {
    pub db_path: PathBuf,
    pub raw_dir: PathBuf,
}

pub fn load() -> Settings {
    let source = Config::builder()
        .add_source(config::Environment::with_prefix("CATALOG"))
        .build()
        .unwrap_or_default();

    let db_path = source
        .get_string("db_path")
        .unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    let raw_dir = source
        .get_string("raw_dir")
        .unwrap_or_else(|_| DEFAULT_RAW_DIR.to_string());

    Settings {
        db_path: PathBuf::from(db_path),
        raw_dir: PathBuf::from(raw_dir),
    }
}
