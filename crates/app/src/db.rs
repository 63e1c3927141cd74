//! SQLite URL handling for the binary. Kept here so core and services stay pure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use storage::repository::Storage;
use tracing::debug;

pub const DEFAULT_DB_URL: &str = "sqlite://exam.sqlite3";

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file (and parent directories) so `SQLite` can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

/// Open and migrate `SQLite` storage.
pub async fn open_storage(db_url: &str) -> Result<Storage> {
    prepare_sqlite_file(db_url)?;
    debug!(db_url, "opening storage");
    Storage::sqlite(db_url)
        .await
        .with_context(|| format!("opening database {db_url}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_full_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url(" sqlite:///tmp/exam.db "),
            "sqlite:///tmp/exam.db"
        );
    }

    #[test]
    fn normalize_makes_paths_absolute() {
        let url = normalize_sqlite_url("sqlite:data/exam.db");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/exam.db"));
    }

    #[test]
    fn prepare_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/exam.db");
        let url = format!("sqlite://{}", path.display());
        prepare_sqlite_file(&url).unwrap();
        assert!(path.exists());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }
}
