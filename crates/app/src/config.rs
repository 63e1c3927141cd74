//! `exam.toml` loading.
//!
//! ```toml
//! [session]
//! mode = "assessment"
//! navigation = "no-backtrack"
//! shuffle_questions = true
//!
//! [session.timer]
//! duration_secs = 1800
//! grace_period_secs = 30
//!
//! [storage]
//! database_url = "sqlite:exam.sqlite3"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use exam_core::config::SessionConfig;
use serde::Deserialize;

use crate::db::normalize_sqlite_url;

pub const DEFAULT_CONFIG_FILE: &str = "exam.toml";
pub const DB_URL_ENV: &str = "EXAM_DB_URL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load from `path`, or from `exam.toml` in the working directory when it
    /// exists, then apply `EXAM_DB_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        if let Ok(url) = std::env::var(DB_URL_ENV)
            && !url.trim().is_empty()
        {
            config.storage.database_url = Some(url);
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        let session = config
            .session
            .validate()
            .context("invalid [session] settings")?;
        Ok(Self { session, ..config })
    }

    /// Database URL from the command line, falling back to the config file.
    pub fn database_url(&self, cli: Option<&str>) -> Option<String> {
        cli.or(self.storage.database_url.as_deref())
            .map(normalize_sqlite_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::SessionMode;
    use exam_core::navigation::NavigationMode;
    use std::io::Write;

    #[test]
    fn parses_session_and_storage_tables() {
        let config = AppConfig::from_toml(
            r#"
            [session]
            mode = "assessment"
            navigation = "no-backtrack"

            [session.timer]
            duration_secs = 900
            auto_submit = false

            [storage]
            database_url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.mode, SessionMode::Assessment);
        assert_eq!(config.session.navigation, NavigationMode::NoBacktrack);
        assert_eq!(config.session.timer.duration_secs, 900);
        assert!(config.session.timer.auto_submit);
        assert_eq!(
            config.database_url(None).as_deref(),
            Some("sqlite::memory:")
        );
        assert_eq!(
            config.database_url(Some("sqlite:///tmp/x.db")).as_deref(),
            Some("sqlite:///tmp/x.db")
        );
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.session, SessionConfig::practice());
        assert!(config.database_url(None).is_none());
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let err = AppConfig::from_toml("[session.timer]\ngrace_period_secs = 9000\n").unwrap_err();
        assert!(format!("{err:#}").contains("grace period"));
    }

    #[test]
    fn loads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nshuffle_questions = true").unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.session.shuffle_questions);
        assert!(AppConfig::from_file(Path::new("/nonexistent/exam.toml")).is_err());
    }
}
