//! `SQLite` persistence for session snapshots and results.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};

use crate::repository::{ResultRepository, SnapshotRepository, Storage};

mod mapping;
mod migrate;
mod result_repo;
mod snapshot_repo;

const POOL_SIZE: u32 = 5;

/// Both repository traits over one connection pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// `sqlite::memory:` gives every connection its own database, so such pools
/// hold a single connection.
fn is_private_memory_db(database_url: &str) -> bool {
    database_url.trim() == "sqlite::memory:"
}

impl SqliteRepository {
    /// Open a pool with WAL journaling and a 5s busy timeout on every connection.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or a pragma fails.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let max_connections = if is_private_memory_db(database_url) {
            1
        } else {
            POOL_SIZE
        };
        debug!(database_url, max_connections, "opening sqlite pool");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Bring the schema up to date. Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Snapshot and result repositories sharing one migrated `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        info!(database_url, "session storage ready");
        Ok(Self {
            snapshots: Arc::new(repo.clone()) as Arc<dyn SnapshotRepository>,
            results: Arc::new(repo) as Arc<dyn ResultRepository>,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[test]
    fn only_anonymous_memory_db_is_private() {
        assert!(is_private_memory_db("sqlite::memory:"));
        assert!(!is_private_memory_db(
            "sqlite:file:memdb_snapshots?mode=memory&cache=shared"
        ));
        assert!(!is_private_memory_db("sqlite:///tmp/exam.sqlite3"));
    }

    #[tokio::test]
    async fn memory_storage_round_trips_through_one_connection() {
        let storage = Storage::sqlite("sqlite::memory:").await.unwrap();
        assert!(storage.results.list_results(5).await.unwrap().is_empty());
    }
}
