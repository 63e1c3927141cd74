use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::SqliteInitError;

/// Ordered schema versions. Each one runs in its own transaction and is
/// recorded in `schema_migrations`.
const MIGRATIONS: &[(i64, &[&str])] = &[(
    1,
    &[
        r"
        CREATE TABLE IF NOT EXISTS session_snapshots (
            session_id TEXT PRIMARY KEY,
            snapshot TEXT NOT NULL,
            saved_at TEXT NOT NULL
        )
        ",
        r"
        CREATE TABLE IF NOT EXISTS session_results (
            id INTEGER PRIMARY KEY,
            session_id TEXT NOT NULL,
            mode TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100),
            total_questions INTEGER NOT NULL CHECK (total_questions >= 0),
            correct_answers INTEGER NOT NULL CHECK (correct_answers >= 0),
            max_score INTEGER NOT NULL CHECK (max_score >= 0),
            answered_count INTEGER NOT NULL CHECK (answered_count >= 0),
            time_spent_secs INTEGER NOT NULL CHECK (time_spent_secs >= 0),
            completed_at TEXT NOT NULL
        )
        ",
        r"
        CREATE INDEX IF NOT EXISTS idx_session_results_completed
            ON session_results (completed_at)
        ",
    ],
)];

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    for &(version, statements) in MIGRATIONS {
        let applied = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?
            .is_some();
        if applied {
            continue;
        }

        let mut tx = pool.begin().await?;
        for &statement in statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)
             ON CONFLICT(version) DO NOTHING",
        )
        .bind(version)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        info!(version, "applied schema migration");
    }

    Ok(())
}
