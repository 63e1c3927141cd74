//! The `exam results` command: most recent stored results.

use anyhow::Result;

use crate::config::AppConfig;
use crate::db::{DEFAULT_DB_URL, normalize_sqlite_url, open_storage};

pub async fn execute(config: &AppConfig, limit: u32, db: Option<&str>) -> Result<()> {
    let url = config
        .database_url(db)
        .unwrap_or_else(|| normalize_sqlite_url(DEFAULT_DB_URL));
    let storage = open_storage(&url).await?;

    let rows = storage.results.list_results(limit).await?;
    if rows.is_empty() {
        println!("No results stored.");
        return Ok(());
    }
    for row in rows {
        let result = &row.result;
        println!(
            "#{:<4} {}  {:<10} {:>3}%  {}/{} pts  {}/{} answered  {}s  {}",
            row.id,
            result.completed_at.format("%Y-%m-%d %H:%M"),
            result.mode,
            result.score,
            result.correct_answers,
            result.max_score,
            result.answered_count,
            result.total_questions,
            result.time_spent_secs,
            row.session_id,
        );
    }
    Ok(())
}
