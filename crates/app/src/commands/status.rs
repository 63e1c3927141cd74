//! The `exam status` command: progress of a saved session.

use std::path::Path;

use anyhow::{Context, Result, bail};
use exam_core::model::SessionId;
use serde_json::json;
use services::{Clock, SessionLoopService};
use storage::bank::QuestionBank;

use crate::config::AppConfig;
use crate::db::{DEFAULT_DB_URL, normalize_sqlite_url, open_storage};

pub async fn execute(
    config: &AppConfig,
    bank: &Path,
    session_id: SessionId,
    db: Option<&str>,
) -> Result<()> {
    let url = config
        .database_url(db)
        .unwrap_or_else(|| normalize_sqlite_url(DEFAULT_DB_URL));
    let storage = open_storage(&url).await?;

    let Some(snapshot) = storage.snapshots.load_snapshot(session_id).await? else {
        bail!("no saved session {session_id}");
    };
    let questions = QuestionBank::from_path(bank)
        .with_context(|| format!("loading question bank {}", bank.display()))?;

    let workflow = SessionLoopService::from_storage(Clock::default_clock(), &storage);
    let session = workflow
        .start_session(questions, config.session.clone(), Some(session_id))
        .await?;
    let progress = session.progress();

    let report = json!({
        "session": session_id.to_string(),
        "saved_at": snapshot.timestamp,
        "total": progress.total,
        "answered": progress.answered,
        "submitted": progress.submitted,
        "marked": progress.marked,
        "current": progress.current,
        "remaining_secs": snapshot.remaining_secs,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
