//! The `exam grade` command: run a headless session from an answers file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use exam_core::model::{AnswerValue, SessionId, SessionMode};
use serde::Deserialize;
use services::{Clock, FinishOutcome, FinishPolicy, Navigation, SessionLoopService, SessionService};
use storage::bank::QuestionBank;
use storage::repository::Storage;
use tracing::info;

use crate::config::AppConfig;
use crate::db::open_storage;

/// One line of an answers file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerEntry {
    pub index: usize,
    pub answer: AnswerValue,
}

pub struct GradeArgs {
    pub bank: PathBuf,
    pub answers: PathBuf,
    pub mode: Option<SessionMode>,
    pub db: Option<String>,
    pub resume: Option<SessionId>,
    pub save: bool,
}

pub fn load_answers(path: &Path) -> Result<Vec<AnswerEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading answers {}", path.display()))?;
    let mut entries: Vec<AnswerEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing answers {}", path.display()))?;
    entries.sort_by_key(|entry| entry.index);
    Ok(entries)
}

pub async fn execute(config: &AppConfig, args: GradeArgs) -> Result<()> {
    let questions = QuestionBank::from_path(&args.bank)
        .with_context(|| format!("loading question bank {}", args.bank.display()))?;
    let entries = load_answers(&args.answers)?;

    let mut session_config = config.session.clone();
    if let Some(mode) = args.mode {
        session_config.mode = mode;
    }

    let storage = match config.database_url(args.db.as_deref()) {
        Some(url) => open_storage(&url).await?,
        None => {
            if args.save || args.resume.is_some() {
                bail!("--save and --resume need a database (--db, EXAM_DB_URL or exam.toml)");
            }
            Storage::in_memory()
        }
    };
    let workflow = SessionLoopService::from_storage(Clock::default_clock(), &storage);

    let mut session = workflow
        .start_session(questions, session_config, args.resume)
        .await?;
    apply_answers(&mut session, &entries)?;

    if args.save {
        workflow.save(&session).await?;
        info!(session = %session.id(), "progress saved");
        println!("{}", session.id());
        return Ok(());
    }

    match workflow.finish(&mut session, FinishPolicy::Force).await? {
        FinishOutcome::Completed(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        FinishOutcome::ConfirmationRequired { unanswered } => {
            bail!("session not finished: {unanswered} unanswered question(s)")
        }
    }
}

/// Feed answers into the session. Practice mode submits each answer as it goes.
pub fn apply_answers(session: &mut SessionService, entries: &[AnswerEntry]) -> Result<()> {
    for entry in entries {
        if session.mode() == SessionMode::Assessment {
            session
                .answer(entry.index, entry.answer.clone())
                .with_context(|| format!("answer {}", entry.index))?;
            continue;
        }

        if let Navigation::Denied(denied) = session.jump_to(entry.index)? {
            bail!("answer {}: {denied}", entry.index);
        }
        session
            .answer(entry.index, entry.answer.clone())
            .with_context(|| format!("answer {}", entry.index))?;
        session.submit_current()?;
    }
    Ok(())
}
