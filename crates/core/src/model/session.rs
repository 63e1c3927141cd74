use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

use crate::model::{AnswerValue, Question, QuestionId};

//
// ─── MODE & STATUS ─────────────────────────────────────────────────────────────
//

/// How answers are scored during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Per-question submission with immediate feedback.
    #[default]
    Practice,
    /// Answers are collected and scored together by `finish`.
    Assessment,
}

impl SessionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Practice => "practice",
            SessionMode::Assessment => "assessment",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::NotStarted => "not-started",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
        })
    }
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot holds {found} entries but the bank has {expected} questions")]
    LengthMismatch { expected: usize, found: usize },

    #[error("snapshot references unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("snapshot index {index} is out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("question {index} has a score but was never submitted")]
    ScoreWithoutSubmission { index: usize },

    #[error("answer {index} does not match its question type")]
    AnswerShape { index: usize },

    #[error("assessment question {index} is scored before the session finished")]
    ScoredBeforeFinish { index: usize },
}

/// Serializable capture of session state for save-and-resume.
///
/// Indices always refer to the full question list, never a filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub index: usize,
    pub answers: Vec<AnswerValue>,
    pub scores: Vec<Option<u32>>,
    pub submitted: Vec<bool>,
    #[serde(default)]
    pub marked: BTreeSet<usize>,
    #[serde(default)]
    pub notes: BTreeMap<usize, String>,
    pub timestamp: DateTime<Utc>,
    /// Question order at save time; lets shuffled sessions resume in the same order.
    #[serde(default)]
    pub question_ids: Vec<QuestionId>,
    #[serde(default)]
    pub remaining_secs: Option<u32>,
    /// Countdown length at save time. Lets a practice timer switched on
    /// mid-session come back with its clock.
    #[serde(default)]
    pub timer_duration_secs: Option<u32>,
    #[serde(default)]
    pub timer_auto_submit: Option<bool>,
}

impl SessionSnapshot {
    /// Reorder a freshly loaded bank into the order the snapshot was taken in.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::LengthMismatch` when any array disagrees with the
    /// bank size, or `SnapshotError::UnknownQuestion` when a saved id is missing.
    pub fn align(&self, questions: Vec<Question>) -> Result<Vec<Question>, SnapshotError> {
        let expected = questions.len();
        let lengths = [
            self.answers.len(),
            self.scores.len(),
            self.submitted.len(),
        ];
        if let Some(found) = lengths.into_iter().find(|len| *len != expected) {
            return Err(SnapshotError::LengthMismatch { expected, found });
        }
        if self.question_ids.is_empty() {
            return Ok(questions);
        }
        if self.question_ids.len() != expected {
            return Err(SnapshotError::LengthMismatch {
                expected,
                found: self.question_ids.len(),
            });
        }

        let mut by_id: HashMap<QuestionId, Question> =
            questions.into_iter().map(|q| (q.id(), q)).collect();
        self.question_ids
            .iter()
            .map(|id| by_id.remove(id).ok_or(SnapshotError::UnknownQuestion(*id)))
            .collect()
    }

    /// Check internal consistency against an already aligned question list.
    ///
    /// Assessment sessions score nothing before `finish`, so any score or
    /// submission in an assessment snapshot is rejected.
    ///
    /// # Errors
    ///
    /// Returns the first `SnapshotError` found.
    pub fn validate(
        &self,
        questions: &[Question],
        mode: SessionMode,
    ) -> Result<(), SnapshotError> {
        let len = questions.len();
        if self.index >= len {
            return Err(SnapshotError::IndexOutOfRange {
                index: self.index,
                len,
            });
        }
        if let Some(&index) = self
            .marked
            .iter()
            .chain(self.notes.keys())
            .find(|i| **i >= len)
        {
            return Err(SnapshotError::IndexOutOfRange { index, len });
        }
        for (index, question) in questions.iter().enumerate() {
            if mode == SessionMode::Assessment
                && (self.scores[index].is_some() || self.submitted[index])
            {
                return Err(SnapshotError::ScoredBeforeFinish { index });
            }
            if self.scores[index].is_some() && !self.submitted[index] {
                return Err(SnapshotError::ScoreWithoutSubmission { index });
            }
            if !self.answers[index].fits(question.question_type()) {
                return Err(SnapshotError::AnswerShape { index });
            }
        }
        Ok(())
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Aggregate emitted once when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Percentage of the achievable points, rounded to the nearest integer.
    pub score: u32,
    pub total_questions: usize,
    /// Sum of awarded points.
    pub correct_answers: u32,
    pub max_score: u32,
    pub time_spent_secs: u64,
    pub completed_at: DateTime<Utc>,
    pub answered_count: usize,
    pub mode: SessionMode,
}

impl SessionResult {
    #[must_use]
    pub fn new(
        mode: SessionMode,
        total_questions: usize,
        answered_count: usize,
        correct_answers: u32,
        max_score: u32,
        time_spent_secs: u64,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            score: percentage(correct_answers, max_score),
            total_questions,
            correct_answers,
            max_score,
            time_spent_secs,
            completed_at,
            answered_count,
            mode,
        }
    }
}

fn percentage(points: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    let scaled = (u64::from(points) * 100 + u64::from(max) / 2) / u64::from(max);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
