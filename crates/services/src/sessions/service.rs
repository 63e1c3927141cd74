use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use exam_core::config::SessionConfig;
use exam_core::model::{
    AnswerValue, Question, QuestionBody, QuestionType, SessionId, SessionMode, SessionResult,
    SessionSnapshot, SessionStatus,
};
use exam_core::navigation::{DenialReason, NavigationDenied, NavigationMode};
use exam_core::scoring::{self, Grade};
use exam_core::time::elapsed_secs;
use exam_core::timer::{TickOutcome, Timer};

use super::completion::CompletionListener;
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Outcome of `submit_current`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Graded {
        index: usize,
        grade: Grade,
        explanation: Option<String>,
    },
    /// The question was submitted earlier; nothing changed.
    AlreadySubmitted { index: usize },
}

/// Whether `finish` should stop for unanswered questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishPolicy {
    RequireConfirmation,
    Force,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// Nothing changed; call again with `FinishPolicy::Force` to proceed.
    ConfirmationRequired { unanswered: usize },
    Completed(SessionResult),
}

/// Outcome of a navigation request. A denial leaves the index unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: usize, to: usize },
    Denied(NavigationDenied),
}

impl Navigation {
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Navigation::Denied(_))
    }
}

/// What one timer tick did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Set when the tick auto-submitted the session.
    pub completion: Option<SessionResult>,
}

//
// ─── SLOT ──────────────────────────────────────────────────────────────────────
//

/// Per-question state, one per question, so answers, scores and submission
/// flags can never diverge in length.
#[derive(Debug, Clone)]
pub(super) struct Slot {
    pub(super) question: Question,
    pub(super) answer: AnswerValue,
    pub(super) score: Option<u32>,
    pub(super) submitted: bool,
    pub(super) marked: bool,
    pub(super) note: Option<String>,
}

impl Slot {
    fn fresh(question: Question) -> Self {
        let answer = AnswerValue::empty_for(question.question_type());
        Self {
            question,
            answer,
            score: None,
            submitted: false,
            marked: false,
            note: None,
        }
    }

    pub(super) fn reset(&mut self) {
        self.answer = AnswerValue::empty_for(self.question.question_type());
        self.score = None;
        self.submitted = false;
    }

    pub(super) fn is_wrong(&self) -> bool {
        scoring::is_wrong(&self.question, self.score, self.submitted)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory test session: the single owner of all session state.
///
/// Indices passed to and returned from the public API refer to the live
/// question list, which is the wrong-answer subset while the filter view is
/// on. Snapshots always use full-list indices.
pub struct SessionService {
    id: SessionId,
    config: SessionConfig,
    status: SessionStatus,
    pub(super) slots: Vec<Slot>,
    pub(super) current: usize,
    /// Full-list indices shown while the wrong-answer view is on.
    pub(super) view: Option<Vec<usize>>,
    timer: Timer,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<SessionResult>,
    result_id: Option<i64>,
    listener: Option<Arc<dyn CompletionListener>>,
}

impl SessionService {
    /// Create a session over an ordered question list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided and
    /// `SessionError::Config` if the configuration is out of bounds.
    pub fn new(
        id: SessionId,
        questions: Vec<Question>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let config = config.validate()?;
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let timer = Timer::for_mode(config.mode, &config.timer);
        Ok(Self {
            id,
            config,
            status: SessionStatus::NotStarted,
            slots: questions.into_iter().map(Slot::fresh).collect(),
            current: 0,
            view: None,
            timer,
            started_at: None,
            completed_at: None,
            result: None,
            result_id: None,
            listener: None,
        })
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn CompletionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Arc<dyn CompletionListener>) {
        self.listener = Some(listener);
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Move to `InProgress`, optionally restoring a snapshot.
    ///
    /// A restore reorders the questions by the snapshot's saved ids. Shuffling
    /// applies only to fresh sessions. Assessment sessions start their timer.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is `NotStarted`
    /// - `RestoreMismatch` when the snapshot size differs from the question list
    /// - `InvalidSnapshot` when the snapshot is internally inconsistent
    pub fn start(
        &mut self,
        snapshot: Option<&SessionSnapshot>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.require(SessionStatus::NotStarted)?;

        match snapshot {
            Some(snapshot) => self.restore(snapshot)?,
            None => {
                if self.config.shuffle_questions {
                    self.slots.shuffle(&mut rand::rng());
                }
            }
        }

        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        if self.timer.is_enabled() {
            self.timer.start();
        }

        info!(
            session = %self.id,
            mode = %self.config.mode,
            questions = self.slots.len(),
            restored = snapshot.is_some(),
            "session started"
        );
        Ok(())
    }

    fn restore(&mut self, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
        let questions: Vec<Question> = self.slots.iter().map(|s| s.question.clone()).collect();
        let questions = snapshot.align(questions)?;
        snapshot.validate(&questions, self.config.mode)?;

        self.slots = questions
            .into_iter()
            .enumerate()
            .map(|(i, question)| Slot {
                question,
                answer: snapshot.answers[i].clone(),
                score: snapshot.scores[i],
                submitted: snapshot.submitted[i],
                marked: snapshot.marked.contains(&i) || snapshot.notes.contains_key(&i),
                note: snapshot.notes.get(&i).cloned(),
            })
            .collect();
        self.current = snapshot.index;

        self.restore_timer(snapshot)?;
        Ok(())
    }

    /// Bring back the clock as saved. An unlocked timer also takes the saved
    /// on/off state, duration and auto-submit flag, since those can change
    /// mid-session.
    fn restore_timer(&mut self, snapshot: &SessionSnapshot) -> Result<(), SessionError> {
        let Some(remaining) = snapshot.remaining_secs else {
            if !self.timer.is_locked() && self.timer.is_enabled() {
                self.timer.disable()?;
            }
            return Ok(());
        };

        if !self.timer.is_locked() {
            let duration = snapshot
                .timer_duration_secs
                .or_else(|| (!self.timer.is_enabled()).then_some(remaining));
            if let Some(duration) = duration
                && duration > 0
            {
                self.timer.enable(duration)?;
            }
            if let Some(auto_submit) = snapshot.timer_auto_submit {
                self.timer.set_auto_submit(auto_submit)?;
            }
        }
        if self.timer.is_enabled() {
            self.timer.restore_remaining(remaining);
        }
        Ok(())
    }

    /// End the session.
    ///
    /// Assessment mode scores every question here, all at once. Practice mode
    /// keeps the scores earned through `submit_current`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is `InProgress`.
    pub fn finish(
        &mut self,
        now: DateTime<Utc>,
        policy: FinishPolicy,
    ) -> Result<FinishOutcome, SessionError> {
        self.require(SessionStatus::InProgress)?;

        let unanswered = self.slots.iter().filter(|s| s.answer.is_empty()).count();
        if policy == FinishPolicy::RequireConfirmation && unanswered > 0 {
            return Ok(FinishOutcome::ConfirmationRequired { unanswered });
        }

        Ok(FinishOutcome::Completed(self.complete(now)))
    }

    fn complete(&mut self, now: DateTime<Utc>) -> SessionResult {
        self.clear_view();

        if self.config.mode == SessionMode::Assessment {
            for slot in &mut self.slots {
                slot.score = Some(scoring::score(&slot.question, &slot.answer));
                slot.submitted = true;
            }
        }

        let correct: u32 = self.slots.iter().filter_map(|s| s.score).sum();
        let max: u32 = self
            .slots
            .iter()
            .map(|s| scoring::max_points(&s.question))
            .sum();
        let answered = self.slots.iter().filter(|s| !s.answer.is_empty()).count();
        let time_spent = self
            .started_at
            .map_or(0, |started| elapsed_secs(started, now));

        let result = SessionResult::new(
            self.config.mode,
            self.slots.len(),
            answered,
            correct,
            max,
            time_spent,
            now,
        );

        self.timer.stop();
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
        self.result = Some(result.clone());

        info!(
            session = %self.id,
            score = result.score,
            points = result.correct_answers,
            max_points = result.max_score,
            "session completed"
        );
        if let Some(listener) = &self.listener {
            listener.on_complete(self.id, &result);
        }
        result
    }

    /// Advance the timer by one second, auto-submitting on expiry when configured.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickReport {
        if self.status != SessionStatus::InProgress {
            return TickReport {
                outcome: TickOutcome::Idle,
                completion: None,
            };
        }

        let outcome = self.timer.tick();
        let mut completion = None;
        match outcome {
            TickOutcome::Warning {
                threshold_secs,
                remaining_secs,
            } => info!(session = %self.id, threshold_secs, remaining_secs, "time warning"),
            TickOutcome::Expired { auto_submit_in } => {
                info!(session = %self.id, ?auto_submit_in, "time expired");
            }
            TickOutcome::AutoSubmit => {
                info!(session = %self.id, "auto-submitting session");
                completion = Some(self.complete(now));
            }
            TickOutcome::Idle | TickOutcome::Counting { .. } | TickOutcome::GracePeriod { .. } => {}
        }
        TickReport {
            outcome,
            completion,
        }
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Replace the answer at `index`.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is `InProgress`
    /// - `IndexOutOfRange` for an index past the live list
    /// - `AnswerTypeMismatch` when the value does not fit the question type
    /// - `AlreadySubmitted` once the question has been submitted
    pub fn answer(&mut self, index: usize, value: AnswerValue) -> Result<(), SessionError> {
        self.require(SessionStatus::InProgress)?;
        let slot_index = self.resolve(index)?;
        let slot = &mut self.slots[slot_index];

        let expected = slot.question.question_type();
        if !value.fits(expected) {
            return Err(SessionError::AnswerTypeMismatch { expected });
        }
        if slot.submitted {
            return Err(SessionError::AlreadySubmitted { index });
        }
        slot.answer = value;
        Ok(())
    }

    /// Select or deselect an option of the current multiple-choice question.
    ///
    /// # Errors
    ///
    /// `UnknownOption` for a label the question does not offer, otherwise as
    /// [`SessionService::answer`].
    pub fn toggle_choice(&mut self, label: &str) -> Result<(), SessionError> {
        let mut selected = match self.current_answer_for(QuestionType::MultipleChoice)? {
            AnswerValue::ChoiceSet(selected) => selected.clone(),
            _ => BTreeSet::new(),
        };
        if let Some(QuestionBody::MultipleChoice { options }) = self.current_body() {
            let labels: Vec<String> = options.iter().map(|o| o.label.clone()).collect();
            if !contains(&labels, label) {
                return Err(SessionError::UnknownOption(label.to_owned()));
            }
        }
        let label = label.trim().to_owned();
        if !selected.remove(&label) {
            selected.insert(label);
        }
        self.answer(self.current, AnswerValue::ChoiceSet(selected))
    }

    /// Set the value for one hotspot label. An empty value clears it.
    ///
    /// # Errors
    ///
    /// `UnknownZone` for a label the question does not define, otherwise as
    /// [`SessionService::answer`].
    pub fn set_hotspot(&mut self, label: &str, value: &str) -> Result<(), SessionError> {
        let mut map = match self.current_answer_for(QuestionType::Hotspot)? {
            AnswerValue::LabelMap(map) => map.clone(),
            _ => BTreeMap::new(),
        };
        if let Some(QuestionBody::Hotspot { labels, .. }) = self.current_body()
            && !contains(labels, label)
        {
            return Err(SessionError::UnknownZone(label.to_owned()));
        }

        if value.trim().is_empty() {
            map.remove(label);
        } else {
            map.insert(label.to_owned(), value.trim().to_owned());
        }
        self.answer(self.current, AnswerValue::LabelMap(map))
    }

    /// Drop `item` into `zone` on the current drag-and-drop question.
    ///
    /// # Errors
    ///
    /// `UnknownItem` / `UnknownZone` for names the question does not define,
    /// otherwise as [`SessionService::answer`].
    pub fn assign_item(&mut self, item: &str, zone: &str) -> Result<(), SessionError> {
        let mut map = self.current_item_map()?;
        if let Some(QuestionBody::DragAndDrop { items, zones }) = self.current_body() {
            if !contains(items, item) {
                return Err(SessionError::UnknownItem(item.to_owned()));
            }
            if !contains(zones, zone) {
                return Err(SessionError::UnknownZone(zone.to_owned()));
            }
        }
        map.insert(item.to_owned(), zone.to_owned());
        self.answer(self.current, AnswerValue::ItemZoneMap(map))
    }

    /// Take `item` back out of whatever zone holds it.
    ///
    /// # Errors
    ///
    /// Same as [`SessionService::answer`].
    pub fn unassign_item(&mut self, item: &str) -> Result<(), SessionError> {
        let mut map = self.current_item_map()?;
        map.remove(item);
        self.answer(self.current, AnswerValue::ItemZoneMap(map))
    }

    fn current_item_map(&self) -> Result<BTreeMap<String, String>, SessionError> {
        Ok(match self.current_answer_for(QuestionType::DragAndDrop)? {
            AnswerValue::ItemZoneMap(map) => map.clone(),
            _ => BTreeMap::new(),
        })
    }

    fn current_answer_for(&self, expected: QuestionType) -> Result<&AnswerValue, SessionError> {
        self.require(SessionStatus::InProgress)?;
        let slot = &self.slots[self.resolve(self.current)?];
        if slot.question.question_type() != expected {
            return Err(SessionError::AnswerTypeMismatch {
                expected: slot.question.question_type(),
            });
        }
        Ok(&slot.answer)
    }

    fn current_body(&self) -> Option<&QuestionBody> {
        self.current_question().map(Question::body)
    }

    /// Score the current question and lock it (practice mode).
    ///
    /// Submitting twice is a no-op that reports `Submission::AlreadySubmitted`.
    ///
    /// # Errors
    ///
    /// `PracticeOnly` in assessment mode, `InvalidState` unless `InProgress`.
    pub fn submit_current(&mut self) -> Result<Submission, SessionError> {
        self.require(SessionStatus::InProgress)?;
        if self.config.mode != SessionMode::Practice {
            return Err(SessionError::PracticeOnly);
        }

        let index = self.current;
        let slot_index = self.resolve(index)?;
        let slot = &mut self.slots[slot_index];
        if slot.submitted {
            return Ok(Submission::AlreadySubmitted { index });
        }

        let grade = scoring::grade(&slot.question, &slot.answer);
        slot.score = Some(grade.points);
        slot.submitted = true;
        debug!(
            session = %self.id,
            question = %slot.question.id(),
            points = grade.points,
            max_points = grade.max_points,
            "question submitted"
        );
        Ok(Submission::Graded {
            index,
            grade,
            explanation: slot.question.explanation().map(str::to_owned),
        })
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Move to `index` if the navigation mode allows it.
    ///
    /// Once completed, the session can be browsed freely.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` before the session has started.
    pub fn jump_to(&mut self, index: usize) -> Result<Navigation, SessionError> {
        if self.status == SessionStatus::NotStarted {
            return Err(self.invalid_state());
        }
        let mode = match self.status {
            SessionStatus::InProgress => self.config.navigation,
            _ => NavigationMode::Free,
        };

        let from = self.current;
        if let Err(denied) = mode.check(from, index, &self.submitted()) {
            debug!(session = %self.id, from, to = index, reason = ?denied.reason, "navigation denied");
            return Ok(Navigation::Denied(denied));
        }
        self.current = index;
        Ok(Navigation::Moved { from, to: index })
    }

    /// # Errors
    ///
    /// Same as [`SessionService::jump_to`].
    pub fn next(&mut self) -> Result<Navigation, SessionError> {
        if self.current + 1 >= self.len() {
            return self.at_boundary();
        }
        self.jump_to(self.current + 1)
    }

    /// # Errors
    ///
    /// Same as [`SessionService::jump_to`].
    pub fn previous(&mut self) -> Result<Navigation, SessionError> {
        if self.current == 0 {
            return self.at_boundary();
        }
        self.jump_to(self.current - 1)
    }

    fn at_boundary(&self) -> Result<Navigation, SessionError> {
        if self.status == SessionStatus::NotStarted {
            return Err(self.invalid_state());
        }
        Ok(Navigation::Denied(NavigationDenied {
            target: self.current,
            reason: DenialReason::AtBoundary,
        }))
    }

    //
    // ─── TIMER CONTROLS ────────────────────────────────────────────────────────
    //

    /// Returns `false` if the timer was already running or cannot run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is `InProgress`.
    pub fn start_timer(&mut self) -> Result<bool, SessionError> {
        self.require(SessionStatus::InProgress)?;
        Ok(self.timer.start())
    }

    pub fn stop_timer(&mut self) -> bool {
        self.timer.stop()
    }

    /// # Errors
    ///
    /// Returns `SessionError::Timer` for locked or running timers.
    pub fn enable_timer(&mut self, duration_secs: u32) -> Result<(), SessionError> {
        Ok(self.timer.enable(duration_secs)?)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Timer` for locked timers.
    pub fn disable_timer(&mut self) -> Result<(), SessionError> {
        Ok(self.timer.disable()?)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Timer` for locked or running timers.
    pub fn set_timer_duration(&mut self, duration_secs: u32) -> Result<(), SessionError> {
        Ok(self.timer.set_duration(duration_secs)?)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Timer` for locked timers.
    pub fn set_auto_submit(&mut self, auto_submit: bool) -> Result<(), SessionError> {
        Ok(self.timer.set_auto_submit(auto_submit)?)
    }

    //
    // ─── SNAPSHOT ──────────────────────────────────────────────────────────────
    //

    /// Capture the full session state for save-and-resume.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let index = match &self.view {
            Some(view) => view.get(self.current).copied().unwrap_or(0),
            None => self.current,
        };
        SessionSnapshot {
            index,
            answers: self.slots.iter().map(|s| s.answer.clone()).collect(),
            scores: self.slots.iter().map(|s| s.score).collect(),
            submitted: self.slots.iter().map(|s| s.submitted).collect(),
            marked: self
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.marked)
                .map(|(i, _)| i)
                .collect(),
            notes: self
                .slots
                .iter()
                .enumerate()
                .filter_map(|(i, s)| s.note.clone().map(|note| (i, note)))
                .collect(),
            timestamp: now,
            question_ids: self.slots.iter().map(|s| s.question.id()).collect(),
            remaining_secs: self
                .timer
                .is_enabled()
                .then(|| self.timer.remaining_secs()),
            timer_duration_secs: self
                .timer
                .is_enabled()
                .then(|| self.timer.duration_secs()),
            timer_auto_submit: self
                .timer
                .is_enabled()
                .then(|| self.timer.auto_submit()),
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.config.mode
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn result_id(&self) -> Option<i64> {
        self.result_id
    }

    pub(crate) fn set_result_id(&mut self, id: i64) {
        self.result_id = Some(id);
    }

    /// Length of the live question list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.view.as_ref().map_or(self.slots.len(), Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.view.is_some()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.live().get(self.current).copied().map(|s| &s.question)
    }

    #[must_use]
    pub fn questions(&self) -> Vec<&Question> {
        self.live().into_iter().map(|s| &s.question).collect()
    }

    #[must_use]
    pub fn answers(&self) -> Vec<&AnswerValue> {
        self.live().into_iter().map(|s| &s.answer).collect()
    }

    #[must_use]
    pub fn scores(&self) -> Vec<Option<u32>> {
        self.live().into_iter().map(|s| s.score).collect()
    }

    #[must_use]
    pub fn submitted(&self) -> Vec<bool> {
        self.live().into_iter().map(|s| s.submitted).collect()
    }

    /// Live indices marked for review.
    #[must_use]
    pub fn marked(&self) -> BTreeSet<usize> {
        self.live()
            .into_iter()
            .enumerate()
            .filter(|(_, s)| s.marked)
            .map(|(i, _)| i)
            .collect()
    }

    #[must_use]
    pub fn notes(&self) -> BTreeMap<usize, &str> {
        self.live()
            .into_iter()
            .enumerate()
            .filter_map(|(i, s)| s.note.as_deref().map(|note| (i, note)))
            .collect()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let live = self.live();
        SessionProgress {
            total: live.len(),
            answered: live.iter().filter(|s| !s.answer.is_empty()).count(),
            submitted: live.iter().filter(|s| s.submitted).count(),
            marked: live.iter().filter(|s| s.marked).count(),
            current: self.current,
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    pub(super) fn live(&self) -> Vec<&Slot> {
        match &self.view {
            Some(view) => view.iter().map(|&i| &self.slots[i]).collect(),
            None => self.slots.iter().collect(),
        }
    }

    /// Map a live index to its position in the full list.
    pub(super) fn resolve(&self, index: usize) -> Result<usize, SessionError> {
        let resolved = match &self.view {
            Some(view) => view.get(index).copied(),
            None => (index < self.slots.len()).then_some(index),
        };
        resolved.ok_or(SessionError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub(super) fn clear_view(&mut self) {
        if let Some(view) = self.view.take() {
            self.current = view.get(self.current).copied().unwrap_or(0);
        }
    }

    pub(super) fn require(&self, status: SessionStatus) -> Result<(), SessionError> {
        if self.status == status {
            Ok(())
        } else {
            Err(self.invalid_state())
        }
    }

    pub(super) fn invalid_state(&self) -> SessionError {
        SessionError::InvalidState {
            status: self.status,
        }
    }
}

fn contains(names: &[String], name: &str) -> bool {
    names.is_empty() || names.iter().any(|n| n.trim().eq_ignore_ascii_case(name.trim()))
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("id", &self.id)
            .field("mode", &self.config.mode)
            .field("status", &self.status)
            .field("questions_len", &self.slots.len())
            .field("current", &self.current)
            .field("filtered", &self.view.is_some())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .field("result_id", &self.result_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
