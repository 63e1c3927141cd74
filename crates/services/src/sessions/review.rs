//! Wrong-answer review, retry, and mark-for-review notes.

use exam_core::model::SessionStatus;
use tracing::debug;

use super::service::SessionService;
use crate::error::SessionError;

impl SessionService {
    /// Full-list indices of submitted questions that scored below their maximum.
    #[must_use]
    pub fn wrong_answers(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_wrong())
            .map(|(i, _)| i)
            .collect()
    }

    /// Switch the live list between all questions and the wrong-answer subset.
    ///
    /// Returns whether the filter is on afterwards. With no wrong answers the
    /// list stays unfiltered. The current index resets to 0 whenever the list
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` before the session has started.
    pub fn toggle_wrong_answer_view(&mut self) -> Result<bool, SessionError> {
        if self.status() == SessionStatus::NotStarted {
            return Err(self.invalid_state());
        }

        if self.view.take().is_some() {
            self.current = 0;
            return Ok(false);
        }
        let wrong = self.wrong_answers();
        if wrong.is_empty() {
            return Ok(false);
        }
        debug!(session = %self.id(), wrong = wrong.len(), "wrong-answer view on");
        self.view = Some(wrong);
        self.current = 0;
        Ok(true)
    }

    /// Reset every wrong answer so it can be attempted again.
    ///
    /// Leaves the filter view, then jumps straight to the first reset question
    /// without consulting the navigation mode. Returns the reset full-list
    /// indices.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is `InProgress`.
    pub fn retry_wrong_answers(&mut self) -> Result<Vec<usize>, SessionError> {
        self.require(SessionStatus::InProgress)?;

        let wrong = self.wrong_answers();
        self.clear_view();
        for &i in &wrong {
            self.slots[i].reset();
        }
        if let Some(&first) = wrong.first() {
            self.current = first;
        }
        debug!(session = %self.id(), reset = wrong.len(), "retrying wrong answers");
        Ok(wrong)
    }

    /// # Errors
    ///
    /// `InvalidState` unless `InProgress`, `IndexOutOfRange` for a bad index.
    pub fn mark_for_review(&mut self, index: usize) -> Result<(), SessionError> {
        let i = self.editable(index)?;
        self.slots[i].marked = true;
        Ok(())
    }

    /// Remove the mark and its note.
    ///
    /// # Errors
    ///
    /// Same as [`SessionService::mark_for_review`].
    pub fn unmark(&mut self, index: usize) -> Result<(), SessionError> {
        let i = self.editable(index)?;
        self.slots[i].marked = false;
        self.slots[i].note = None;
        Ok(())
    }

    /// Attach a note, marking the question. Blank text removes the note but
    /// keeps the mark.
    ///
    /// # Errors
    ///
    /// Same as [`SessionService::mark_for_review`].
    pub fn set_note(&mut self, index: usize, text: &str) -> Result<(), SessionError> {
        let i = self.editable(index)?;
        let slot = &mut self.slots[i];
        slot.marked = true;
        let text = text.trim();
        slot.note = (!text.is_empty()).then(|| text.to_owned());
        Ok(())
    }

    fn editable(&self, index: usize) -> Result<usize, SessionError> {
        self.require(SessionStatus::InProgress)?;
        self.resolve(index)
    }
}
