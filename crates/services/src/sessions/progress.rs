/// Aggregated view of session progress over the live question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// Questions with a non-empty answer.
    pub answered: usize,
    pub submitted: usize,
    pub marked: usize,
    pub current: usize,
}

impl SessionProgress {
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}
