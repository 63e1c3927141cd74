use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-level rule for moving between questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationMode {
    /// Any in-bounds jump.
    #[default]
    Free,
    /// A question opens only after every earlier one is submitted.
    Linear,
    /// Forward only.
    NoBacktrack,
}

/// Why a jump was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    OutOfBounds { len: usize },
    /// Already on the first or last question.
    AtBoundary,
    /// Earliest question before the target that is not yet submitted.
    PendingSubmission { first_pending: usize },
    Backtrack { current: usize },
}

/// A refused jump. Returned as a value; the caller decides how to surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationDenied {
    pub target: usize,
    pub reason: DenialReason,
}

impl fmt::Display for NavigationDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            DenialReason::OutOfBounds { len } => {
                write!(f, "question {} does not exist ({len} questions)", self.target)
            }
            DenialReason::AtBoundary => write!(f, "no question beyond {}", self.target),
            DenialReason::PendingSubmission { first_pending } => write!(
                f,
                "question {} is locked until question {first_pending} is submitted",
                self.target
            ),
            DenialReason::Backtrack { current } => write!(
                f,
                "cannot go back from question {current} to {}",
                self.target
            ),
        }
    }
}

impl NavigationMode {
    /// Validate a jump from `current` to `target`.
    ///
    /// `submitted` is the per-question submission flag list; its length is the
    /// question count.
    ///
    /// # Errors
    ///
    /// Returns `NavigationDenied` describing the violated rule.
    pub fn check(
        self,
        current: usize,
        target: usize,
        submitted: &[bool],
    ) -> Result<(), NavigationDenied> {
        let deny = |reason| Err(NavigationDenied { target, reason });

        if target >= submitted.len() {
            return deny(DenialReason::OutOfBounds {
                len: submitted.len(),
            });
        }
        match self {
            NavigationMode::Free => Ok(()),
            NavigationMode::Linear => match submitted[..target].iter().position(|done| !done) {
                Some(first_pending) => deny(DenialReason::PendingSubmission { first_pending }),
                None => Ok(()),
            },
            NavigationMode::NoBacktrack if target < current => {
                deny(DenialReason::Backtrack { current })
            }
            NavigationMode::NoBacktrack => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_mode_only_checks_bounds() {
        let submitted = [false; 3];
        assert!(NavigationMode::Free.check(2, 0, &submitted).is_ok());
        let denied = NavigationMode::Free.check(0, 3, &submitted).unwrap_err();
        assert_eq!(denied.reason, DenialReason::OutOfBounds { len: 3 });
    }

    #[test]
    fn linear_mode_requires_earlier_submissions() {
        let submitted = [true, false, false];
        assert!(NavigationMode::Linear.check(0, 1, &submitted).is_ok());
        let denied = NavigationMode::Linear.check(1, 2, &submitted).unwrap_err();
        assert_eq!(
            denied.reason,
            DenialReason::PendingSubmission { first_pending: 1 }
        );
        assert!(NavigationMode::Linear.check(1, 0, &submitted).is_ok());
    }

    #[test]
    fn no_backtrack_refuses_earlier_indices() {
        let submitted = [false; 4];
        assert!(NavigationMode::NoBacktrack.check(0, 3, &submitted).is_ok());
        let denied = NavigationMode::NoBacktrack.check(2, 0, &submitted).unwrap_err();
        assert_eq!(denied.reason, DenialReason::Backtrack { current: 2 });
        assert_eq!(denied.to_string(), "cannot go back from question 2 to 0");
    }
}
