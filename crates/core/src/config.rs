use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SessionMode;
use crate::navigation::NavigationMode;

/// Longest allowed countdown (24 hours).
pub const MAX_DURATION_SECS: u32 = 86_400;
/// Longest allowed grace period after expiry (10 minutes).
pub const MAX_GRACE_PERIOD_SECS: u32 = 600;

/// Default assessment length (1 hour).
pub const DEFAULT_ASSESSMENT_SECS: u32 = 3_600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionConfigError {
    #[error("assessment sessions need a timer duration greater than zero")]
    MissingAssessmentDuration,

    #[error("timer duration must be at most 86400 seconds, got {0}")]
    DurationTooLong(u32),

    #[error("grace period must be at most 600 seconds, got {0}")]
    GracePeriodTooLong(u32),

    #[error("linear navigation needs practice mode; assessment answers are only submitted at finish")]
    LinearAssessment,
}

/// Countdown settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub enabled: bool,
    pub duration_secs: u32,
    pub grace_period_secs: u32,
    pub auto_submit: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_secs: DEFAULT_ASSESSMENT_SECS,
            grace_period_secs: 0,
            auto_submit: false,
        }
    }
}

/// Per-session configuration.
///
/// Deserializes from a `[session]` table; call [`SessionConfig::validate`]
/// before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub navigation: NavigationMode,
    pub timer: TimerConfig,
    pub shuffle_questions: bool,
}

impl SessionConfig {
    /// Practice session, free navigation, no timer.
    #[must_use]
    pub fn practice() -> Self {
        Self::default()
    }

    /// Assessment session with a fixed countdown.
    #[must_use]
    pub fn assessment(duration_secs: u32) -> Self {
        Self {
            mode: SessionMode::Assessment,
            timer: TimerConfig {
                enabled: true,
                duration_secs,
                grace_period_secs: 0,
                auto_submit: true,
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_navigation(mut self, navigation: NavigationMode) -> Self {
        self.navigation = navigation;
        self
    }

    #[must_use]
    pub fn with_grace_period(mut self, grace_period_secs: u32) -> Self {
        self.timer.grace_period_secs = grace_period_secs;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }

    /// Check bounds and normalize mode-dependent settings.
    ///
    /// Assessment mode always runs an enabled, auto-submitting timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionConfigError` when a bound is violated.
    pub fn validate(mut self) -> Result<Self, SessionConfigError> {
        if self.timer.duration_secs > MAX_DURATION_SECS {
            return Err(SessionConfigError::DurationTooLong(self.timer.duration_secs));
        }
        if self.timer.grace_period_secs > MAX_GRACE_PERIOD_SECS {
            return Err(SessionConfigError::GracePeriodTooLong(
                self.timer.grace_period_secs,
            ));
        }
        if self.mode == SessionMode::Assessment {
            if self.timer.duration_secs == 0 {
                return Err(SessionConfigError::MissingAssessmentDuration);
            }
            if self.navigation == NavigationMode::Linear {
                return Err(SessionConfigError::LinearAssessment);
            }
            self.timer.enabled = true;
            self.timer.auto_submit = true;
        } else if self.timer.duration_secs == 0 {
            self.timer.enabled = false;
        }
        Ok(self)
    }
}
