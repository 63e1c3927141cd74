//! Countdown clock advanced by an external once-per-second tick source.
//!
//! The timer never schedules anything itself. A caller drives it with `tick()`
//! and reacts to the returned [`TickOutcome`]. `start` and `stop` are idempotent
//! so at most one tick source ever needs to be active.

use thiserror::Error;

use crate::config::TimerConfig;
use crate::model::SessionMode;

/// Remaining-time thresholds that each fire one warning per session.
pub const WARNING_THRESHOLDS_SECS: [u32; 3] = [600, 300, 60];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimerError {
    #[error("timer settings are fixed for this session")]
    Locked,

    #[error("timer settings can only change while the timer is stopped")]
    Running,

    #[error("timer duration must be greater than zero")]
    InvalidDuration,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer disabled or stopped; nothing changed.
    Idle,
    Counting { remaining_secs: u32 },
    Warning { threshold_secs: u32, remaining_secs: u32 },
    /// Clock reached zero. `auto_submit_in` is the grace period left before
    /// auto-submit, or `None` when the session simply continues untimed.
    Expired { auto_submit_in: Option<u32> },
    GracePeriod { remaining_secs: u32 },
    /// The session must be finished now.
    AutoSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Timer {
    enabled: bool,
    running: bool,
    locked: bool,
    auto_submit: bool,
    duration_secs: u32,
    remaining_secs: u32,
    grace_period_secs: u32,
    grace_remaining: Option<u32>,
    warned: [bool; 3],
}

impl Timer {
    /// Enabled, auto-submitting timer whose settings cannot be edited.
    #[must_use]
    pub fn assessment(duration_secs: u32, grace_period_secs: u32) -> Self {
        Self {
            enabled: true,
            running: false,
            locked: true,
            auto_submit: true,
            duration_secs,
            remaining_secs: duration_secs,
            grace_period_secs,
            grace_remaining: None,
            warned: [false; 3],
        }
    }

    /// Practice timer, editable while stopped.
    #[must_use]
    pub fn practice(config: &TimerConfig) -> Self {
        Self {
            enabled: config.enabled,
            running: false,
            locked: false,
            auto_submit: config.auto_submit,
            duration_secs: config.duration_secs,
            remaining_secs: config.duration_secs,
            grace_period_secs: config.grace_period_secs,
            grace_remaining: None,
            warned: [false; 3],
        }
    }

    #[must_use]
    pub fn for_mode(mode: SessionMode, config: &TimerConfig) -> Self {
        match mode {
            SessionMode::Assessment => {
                Self::assessment(config.duration_secs, config.grace_period_secs)
            }
            SessionMode::Practice => Self::practice(config),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn auto_submit(&self) -> bool {
        self.auto_submit
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn in_grace_period(&self) -> bool {
        self.grace_remaining.is_some()
    }

    /// Begin counting. Returns `false` when nothing changed (already running,
    /// disabled, or already run out).
    pub fn start(&mut self) -> bool {
        if self.running || !self.enabled {
            return false;
        }
        if self.remaining_secs == 0 && self.grace_remaining.is_none() {
            return false;
        }
        self.running = true;
        true
    }

    /// Pause counting. Returns `false` when already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Turn the timer on with a fresh duration.
    ///
    /// # Errors
    ///
    /// `Locked` for assessment timers, `Running` while counting,
    /// `InvalidDuration` for a zero duration.
    pub fn enable(&mut self, duration_secs: u32) -> Result<(), TimerError> {
        self.set_duration(duration_secs)?;
        self.enabled = true;
        Ok(())
    }

    /// Turn the timer off; the session continues untimed.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::Locked` for assessment timers.
    pub fn disable(&mut self) -> Result<(), TimerError> {
        if self.locked {
            return Err(TimerError::Locked);
        }
        self.running = false;
        self.enabled = false;
        self.grace_remaining = None;
        Ok(())
    }

    /// Change the duration and reset the countdown.
    ///
    /// # Errors
    ///
    /// Same as [`Timer::enable`].
    pub fn set_duration(&mut self, duration_secs: u32) -> Result<(), TimerError> {
        if self.locked {
            return Err(TimerError::Locked);
        }
        if self.running {
            return Err(TimerError::Running);
        }
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.grace_remaining = None;
        self.warned = [false; 3];
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `TimerError::Locked` for assessment timers.
    pub fn set_auto_submit(&mut self, auto_submit: bool) -> Result<(), TimerError> {
        if self.locked {
            return Err(TimerError::Locked);
        }
        self.auto_submit = auto_submit;
        Ok(())
    }

    /// Resume from a saved clock. Thresholds already passed stay silent.
    pub fn restore_remaining(&mut self, remaining_secs: u32) {
        // A resumed clock keeps at least one tick so expiry still fires.
        self.remaining_secs = remaining_secs.min(self.duration_secs).max(1);
        for (warned, threshold) in self.warned.iter_mut().zip(WARNING_THRESHOLDS_SECS) {
            *warned = self.remaining_secs <= threshold;
        }
    }

    /// Advance the clock by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.enabled || !self.running {
            return TickOutcome::Idle;
        }

        if let Some(grace) = self.grace_remaining {
            let grace = grace.saturating_sub(1);
            if grace == 0 {
                self.grace_remaining = None;
                self.running = false;
                return TickOutcome::AutoSubmit;
            }
            self.grace_remaining = Some(grace);
            return TickOutcome::GracePeriod {
                remaining_secs: grace,
            };
        }

        let previous = self.remaining_secs;
        self.remaining_secs = previous.saturating_sub(1);
        if self.remaining_secs == 0 {
            return self.expire();
        }

        // A countdown that starts exactly on a threshold warns on its first tick.
        let first_tick = previous == self.duration_secs;
        let remaining = self.remaining_secs;
        for (warned, threshold) in self.warned.iter_mut().zip(WARNING_THRESHOLDS_SECS) {
            let crossed = previous > threshold || (first_tick && previous == threshold);
            if !*warned && crossed && remaining <= threshold {
                *warned = true;
                return TickOutcome::Warning {
                    threshold_secs: threshold,
                    remaining_secs: remaining,
                };
            }
        }

        TickOutcome::Counting {
            remaining_secs: remaining,
        }
    }

    fn expire(&mut self) -> TickOutcome {
        if !self.auto_submit {
            self.running = false;
            return TickOutcome::Expired {
                auto_submit_in: None,
            };
        }
        if self.grace_period_secs == 0 {
            self.running = false;
            return TickOutcome::AutoSubmit;
        }
        self.grace_remaining = Some(self.grace_period_secs);
        TickOutcome::Expired {
            auto_submit_in: Some(self.grace_period_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practice_config(duration_secs: u32, auto_submit: bool) -> TimerConfig {
        TimerConfig {
            enabled: true,
            duration_secs,
            grace_period_secs: 0,
            auto_submit,
        }
    }

    fn run_until_not_counting(timer: &mut Timer) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = timer.tick();
            outcomes.push(outcome);
            if !matches!(
                outcome,
                TickOutcome::Counting { .. } | TickOutcome::Warning { .. }
            ) {
                return outcomes;
            }
        }
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut timer = Timer::assessment(60, 0);
        assert!(timer.start());
        assert!(!timer.start());
        assert!(timer.stop());
        assert!(!timer.stop());
    }

    #[test]
    fn stopped_timer_does_not_count() {
        let mut timer = Timer::assessment(60, 0);
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining_secs(), 60);
    }

    #[test]
    fn warnings_fire_once_per_threshold() {
        let mut timer = Timer::assessment(700, 0);
        timer.start();
        let outcomes = run_until_not_counting(&mut timer);
        let warnings: Vec<u32> = outcomes
            .iter()
            .filter_map(|o| match o {
                TickOutcome::Warning { threshold_secs, .. } => Some(*threshold_secs),
                _ => None,
            })
            .collect();
        assert_eq!(warnings, vec![600, 300, 60]);
        assert_eq!(outcomes.last(), Some(&TickOutcome::AutoSubmit));
    }

    #[test]
    fn timer_starting_on_a_threshold_warns_at_once() {
        let mut timer = Timer::assessment(600, 0);
        timer.start();
        assert_eq!(
            timer.tick(),
            TickOutcome::Warning {
                threshold_secs: 600,
                remaining_secs: 599
            }
        );
        let warnings: Vec<u32> = run_until_not_counting(&mut timer)
            .iter()
            .filter_map(|o| match o {
                TickOutcome::Warning { threshold_secs, .. } => Some(*threshold_secs),
                _ => None,
            })
            .collect();
        assert_eq!(warnings, vec![300, 60]);

        let mut short = Timer::assessment(300, 0);
        short.start();
        assert!(matches!(
            short.tick(),
            TickOutcome::Warning {
                threshold_secs: 300,
                ..
            }
        ));
    }

    #[test]
    fn short_timer_skips_thresholds_above_its_duration() {
        let mut timer = Timer::assessment(61, 0);
        timer.start();
        assert_eq!(
            timer.tick(),
            TickOutcome::Warning {
                threshold_secs: 60,
                remaining_secs: 60
            }
        );
    }

    #[test]
    fn assessment_expiry_auto_submits_after_grace() {
        let mut timer = Timer::assessment(2, 2);
        timer.start();
        assert_eq!(timer.tick(), TickOutcome::Counting { remaining_secs: 1 });
        assert_eq!(
            timer.tick(),
            TickOutcome::Expired {
                auto_submit_in: Some(2)
            }
        );
        assert!(timer.in_grace_period());
        assert_eq!(timer.tick(), TickOutcome::GracePeriod { remaining_secs: 1 });
        assert_eq!(timer.tick(), TickOutcome::AutoSubmit);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), TickOutcome::Idle);
    }

    #[test]
    fn practice_expiry_without_auto_submit_freezes_at_zero() {
        let mut timer = Timer::practice(&practice_config(1, false));
        timer.start();
        assert_eq!(
            timer.tick(),
            TickOutcome::Expired {
                auto_submit_in: None
            }
        );
        assert_eq!(timer.remaining_secs(), 0);
        assert!(!timer.is_running());
        assert!(!timer.start());
    }

    #[test]
    fn practice_duration_is_editable_only_while_stopped() {
        let mut timer = Timer::practice(&TimerConfig::default());
        assert!(!timer.is_enabled());
        assert!(!timer.start());

        timer.enable(120).unwrap();
        assert!(timer.start());
        assert_eq!(timer.set_duration(30), Err(TimerError::Running));
        timer.stop();
        timer.set_duration(30).unwrap();
        assert_eq!(timer.remaining_secs(), 30);
        assert_eq!(timer.set_duration(0), Err(TimerError::InvalidDuration));
    }

    #[test]
    fn assessment_settings_are_locked() {
        let mut timer = Timer::assessment(60, 0);
        assert_eq!(timer.set_duration(10), Err(TimerError::Locked));
        assert_eq!(timer.set_auto_submit(false), Err(TimerError::Locked));
        assert_eq!(timer.disable(), Err(TimerError::Locked));
    }

    #[test]
    fn restored_clock_silences_passed_thresholds() {
        let mut timer = Timer::assessment(3600, 0);
        timer.restore_remaining(301);
        timer.start();
        assert_eq!(
            timer.tick(),
            TickOutcome::Warning {
                threshold_secs: 300,
                remaining_secs: 300
            }
        );
    }

    #[test]
    fn restored_zero_clock_still_expires() {
        let mut timer = Timer::assessment(60, 0);
        timer.restore_remaining(0);
        assert!(timer.start());
        assert_eq!(timer.tick(), TickOutcome::AutoSubmit);
    }
}
