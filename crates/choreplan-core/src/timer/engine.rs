//! Countdown timer state machine.
//!
//! The engine holds the duration, the running state and the selected
//! chore. It has no clock of its own: the caller (or a
//! [`TimerService`](crate::timer::TimerService) ticker) invokes
//! `tick()` once per elapsed second while the timer is Running.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> Completed -> Idle
//!          (start)   (pause)   (start)    (tick to 0)  (reset)
//! ```
//!
//! `reset` is accepted from every state; it cancels nothing by itself,
//! so drivers must stop their tick source alongside it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::duration::{TimerDuration, DEFAULT_HOUR_LIMIT};
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Core countdown engine.
///
/// Serializable so the CLI can persist it between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    duration: TimerDuration,
    state: TimerState,
    /// Selected chore, referenced by id (the backend owns the record).
    chore_id: Option<String>,
    #[serde(default = "default_hour_limit")]
    hour_limit: u32,
}

fn default_hour_limit() -> u32 {
    DEFAULT_HOUR_LIMIT
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownTimer {
    /// Create an idle timer with a zero duration and no chore selected.
    pub fn new() -> Self {
        Self {
            duration: TimerDuration::ZERO,
            state: TimerState::Idle,
            chore_id: None,
            hour_limit: DEFAULT_HOUR_LIMIT,
        }
    }

    /// Same, with a raised hour bound for manual entry.
    pub fn with_hour_limit(hour_limit: u32) -> Self {
        Self {
            hour_limit,
            ..Self::new()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> TimerDuration {
        self.duration
    }

    pub fn remaining_secs(&self) -> u64 {
        self.duration.total_seconds()
    }

    pub fn chore_id(&self) -> Option<&str> {
        self.chore_id.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            duration: self.duration,
            remaining_secs: self.remaining_secs(),
            chore_id: self.chore_id.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the stored duration with manually entered fields, each
    /// clamped independently into its bound.
    ///
    /// Silently ignored while Running; returns whether it applied.
    pub fn set_manual_time(&mut self, hours: i64, minutes: i64, seconds: i64) -> bool {
        if self.is_running() {
            return false;
        }
        self.duration = TimerDuration::clamped(hours, minutes, seconds, self.hour_limit);
        true
    }

    /// Select the chore the countdown is tracked against.
    ///
    /// Disabled while Running; returns whether it applied.
    pub fn select_chore(&mut self, chore_id: impl Into<String>) -> bool {
        if self.is_running() {
            return false;
        }
        self.chore_id = Some(chore_id.into());
        true
    }

    /// Start (or resume) the countdown.
    ///
    /// Rejected without a state change when the duration is all-zero,
    /// when no chore is selected, or when already Running.
    pub fn start(&mut self) -> Result<Event, TimerError> {
        if self.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        if self.duration.is_zero() {
            return Err(TimerError::ZeroDuration);
        }
        if self.chore_id.is_none() {
            return Err(TimerError::NoChoreSelected);
        }
        self.state = TimerState::Running;
        Ok(Event::TimerStarted {
            duration: self.duration,
            duration_secs: self.duration.total_seconds(),
            chore_id: self.chore_id.clone(),
            at: Utc::now(),
        })
    }

    /// Pause the countdown. No-op (returns `None`) unless Running, so
    /// pausing twice never emits a second event.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.state = TimerState::Paused;
        Some(Event::TimerPaused {
            remaining: self.duration,
            remaining_secs: self.duration.total_seconds(),
            chore_id: self.chore_id.clone(),
            at: Utc::now(),
        })
    }

    /// Reset to Idle with a zero duration. Accepted from any state; the
    /// chore selection is kept so the reset can be attributed to it.
    pub fn reset(&mut self) -> Event {
        self.duration = TimerDuration::ZERO;
        self.state = TimerState::Idle;
        Event::TimerReset {
            chore_id: self.chore_id.clone(),
            at: Utc::now(),
        }
    }

    /// Consume one second. Only meaningful while Running.
    ///
    /// Returns `Some(Event::TimerCompleted)` exactly once, on the tick
    /// that brings the remaining total to zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let remaining = self.remaining_secs().saturating_sub(1);
        if remaining == 0 {
            self.duration = TimerDuration::ZERO;
            self.state = TimerState::Completed;
            return Some(Event::TimerCompleted {
                chore_id: self.chore_id.clone(),
                at: Utc::now(),
            });
        }
        self.duration = TimerDuration::from_total_seconds(remaining);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running_timer(h: i64, m: i64, s: i64) -> CountdownTimer {
        let mut t = CountdownTimer::new();
        assert!(t.set_manual_time(h, m, s));
        assert!(t.select_chore("T1"));
        t.start().expect("timer should start");
        t
    }

    #[test]
    fn start_requires_nonzero_duration() {
        let mut t = CountdownTimer::new();
        t.select_chore("T1");
        assert!(matches!(t.start(), Err(TimerError::ZeroDuration)));
        assert_eq!(t.state(), TimerState::Idle);
    }

    #[test]
    fn start_requires_a_selected_chore() {
        let mut t = CountdownTimer::new();
        t.set_manual_time(0, 5, 0);
        assert!(matches!(t.start(), Err(TimerError::NoChoreSelected)));
        assert_eq!(t.state(), TimerState::Idle);
    }

    #[test]
    fn start_pause_resume() {
        let mut t = running_timer(0, 1, 0);
        assert_eq!(t.state(), TimerState::Running);

        assert!(t.pause().is_some());
        assert_eq!(t.state(), TimerState::Paused);

        // Pause is idempotent when already paused.
        assert!(t.pause().is_none());
        assert_eq!(t.state(), TimerState::Paused);

        let event = t.start().expect("resume from paused");
        assert_eq!(t.state(), TimerState::Running);
        match event {
            Event::TimerStarted { duration_secs, .. } => assert_eq!(duration_secs, 60),
            other => panic!("expected TimerStarted, got {other:?}"),
        }
    }

    #[test]
    fn tick_decrements_and_renormalizes() {
        let mut t = running_timer(1, 0, 0);
        assert!(t.tick().is_none());
        assert_eq!(
            t.duration(),
            TimerDuration {
                hours: 0,
                minutes: 59,
                seconds: 59
            }
        );
    }

    #[test]
    fn n_ticks_subtract_n_seconds() {
        let mut t = running_timer(0, 2, 30);
        let initial = t.remaining_secs();
        for n in 1..=100u64 {
            assert!(t.tick().is_none());
            assert_eq!(t.remaining_secs(), initial - n);
        }
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn final_tick_completes_with_zero_duration() {
        let mut t = running_timer(0, 0, 1);
        let event = t.tick().expect("completion event");
        match event {
            Event::TimerCompleted { chore_id, .. } => {
                assert_eq!(chore_id.as_deref(), Some("T1"));
            }
            other => panic!("expected TimerCompleted, got {other:?}"),
        }
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.duration(), TimerDuration::ZERO);

        // Completion fires exactly once; later ticks are no-ops.
        assert!(t.tick().is_none());
        assert_eq!(t.state(), TimerState::Completed);
    }

    #[test]
    fn five_second_countdown_scenario() {
        let mut t = CountdownTimer::new();
        t.set_manual_time(0, 0, 5);
        t.select_chore("T1");
        t.start().unwrap();

        let mut completions = 0;
        for _ in 0..5 {
            if t.tick().is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(t.state(), TimerState::Completed);
        assert_eq!(t.duration(), TimerDuration::ZERO);
    }

    #[test]
    fn reset_returns_to_idle_from_any_state() {
        let setups: [fn(&mut CountdownTimer); 3] = [
            |t| drop(t.pause()),
            |t| {
                while t.tick().is_none() {}
            },
            |_t| {},
        ];
        for setup in setups {
            let mut t = running_timer(0, 0, 3);
            setup(&mut t);
            t.reset();
            assert_eq!(t.state(), TimerState::Idle);
            assert_eq!(t.duration(), TimerDuration::ZERO);
            // No tick may fire after a reset.
            assert!(t.tick().is_none());
        }
    }

    #[test]
    fn manual_time_and_chore_selection_locked_while_running() {
        let mut t = running_timer(0, 5, 0);
        assert!(!t.set_manual_time(0, 1, 0));
        assert!(!t.select_chore("T2"));
        assert_eq!(t.remaining_secs(), 300);
        assert_eq!(t.chore_id(), Some("T1"));
    }

    #[test]
    fn manual_time_clamps_out_of_range_fields() {
        let mut t = CountdownTimer::new();
        assert!(t.set_manual_time(25, 70, -5));
        assert_eq!(
            t.duration(),
            TimerDuration {
                hours: 23,
                minutes: 59,
                seconds: 0
            }
        );
    }

    #[test]
    fn start_after_completion_needs_a_new_duration() {
        let mut t = running_timer(0, 0, 1);
        t.tick();
        assert_eq!(t.state(), TimerState::Completed);
        // Duration is zero after completion, so a bare restart is rejected.
        assert!(matches!(t.start(), Err(TimerError::ZeroDuration)));
    }

    #[test]
    fn engine_serializes_for_persistence() {
        let t = running_timer(0, 10, 0);
        let json = serde_json::to_string(&t).unwrap();
        let restored: CountdownTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), TimerState::Running);
        assert_eq!(restored.remaining_secs(), 600);
        assert_eq!(restored.chore_id(), Some("T1"));
    }

    proptest! {
        #[test]
        fn ticks_never_underflow(h in 0i64..=2, m in 0i64..=59, s in 1i64..=59, extra in 0u64..200) {
            let mut t = running_timer(h, m, s);
            let total = t.remaining_secs();
            for _ in 0..(total + extra) {
                t.tick();
            }
            prop_assert_eq!(t.remaining_secs(), 0);
            prop_assert_eq!(t.state(), TimerState::Completed);
        }
    }
}
