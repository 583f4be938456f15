//! Normalized hours/minutes/seconds duration for the countdown timer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hour bound used by the timer display (two-digit clock form).
pub const DEFAULT_HOUR_LIMIT: u32 = 23;

/// A countdown duration, always normalized: minutes and seconds stay
/// below 60 and the total never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerDuration {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimerDuration {
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Build from raw fields, clamping each one independently into its
    /// bound: hours into `[0, hour_limit]`, minutes and seconds into
    /// `[0, 59]`. Negative input clamps to zero; there is no cross-field
    /// overflow (70 minutes becomes 59, not an extra hour).
    pub fn clamped(hours: i64, minutes: i64, seconds: i64, hour_limit: u32) -> Self {
        Self {
            hours: hours.clamp(0, hour_limit as i64) as u32,
            minutes: minutes.clamp(0, 59) as u32,
            seconds: seconds.clamp(0, 59) as u32,
        }
    }

    /// Renormalize a total number of seconds into hours/minutes/seconds.
    pub fn from_total_seconds(total: u64) -> Self {
        Self {
            hours: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamping_is_field_independent() {
        let d = TimerDuration::clamped(25, 70, -5, DEFAULT_HOUR_LIMIT);
        assert_eq!(
            d,
            TimerDuration {
                hours: 23,
                minutes: 59,
                seconds: 0
            }
        );
    }

    #[test]
    fn clamping_respects_a_raised_hour_limit() {
        let d = TimerDuration::clamped(120, 0, 0, 99);
        assert_eq!(d.hours, 99);
    }

    #[test]
    fn display_is_zero_padded() {
        let d = TimerDuration::clamped(1, 2, 3, DEFAULT_HOUR_LIMIT);
        assert_eq!(d.to_string(), "01:02:03");
    }

    proptest! {
        #[test]
        fn clamped_fields_stay_in_bounds(h in -200i64..200, m in -200i64..200, s in -200i64..200) {
            let d = TimerDuration::clamped(h, m, s, DEFAULT_HOUR_LIMIT);
            prop_assert!(d.hours <= DEFAULT_HOUR_LIMIT);
            prop_assert!(d.minutes <= 59);
            prop_assert!(d.seconds <= 59);
        }

        #[test]
        fn total_seconds_roundtrip(total in 0u64..=(24 * 3600)) {
            let d = TimerDuration::from_total_seconds(total);
            prop_assert_eq!(d.total_seconds(), total);
            prop_assert!(d.minutes <= 59);
            prop_assert!(d.seconds <= 59);
        }

        #[test]
        fn in_bounds_input_is_unchanged(h in 0i64..=23, m in 0i64..=59, s in 0i64..=59) {
            let d = TimerDuration::clamped(h, m, s, DEFAULT_HOUR_LIMIT);
            prop_assert_eq!(u64::from(d.hours), h as u64);
            prop_assert_eq!(u64::from(d.minutes), m as u64);
            prop_assert_eq!(u64::from(d.seconds), s as u64);
        }
    }
}
