use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerDuration, TimerState};

/// Every timer transition produces an Event.
/// The CLI prints them; the backend notifier dispatches on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration: TimerDuration,
        duration_secs: u64,
        chore_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining: TimerDuration,
        remaining_secs: u64,
        chore_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        chore_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerReset {
        chore_id: Option<String>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        duration: TimerDuration,
        remaining_secs: u64,
        chore_id: Option<String>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The chore this event targets, if any.
    pub fn chore_id(&self) -> Option<&str> {
        match self {
            Event::TimerStarted { chore_id, .. }
            | Event::TimerPaused { chore_id, .. }
            | Event::TimerCompleted { chore_id, .. }
            | Event::TimerReset { chore_id, .. }
            | Event::StateSnapshot { chore_id, .. } => chore_id.as_deref(),
        }
    }
}
