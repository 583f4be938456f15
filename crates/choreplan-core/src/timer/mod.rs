mod duration;
mod engine;
mod notifier;
mod service;

pub use duration::{TimerDuration, DEFAULT_HOUR_LIMIT};
pub use engine::{CountdownTimer, TimerState};
pub use notifier::{
    dispatch, fetch_timer, save_timer, BackendNotifier, NoopNotifier, SavedTimer, TimerNotifier,
};
pub use service::TimerService;
