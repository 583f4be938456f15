//! Live timer driver: one-second ticking plus backend sync.
//!
//! `TimerService` wraps the engine with the runtime concerns the state
//! machine itself stays free of: the repeating tick task, its
//! cancellation on pause/reset/completion/teardown, and fire-and-forget
//! dispatch of every transition to the notifier.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::engine::{CountdownTimer, TimerState};
use super::notifier::{self, TimerNotifier};
use crate::error::TimerError;
use crate::events::Event;

/// Cancellable handle to the repeating tick task. Dropping it aborts
/// the task, so a service can never leak a ticker.
struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Wait for the tick task to finish on its own.
    async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// Drives a [`CountdownTimer`] with a real one-second tick.
///
/// At most one tick task exists per service; `start` cancels any
/// previous one before spawning. Must be used inside a tokio runtime.
pub struct TimerService {
    engine: Arc<Mutex<CountdownTimer>>,
    notifier: Arc<dyn TimerNotifier>,
    ticker: Option<TickerHandle>,
    events: watch::Sender<Event>,
}

impl TimerService {
    pub fn new(notifier: Arc<dyn TimerNotifier>) -> Self {
        Self::with_engine(CountdownTimer::new(), notifier)
    }

    /// Wrap an existing engine (e.g. one restored from persistence).
    pub fn with_engine(engine: CountdownTimer, notifier: Arc<dyn TimerNotifier>) -> Self {
        let snapshot = engine.snapshot();
        let (events, _) = watch::channel(snapshot);
        Self {
            engine: Arc::new(Mutex::new(engine)),
            notifier,
            ticker: None,
            events,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        lock(&self.engine).state()
    }

    pub fn snapshot(&self) -> Event {
        lock(&self.engine).snapshot()
    }

    /// A clone of the engine's current contents, for persistence.
    pub fn engine_state(&self) -> CountdownTimer {
        lock(&self.engine).clone()
    }

    /// Watch channel receiving a snapshot after every tick and
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_manual_time(&self, hours: i64, minutes: i64, seconds: i64) -> bool {
        let applied = lock(&self.engine).set_manual_time(hours, minutes, seconds);
        if applied {
            self.publish();
        }
        applied
    }

    pub fn select_chore(&self, chore_id: impl Into<String>) -> bool {
        let applied = lock(&self.engine).select_chore(chore_id);
        if applied {
            self.publish();
        }
        applied
    }

    /// Start the countdown and spawn the tick task.
    pub fn start(&mut self) -> Result<(), TimerError> {
        let event = lock(&self.engine).start()?;
        // Never two tick sources: drop any previous task first.
        self.ticker = None;
        self.dispatch(event);
        self.publish();
        self.spawn_ticker();
        Ok(())
    }

    /// Pause: cancels the tick task. No-op unless Running.
    pub fn pause(&mut self) -> bool {
        let Some(event) = lock(&self.engine).pause() else {
            return false;
        };
        self.ticker = None;
        self.dispatch(event);
        self.publish();
        true
    }

    /// Reset: cancels the tick task and returns the engine to Idle.
    pub fn reset(&mut self) {
        self.ticker = None;
        let event = lock(&self.engine).reset();
        self.dispatch(event);
        self.publish();
    }

    /// Wait for the running countdown to finish. Returns immediately
    /// when no tick task is active.
    pub async fn wait(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.join().await;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_ticker(&mut self) {
        let engine = Arc::clone(&self.engine);
        let notifier = Arc::clone(&self.notifier);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick fires immediately; consume it so
            // the first decrement lands a full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                let completion = {
                    let mut engine = lock(&engine);
                    let completion = engine.tick();
                    let _ = events.send(engine.snapshot());
                    completion
                };
                if let Some(event) = completion {
                    dispatch_bg(Arc::clone(&notifier), event);
                    break;
                }
            }
        });
        self.ticker = Some(TickerHandle::new(task));
    }

    fn publish(&self) {
        let _ = self.events.send(lock(&self.engine).snapshot());
    }

    fn dispatch(&self, event: Event) {
        dispatch_bg(Arc::clone(&self.notifier), event);
    }
}

/// Fire-and-forget notification. Runs on a blocking thread so the
/// notifier's synchronous REST call never stalls the tick task, and a
/// failure is logged instead of touching timer state.
fn dispatch_bg(notifier: Arc<dyn TimerNotifier>, event: Event) {
    tokio::task::spawn_blocking(move || {
        if let Err(e) = notifier::dispatch(notifier.as_ref(), &event) {
            eprintln!("Warning: timer sync failed: {e}");
        }
    });
}

fn lock(engine: &Mutex<CountdownTimer>) -> MutexGuard<'_, CountdownTimer> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
