//! Countdown timer commands.
//!
//! The engine is persisted in the local database between invocations;
//! `run` drives a live one-second countdown in the foreground. Backend
//! sync failures are warnings, never errors: local timer state is the
//! source of truth.

use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;
use choreplan_core::storage::Database;
use choreplan_core::timer::{self, BackendNotifier, NoopNotifier, TimerNotifier};
use choreplan_core::{
    Config, CountdownTimer, Event, SessionStore, TimerService, TimerState,
};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Set the countdown duration (out-of-range fields are clamped)
    Set {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        hours: i64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        minutes: i64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        seconds: i64,
    },
    /// Select the chore the countdown is tracked against
    Select {
        /// Chore ID (see `chore tasks`)
        chore_id: String,
    },
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to idle with a zero duration
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Run the countdown in the foreground until it completes
    Run,
    /// Save the current duration to the backend
    Save,
    /// Load the last saved duration from the backend
    Fetch,
    /// Countdown totals, overall and per chore
    Stats,
    /// Recently completed countdowns
    History {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

fn load_engine(db: &Database, hour_limit: u32) -> CountdownTimer {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<CountdownTimer>(&json) {
            return engine;
        }
    }
    CountdownTimer::with_hour_limit(hour_limit)
}

fn save_engine(db: &Database, engine: &CountdownTimer) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Backend notifier for the persisted session, or a no-op one when
/// nobody is logged in.
fn notifier(cfg: &Config) -> Arc<dyn TimerNotifier> {
    let api = match super::api_client(cfg) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Warning: timer sync unavailable: {e}");
            return Arc::new(NoopNotifier);
        }
    };
    match SessionStore::new().load() {
        Ok(Some(session)) => Arc::new(BackendNotifier::new(api, &session)),
        Ok(None) => {
            eprintln!("Warning: not logged in; timer events will not sync");
            Arc::new(NoopNotifier)
        }
        Err(e) => {
            eprintln!("Warning: timer sync unavailable: {e}");
            Arc::new(NoopNotifier)
        }
    }
}

/// Fire a transition at the backend. Failures are logged and the local
/// state stands.
fn sync_event(cfg: &Config, event: &Event) {
    let notifier = notifier(cfg);
    if let Err(e) = timer::dispatch(notifier.as_ref(), event) {
        eprintln!("Warning: timer sync failed: {e}");
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let db = Database::open()?;
    let mut engine = load_engine(&db, cfg.timer.hour_limit);

    match action {
        TimerAction::Set {
            hours,
            minutes,
            seconds,
        } => {
            if !engine.set_manual_time(hours, minutes, seconds) {
                eprintln!("timer is running; time not changed");
            }
            save_engine(&db, &engine)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Select { chore_id } => {
            if !engine.select_chore(chore_id) {
                eprintln!("timer is running; chore not changed");
            }
            save_engine(&db, &engine)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Start => {
            let event = engine.start()?;
            save_engine(&db, &engine)?;
            sync_event(&cfg, &event);
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Pause => {
            if let Some(event) = engine.pause() {
                save_engine(&db, &engine)?;
                sync_event(&cfg, &event);
            }
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Reset => {
            let event = engine.reset();
            save_engine(&db, &engine)?;
            sync_event(&cfg, &event);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Run => {
            run_foreground(&cfg, &db, engine)?;
        }
        TimerAction::Save => {
            let api = super::api_client(&cfg)?;
            timer::save_timer(&api, engine.duration())?;
            println!("Timer data saved");
        }
        TimerAction::Fetch => {
            let api = super::api_client(&cfg)?;
            let saved = timer::fetch_timer(&api)?;
            if !engine.set_manual_time(saved.hours, saved.minutes, saved.seconds) {
                eprintln!("timer is running; fetched time not applied");
            }
            save_engine(&db, &engine)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Stats => {
            let stats = db.stats()?;
            let per_chore = db.chore_totals()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "totals": stats,
                    "per_chore": per_chore,
                }))?
            );
        }
        TimerAction::History { limit } => {
            let records = db.recent_sessions(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

/// Live countdown: ticks once per second, prints the remaining time,
/// and records the completed session locally.
fn run_foreground(
    cfg: &Config,
    db: &Database,
    mut engine: CountdownTimer,
) -> Result<(), Box<dyn std::error::Error>> {
    // A previously persisted Running state has no live ticker anymore;
    // drop it back to Paused so start() can take over.
    if engine.is_running() {
        let _ = engine.pause();
    }

    let notifier = notifier(cfg);
    let started_at = Utc::now();
    let initial = engine.duration();
    let chore_id = engine.chore_id().map(str::to_string);

    let rt = tokio::runtime::Runtime::new()?;
    let final_engine = rt.block_on(async {
        let mut service = TimerService::with_engine(engine, notifier);
        service.start()?;

        let mut rx = service.subscribe();
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if let Event::StateSnapshot {
                state, duration, ..
            } = snapshot
            {
                println!("{duration}");
                if state != TimerState::Running {
                    break;
                }
            }
        }
        service.wait().await;
        Ok::<_, Box<dyn std::error::Error>>(service.engine_state())
    })?;

    save_engine(db, &final_engine)?;

    if final_engine.state() == TimerState::Completed {
        println!("Time is up!");
        if let Some(chore_id) = chore_id {
            db.record_timer_session(
                &chore_id,
                "",
                initial.total_seconds(),
                started_at,
                Utc::now(),
            )?;
        }
        if cfg.timer.save_on_complete {
            let api = super::api_client(cfg)?;
            if let Err(e) = timer::save_timer(&api, final_engine.duration()) {
                eprintln!("Warning: failed to save timer data: {e}");
            }
        }
    }

    Ok(())
}
