//! Backend notifications for timer transitions.
//!
//! Transitions never wait for the backend: the local state change is
//! the source of truth, and a failed notification is logged without
//! being retried or rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::duration::TimerDuration;
use crate::api::{self, ApiClient};
use crate::auth::Session;
use crate::error::ApiError;
use crate::events::Event;

/// Receiver for timer transitions. All hooks default to no-ops so
/// implementations only override what they care about.
pub trait TimerNotifier: Send + Sync {
    fn on_start(&self, _chore_id: &str, _remaining: TimerDuration) -> Result<(), ApiError> {
        Ok(())
    }

    fn on_pause(&self, _chore_id: &str, _remaining: TimerDuration) -> Result<(), ApiError> {
        Ok(())
    }

    fn on_reset(&self, _chore_id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    fn on_complete(&self, _chore_id: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Notifier that drops every event. Used when no session exists.
pub struct NoopNotifier;

impl TimerNotifier for NoopNotifier {}

/// Route a timer event to the matching hook. Events without a chore
/// target (and plain snapshots) are skipped.
pub fn dispatch(notifier: &dyn TimerNotifier, event: &Event) -> Result<(), ApiError> {
    match event {
        Event::TimerStarted {
            chore_id: Some(id),
            duration,
            ..
        } => notifier.on_start(id, *duration),
        Event::TimerPaused {
            chore_id: Some(id),
            remaining,
            ..
        } => notifier.on_pause(id, *remaining),
        Event::TimerReset {
            chore_id: Some(id), ..
        } => notifier.on_reset(id),
        Event::TimerCompleted {
            chore_id: Some(id), ..
        } => notifier.on_complete(id),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
struct TimerActionBody {
    time: TimerDuration,
}

/// Notifier posting to the `/api/tasks/{id}/*-timer` endpoints with the
/// session's bearer token.
pub struct BackendNotifier {
    api: ApiClient,
    token: String,
}

impl BackendNotifier {
    pub fn new(api: ApiClient, session: &Session) -> Self {
        Self {
            api,
            token: session.token.clone(),
        }
    }

    fn post_action(
        &self,
        chore_id: &str,
        action: &str,
        time: Option<TimerDuration>,
    ) -> Result<(), ApiError> {
        let path = format!("/tasks/{chore_id}/{action}");
        let body = time.map(|time| TimerActionBody { time });
        api::wait(self.api.post_unit(&path, body.as_ref(), Some(&self.token)))
    }
}

impl TimerNotifier for BackendNotifier {
    fn on_start(&self, chore_id: &str, remaining: TimerDuration) -> Result<(), ApiError> {
        self.post_action(chore_id, "start-timer", Some(remaining))
    }

    fn on_pause(&self, chore_id: &str, remaining: TimerDuration) -> Result<(), ApiError> {
        self.post_action(chore_id, "pause-timer", Some(remaining))
    }

    fn on_reset(&self, chore_id: &str) -> Result<(), ApiError> {
        self.post_action(chore_id, "reset-timer", None)
    }

    fn on_complete(&self, chore_id: &str) -> Result<(), ApiError> {
        self.post_action(chore_id, "complete-timer", None)
    }
}

/// Payload for `POST /timer/save`.
#[derive(Debug, Serialize)]
struct SaveTimerRequest {
    hours: u32,
    minutes: u32,
    seconds: u32,
    timestamp: DateTime<Utc>,
}

/// Response of `GET /timer/data`. Raw integers: the engine clamps them
/// on load, the same way it clamps manual entry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SavedTimer {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Persist the current duration to the backend.
pub fn save_timer(api: &ApiClient, duration: TimerDuration) -> Result<(), ApiError> {
    api::wait(api.post_unit(
        "/timer/save",
        Some(&SaveTimerRequest {
            hours: duration.hours,
            minutes: duration.minutes,
            seconds: duration.seconds,
            timestamp: Utc::now(),
        }),
        None,
    ))
}

/// Fetch the last saved duration from the backend.
pub fn fetch_timer(api: &ApiClient) -> Result<SavedTimer, ApiError> {
    api::wait(api.get_json("/timer/data", &[], None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn session() -> Session {
        Session {
            token: "tok".into(),
            user_id: "u-1".into(),
        }
    }

    #[test]
    fn start_posts_the_remaining_time() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("POST", "/tasks/T1/start-timer")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({
                "time": {"hours": 0, "minutes": 5, "seconds": 0}
            })))
            .with_status(200)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let notifier = BackendNotifier::new(api, &session());
        notifier
            .on_start("T1", TimerDuration::clamped(0, 5, 0, 23))
            .unwrap();
        m.assert();
    }

    #[test]
    fn reset_and_complete_have_no_body() {
        let mut server = mockito::Server::new();
        let reset = server
            .mock("POST", "/tasks/T1/reset-timer")
            .with_status(200)
            .create();
        let complete = server
            .mock("POST", "/tasks/T1/complete-timer")
            .with_status(200)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let notifier = BackendNotifier::new(api, &session());
        notifier.on_reset("T1").unwrap();
        notifier.on_complete("T1").unwrap();
        reset.assert();
        complete.assert();
    }

    #[test]
    fn dispatch_skips_events_without_a_chore() {
        struct Panicky;
        impl TimerNotifier for Panicky {
            fn on_reset(&self, _chore_id: &str) -> Result<(), ApiError> {
                panic!("must not be called");
            }
        }

        let event = Event::TimerReset {
            chore_id: None,
            at: Utc::now(),
        };
        dispatch(&Panicky, &event).unwrap();
    }

    #[test]
    fn save_and_fetch_roundtrip_against_the_backend() {
        let mut server = mockito::Server::new();
        let save = server
            .mock("POST", "/timer/save")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "hours": 1, "minutes": 2, "seconds": 3
            })))
            .with_status(200)
            .create();
        let _data = server
            .mock("GET", "/timer/data")
            .with_status(200)
            .with_body(r#"{"hours":1,"minutes":2,"seconds":3}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        save_timer(&api, TimerDuration::clamped(1, 2, 3, 23)).unwrap();
        let saved = fetch_timer(&api).unwrap();
        assert_eq!((saved.hours, saved.minutes, saved.seconds), (1, 2, 3));
        save.assert();
    }
}
