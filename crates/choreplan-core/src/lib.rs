//! # Choreplan Core Library
//!
//! Client-side core for the chore-planner backend. All behavior lives
//! here; the CLI binary is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a countdown state machine driven by an explicit
//!   one-second tick, with fire-and-forget backend sync
//! - **Auth**: login/signup/logout against `/api/auth`, owning the
//!   keyring-persisted session (token + user id)
//! - **Chores**: CRUD cache over `/api/chores`, last successful
//!   response wins
//! - **Storage**: TOML configuration and SQLite persistence for the
//!   timer engine and completed-countdown history
//!
//! ## Key Components
//!
//! - [`CountdownTimer`]: the timer state machine
//! - [`TimerService`]: live ticking + backend notifications
//! - [`AuthService`]: session lifecycle
//! - [`ChoreStore`]: backend-synchronized chore cache

pub mod api;
pub mod auth;
pub mod chores;
pub mod dates;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use api::ApiClient;
pub use auth::{AuthService, Profile, ProfileUpdate, Session, SessionStore, SignupRequest};
pub use chores::{Chore, ChoreDraft, ChoreFilter, ChorePatch, ChorePriority, ChoreStatus, ChoreStore};
pub use error::{ApiError, ConfigError, CoreError, DatabaseError, TimerError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, TimerSessionRecord, TimerStats};
pub use timer::{BackendNotifier, CountdownTimer, NoopNotifier, TimerDuration, TimerService, TimerState};
