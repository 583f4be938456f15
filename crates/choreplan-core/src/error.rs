//! Core error types for choreplan-core.
//!
//! Every failure the library can produce is classified here: local
//! validation, API/transport failures, and the persistence layers.
//! No error is fatal to the caller -- the CLI prints and exits the
//! single invocation, and timer sync failures are logged without
//! touching timer state.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for choreplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backend API errors (status mapping, transport)
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Timer state machine rejections
    #[error("{0}")]
    Timer(#[from] TimerError),

    /// Local input validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration load/save/lookup
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local database errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Session keyring errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from talking to the chore-planner backend.
///
/// Display strings follow the messages the application shows for each
/// failure class, so callers can print them verbatim.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from any endpoint. The caller must clear the session.
    #[error("Unauthorized. Please log in again.")]
    Unauthorized,

    /// Any other 4xx/5xx, carrying the user-facing message.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// No response at all (connect/timeout/request failure).
    #[error("No response received. Check your connection or backend.")]
    Network(#[source] reqwest::Error),

    /// The backend answered but the body was not what we expected.
    #[error("Unexpected response from the backend: {0}")]
    Decode(#[source] reqwest::Error),

    /// Invalid base URL in configuration.
    #[error("Invalid backend URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The async runtime could not be started for a blocking call.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ApiError {
    /// Map an HTTP error status to the user-facing error.
    ///
    /// `server_message` is the `message` field of the backend's error
    /// body, if it sent one.
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        let message = match status {
            400 => "Invalid input. Please check your data.".to_string(),
            403 => "Access denied. You do not have permission.".to_string(),
            404 => "Resource not found.".to_string(),
            500 => "Internal server error. Try again later.".to_string(),
            _ => server_message
                .unwrap_or_else(|| "An error occurred on the server.".to_string()),
        };
        ApiError::Backend { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Network(err)
        }
    }
}

/// Rejections from the countdown timer state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Please set a valid time before starting the timer.")]
    ZeroDuration,

    #[error("Please select a chore to associate with the timer.")]
    NoChoreSelected,

    #[error("The timer is already running.")]
    AlreadyRunning,
}

/// Local validation errors, raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown filter '{0}': expected priority, deadline or self")]
    UnknownFilter(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Local database errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Database is locked")]
    Locked,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(inner.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Errors from the OS keyring backing the session store.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
