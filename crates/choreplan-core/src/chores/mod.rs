//! Chore records and the backend-synchronized chore store.

mod store;

pub use store::ChoreStore;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lifecycle status of a chore, as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoreStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Default for ChoreStatus {
    fn default() -> Self {
        ChoreStatus::Pending
    }
}

impl FromStr for ChoreStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', " ").as_str() {
            "pending" => Ok(ChoreStatus::Pending),
            "in progress" => Ok(ChoreStatus::InProgress),
            "completed" | "done" => Ok(ChoreStatus::Completed),
            _ => Err(ValidationError::InvalidValue {
                field: "status",
                message: format!("'{s}' is not one of pending, in-progress, completed"),
            }),
        }
    }
}

/// Priority level of a chore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChorePriority {
    High,
    Medium,
    Low,
}

impl Default for ChorePriority {
    fn default() -> Self {
        ChorePriority::Medium
    }
}

impl FromStr for ChorePriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(ChorePriority::High),
            "medium" => Ok(ChorePriority::Medium),
            "low" => Ok(ChorePriority::Low),
            _ => Err(ValidationError::InvalidValue {
                field: "priority",
                message: format!("'{s}' is not one of high, medium, low"),
            }),
        }
    }
}

/// Server-side filters for the chore list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoreFilter {
    /// Order by priority level.
    Priority,
    /// Order by upcoming deadline.
    Deadline,
    /// Only chores assigned to the authenticated user.
    SelfAssigned,
}

impl ChoreFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoreFilter::Priority => "priority",
            ChoreFilter::Deadline => "deadline",
            ChoreFilter::SelfAssigned => "self",
        }
    }
}

impl fmt::Display for ChoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoreFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "priority" => Ok(ChoreFilter::Priority),
            "deadline" => Ok(ChoreFilter::Deadline),
            "self" => Ok(ChoreFilter::SelfAssigned),
            _ => Err(ValidationError::UnknownFilter(s.to_string())),
        }
    }
}

/// A chore as stored by the backend. The client only ever holds a
/// cached copy; ids are assigned server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chore {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ChoreStatus,
    /// Completion percentage, 0-100.
    #[serde(default)]
    pub progress: u8,
    /// Weekday name the chore is planned for ("Monday" .. "Sunday").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    /// Planned time of day, "HH:mm".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub priority: ChorePriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// User id of the household member responsible, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

/// Payload for creating a chore; the backend assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct ChoreDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ChoreStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub priority: ChorePriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl ChoreDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: ChoreStatus::Pending,
            progress: 0,
            day: None,
            time: None,
            priority: ChorePriority::default(),
            deadline: None,
            assignee: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.progress > 100 {
            return Err(ValidationError::InvalidValue {
                field: "progress",
                message: "must be between 0 and 100".to_string(),
            });
        }
        Ok(())
    }
}

/// Partial update for `PUT /chores/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChorePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChoreStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<ChorePriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl ChorePatch {
    /// The patch that marks a chore done.
    pub fn completed() -> Self {
        Self {
            status: Some(ChoreStatus::Completed),
            progress: Some(100),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|v| v.as_object().map(|o| o.is_empty()).unwrap_or(true))
            .unwrap_or(true)
    }
}
