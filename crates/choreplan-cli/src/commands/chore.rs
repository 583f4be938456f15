//! Chore management commands.
//!
//! Structured flags instead of interactive prompts; output is JSON so
//! results can be piped.

use chrono::{DateTime, NaiveTime, Utc};
use clap::Subcommand;
use choreplan_core::{
    dates, ChoreDraft, ChoreFilter, ChorePatch, ChoreStore, Config, SessionStore,
};

#[derive(Subcommand)]
pub enum ChoreAction {
    /// List chores, optionally for a weekday or calendar date
    List {
        /// Weekday name, e.g. "Monday"
        #[arg(long)]
        day: Option<String>,
        /// Calendar date, YYYY-MM-DD
        #[arg(long, conflicts_with = "day")]
        date: Option<String>,
    },
    /// Server-side filtered list: priority, deadline or self
    Filter {
        filter: String,
    },
    /// Create a chore
    Create {
        /// Chore name
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Weekday name the chore is planned for
        #[arg(long)]
        day: Option<String>,
        /// Planned time of day, HH:mm
        #[arg(long)]
        time: Option<String>,
        /// high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Deadline, RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
        /// User id of the responsible household member
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Update fields of a chore
    Update {
        /// Chore ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// pending, in-progress or completed
        #[arg(long)]
        status: Option<String>,
        /// Completion percentage, 0-100
        #[arg(long)]
        progress: Option<u8>,
        #[arg(long)]
        day: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Mark a chore as completed
    Complete {
        /// Chore ID
        id: String,
    },
    /// Delete a chore
    Delete {
        /// Chore ID
        id: String,
    },
    /// Tasks selectable by the timer for a weekday
    Tasks {
        /// Weekday name; defaults to today's
        #[arg(long)]
        day: Option<String>,
    },
}

/// Accept either a full RFC 3339 timestamp or a bare date (midnight).
fn parse_deadline(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = dates::parse_date(s)?;
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default();
    Ok(DateTime::from_naive_utc_and_offset(date.and_time(midnight), Utc))
}

fn store() -> Result<(ChoreStore, Config), Box<dyn std::error::Error>> {
    let cfg = Config::load_or_default();
    let api = super::api_client(&cfg)?;
    Ok((ChoreStore::new(api, SessionStore::new()), cfg))
}

pub fn run(action: ChoreAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut chores, cfg) = store()?;

    match action {
        ChoreAction::List { day, date } => {
            let listed = if let Some(date) = date {
                chores.list_by_date(dates::parse_date(&date)?)?
            } else {
                let day = day.or_else(|| cfg.chores.default_day.clone());
                chores.list(day.as_deref())?
            };
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        ChoreAction::Filter { filter } => {
            let filter: ChoreFilter = filter.parse()?;
            let listed = chores.filtered(filter)?;
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        ChoreAction::Create {
            name,
            description,
            day,
            time,
            priority,
            deadline,
            assignee,
        } => {
            let mut draft = ChoreDraft::new(name);
            draft.description = description;
            draft.day = day;
            draft.time = time;
            draft.priority = priority.parse()?;
            draft.deadline = deadline.as_deref().map(parse_deadline).transpose()?;
            draft.assignee = assignee;

            let created = chores.create(&draft)?;
            println!("Chore created: {}", created.id);
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        ChoreAction::Update {
            id,
            name,
            description,
            status,
            progress,
            day,
            time,
            priority,
            deadline,
            assignee,
        } => {
            let patch = ChorePatch {
                name,
                description,
                status: status.as_deref().map(str::parse).transpose()?,
                progress,
                day,
                time,
                priority: priority.as_deref().map(str::parse).transpose()?,
                deadline: deadline.as_deref().map(parse_deadline).transpose()?,
                assignee,
            };
            if patch.is_empty() {
                return Err("nothing to update: pass at least one field flag".into());
            }
            let updated = chores.update(&id, &patch)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        ChoreAction::Complete { id } => {
            let updated = chores.complete(&id)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        ChoreAction::Delete { id } => {
            chores.delete(&id)?;
            println!("Chore deleted: {id}");
        }
        ChoreAction::Tasks { day } => {
            let day = day.unwrap_or_else(|| dates::day_of_week(dates::today()).to_string());
            let tasks = chores.tasks_for_day(&day)?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
    }
    Ok(())
}
