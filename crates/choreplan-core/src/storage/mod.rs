mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, TimerSessionRecord, TimerStats};

use std::path::PathBuf;

/// Returns the data directory, `~/.config/choreplan[-dev]/`.
///
/// Set `CHOREPLAN_DATA_DIR` to use an explicit directory (tests do),
/// or `CHOREPLAN_ENV=dev` to use the development directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = if let Ok(explicit) = std::env::var("CHOREPLAN_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("CHOREPLAN_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("choreplan-dev")
        } else {
            base_dir.join("choreplan")
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
