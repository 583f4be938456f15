pub mod auth;
pub mod chore;
pub mod config;
pub mod timer;
pub mod week;

use choreplan_core::{ApiClient, Config};

/// Build the API client from the configured backend URL.
pub fn api_client(cfg: &Config) -> Result<ApiClient, Box<dyn std::error::Error>> {
    Ok(ApiClient::new(&cfg.backend.base_url)?)
}
