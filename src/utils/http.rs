// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::UpstreamConfig;

/// Create a configured asynchronous HTTP client.
///
/// Every request made through the client is bounded by the configured timeout.
pub fn create_async_client(config: &UpstreamConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
