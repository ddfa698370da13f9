// src/services/token.rs

//! Client-credentials token acquisition.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::AuthConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Request an access token; `None` on any failure.
///
/// The digest stays usable without a token, so failures are only logged.
pub async fn acquire_token(client: &Client, auth: &AuthConfig) -> Option<String> {
    match request_token(client, auth).await {
        Ok(token) => {
            log::info!("Access token obtained");
            Some(token)
        }
        Err(e) => {
            log::warn!("Proceeding without access token: {e}");
            None
        }
    }
}

async fn request_token(client: &Client, auth: &AuthConfig) -> Result<String> {
    let (client_id, client_secret) = credentials(auth)?;

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("scope", auth.scope.as_str()),
    ];

    let reply: TokenResponse = client
        .post(&auth.token_endpoint)
        .form(&form)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    reply
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("token endpoint replied without access_token"))
}

fn credentials(auth: &AuthConfig) -> Result<(&str, &str)> {
    let id = auth.client_id.as_deref().filter(|s| !s.is_empty());
    let secret = auth.client_secret.as_deref().filter(|s| !s.is_empty());
    match (id, secret) {
        (Some(id), Some(secret)) => Ok((id, secret)),
        _ => Err(AppError::config("client_id and client_secret are not configured")),
    }
}
