// src/error.rs

//! Unified error handling for the job watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for job watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Mail address could not be parsed
    #[error("Mail address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Mail message could not be assembled
    #[error("Mail build error: {0}")]
    MailBuild(#[from] lettre::error::Error),

    /// SMTP session or delivery failed
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Notification dispatch error
    #[error("Notification error for {context}: {message}")]
    Notify { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a notification error with context.
    pub fn notify(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Notify {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
