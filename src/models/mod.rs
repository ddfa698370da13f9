// src/models/mod.rs

//! Domain models for the job watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod listing;
mod taxonomy;
pub mod upstream;

// Re-export all public types
pub use config::{
    AuthConfig, Config, DigestLocale, FilterConfig, LocaleConfig, LoggingConfig, MailConfig,
    PathsConfig, UpstreamConfig, parse_region_list,
};
pub use listing::{Listing, ListingId};
pub use taxonomy::KeywordTaxonomy;
