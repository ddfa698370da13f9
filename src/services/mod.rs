//! Service layer for the job watcher.
//!
//! This module contains the business logic for:
//! - Upstream access (`JobBoardApi`, `HttpJobBoard`)
//! - Reference tables (`ReferenceData`)
//! - Listing fetching and enrichment (`ListingFetcher`)
//! - Keyword matching (`KeywordFilter`)
//! - Digest rendering and delivery (`DigestTemplate`, `EmailNotifier`)

mod api;
mod digest;
mod keywords;
mod listings;
mod notify;
mod reference;
mod token;

pub use api::{HttpJobBoard, JobBoardApi};
pub use digest::{DigestTemplate, LOGO_CID};
pub use keywords::{KeywordFilter, filter_by_keywords};
pub use listings::{
    FetchOutcome, ListingFetcher, PageStop, RejectCounts, Rejection, format_date,
    parse_expiration,
};
pub use notify::{EmailNotifier, Notifier, build_message};
pub use reference::ReferenceData;
pub use token::acquire_token;
