//! Persistence of already-notified listing ids.
//!
//! The seen-id set is the only state that survives between runs. It is read
//! once at the start of a run and written once at the end, by a single
//! process; callers must not run two pipelines against the same file at
//! once (there is no locking, and the last writer wins).

pub mod local;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ListingId;

// Re-export for convenience
pub use local::LocalSeenStore;

/// Set of listing ids that have already been notified.
pub type SeenIds = BTreeSet<ListingId>;

/// Trait for seen-id storage backends.
#[async_trait]
pub trait SeenIdStore: Send + Sync {
    /// Load the stored set. Missing, empty or unreadable state is an empty set.
    async fn load(&self) -> SeenIds;

    /// Replace the stored set with `ids`.
    async fn save(&self, ids: &SeenIds) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
