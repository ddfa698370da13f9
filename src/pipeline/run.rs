// src/pipeline/run.rs

//! Watch pipeline: fetch, filter, diff, commit and notify.
//!
//! [`Pipeline::plan`] covers everything up to the delta and never mutates
//! state. [`Pipeline::run`] then persists the new ids *before* asking the
//! notifier to deliver them, so a failed delivery does not resend the same
//! listings on the next run.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, KeywordTaxonomy, ListingId};
use crate::pipeline::diff::{Delta, calculate_delta};
use crate::services::{
    JobBoardApi, KeywordFilter, ListingFetcher, Notifier, PageStop, ReferenceData, RejectCounts,
};
use crate::storage::{SeenIdStore, SeenIds};

const STEPS: u8 = 5;

/// Everything a run would do, computed without side effects.
#[derive(Debug, Clone)]
pub struct Plan {
    pub pages_fetched: u32,
    pub stop: PageStop,
    pub rejected: RejectCounts,
    /// Listings that survived the fetch filters
    pub fetched: usize,
    pub keyword_count: usize,
    /// Listings that matched a keyword
    pub filtered: usize,
    /// Seen set as loaded at the start of the run
    pub seen: SeenIds,
    pub delta: Delta,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing new; the store was not touched and nothing was sent
    NoOp,
    /// New ids were merged into the store and the digest was delivered
    NotifiedAndCommitted,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub pages_fetched: u32,
    pub fetched: usize,
    pub filtered: usize,
    pub already_seen: usize,
    pub duplicates: usize,
    pub rejected: RejectCounts,
    pub new_ids: Vec<ListingId>,
    /// Whether the merged seen set reached the store
    pub store_committed: bool,
}

impl RunReport {
    fn new(plan: &Plan, outcome: RunOutcome, store_committed: bool) -> Self {
        Self {
            outcome,
            pages_fetched: plan.pages_fetched,
            fetched: plan.fetched,
            filtered: plan.filtered,
            already_seen: plan.delta.already_seen,
            duplicates: plan.delta.duplicates,
            rejected: plan.rejected.clone(),
            new_ids: plan.delta.new_ids().cloned().collect(),
            store_committed,
        }
    }

    /// Log the end-of-run summary.
    pub fn log_summary(&self) {
        log::info!(
            "Run finished ({:?}): {} page(s), {} fetched, {} matched, {} new, {} already seen",
            self.outcome,
            self.pages_fetched,
            self.fetched,
            self.filtered,
            self.new_ids.len(),
            self.already_seen
        );
        let r = &self.rejected;
        if r.total() > 0 {
            log::info!(
                "  rejected records: {} expired, {} outside regions, {} bad expiration, {} missing id, {} malformed",
                r.expired,
                r.region,
                r.bad_expiration,
                r.missing_id,
                r.malformed
            );
        }
        if self.duplicates > 0 {
            log::info!("  {} repeated listing(s) within this run ignored", self.duplicates);
        }
        if !self.store_committed && self.outcome == RunOutcome::NotifiedAndCommitted {
            log::warn!("  seen ids were NOT saved; these listings may be sent again");
        }
    }
}

fn step(n: u8, message: &str) {
    log::info!("Step {n}/{STEPS}: {message}");
}

/// One watch pass over the upstream board.
pub struct Pipeline<'a> {
    api: &'a dyn JobBoardApi,
    store: &'a dyn SeenIdStore,
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(api: &'a dyn JobBoardApi, store: &'a dyn SeenIdStore, config: &'a Config) -> Self {
        Self { api, store, config }
    }

    /// Fetch, filter and diff without touching the store or the notifier.
    ///
    /// `now` is captured once by the caller and used as the expiration
    /// cutoff for every page.
    pub async fn plan(&self, now: DateTime<Utc>) -> Plan {
        let config = self.config;

        step(1, "loading reference data");
        let reference = ReferenceData::load(self.api, &config.locale).await;

        step(2, "fetching listings");
        let outcome = ListingFetcher::new(self.api, &reference, &config.locale, &config.upstream)
            .fetch(&config.filter.allowed_regions, now)
            .await;
        log::info!(
            "  {} listing(s) kept from {} page(s), {} record(s) rejected",
            outcome.listings.len(),
            outcome.pages_fetched,
            outcome.rejected.total()
        );
        if outcome.is_truncated() {
            log::warn!("  pagination ended early: {:?}", outcome.stop);
        }

        step(3, "filtering by keywords");
        let taxonomy = KeywordTaxonomy::load_or_empty(&config.paths.keywords_file);
        let filter = KeywordFilter::new(&taxonomy);
        let fetched = outcome.listings.len();
        let matched = filter.apply(outcome.listings);
        log::info!(
            "  {} of {} listing(s) match {} keyword(s)",
            matched.len(),
            fetched,
            filter.keyword_count()
        );

        step(4, "comparing against seen ids");
        let seen = self.store.load().await;
        let filtered = matched.len();
        let delta = calculate_delta(matched, &seen);
        log::info!(
            "  {} new, {} already seen ({} stored id(s) at {})",
            delta.new_listings.len(),
            delta.already_seen,
            seen.len(),
            self.store.location()
        );

        Plan {
            pages_fetched: outcome.pages_fetched,
            stop: outcome.stop,
            rejected: outcome.rejected,
            fetched,
            keyword_count: filter.keyword_count(),
            filtered,
            seen,
            delta,
        }
    }

    /// Run the full pipeline.
    ///
    /// When there is something new, the merged seen set is saved first and
    /// the digest is sent second. A failed save is logged and does not stop
    /// the digest. A failed delivery is returned as an error, with the new
    /// ids already committed.
    pub async fn run(&self, notifier: &dyn Notifier, now: DateTime<Utc>) -> Result<RunReport> {
        let plan = self.plan(now).await;

        if !plan.delta.has_changes() {
            step(5, "nothing new, skipping commit and notification");
            return Ok(RunReport::new(&plan, RunOutcome::NoOp, false));
        }

        step(5, "committing seen ids and sending digest");
        let merged = plan.delta.merged_into(&plan.seen);
        let store_committed = match self.store.save(&merged).await {
            Ok(()) => {
                log::info!("  {} id(s) saved to {}", merged.len(), self.store.location());
                true
            }
            Err(e) => {
                log::error!("  failed to save seen ids to {}: {}", self.store.location(), e);
                false
            }
        };

        notifier.notify(&plan.delta.new_listings).await?;

        Ok(RunReport::new(
            &plan,
            RunOutcome::NotifiedAndCommitted,
            store_committed,
        ))
    }
}
