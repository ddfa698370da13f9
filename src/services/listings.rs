// src/services/listings.rs

//! Listing fetcher.
//!
//! Pages through the upstream listings endpoint one request at a time,
//! drops records that are id-less, undated, expired or outside the allowed
//! regions, and enriches the survivors for display.

use std::collections::HashSet;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use serde_json::Value;

use crate::models::upstream::{RawEntry, scalar_text};
use crate::models::{Listing, LocaleConfig, UpstreamConfig};
use crate::services::{JobBoardApi, ReferenceData};

/// Why a record was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The record did not have the expected shape
    Malformed(String),
    MissingId,
    MissingExpiration,
    UnparseableExpiration(String),
    /// Expiration at or before the fetch cutoff
    Expired,
    RegionNotAllowed(Option<i64>),
}

/// Rejected-record counters per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectCounts {
    pub malformed: usize,
    pub missing_id: usize,
    pub bad_expiration: usize,
    pub expired: usize,
    pub region: usize,
}

impl RejectCounts {
    fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::Malformed(_) => self.malformed += 1,
            Rejection::MissingId => self.missing_id += 1,
            Rejection::MissingExpiration | Rejection::UnparseableExpiration(_) => {
                self.bad_expiration += 1
            }
            Rejection::Expired => self.expired += 1,
            Rejection::RegionNotAllowed(_) => self.region += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.malformed + self.missing_id + self.bad_expiration + self.expired + self.region
    }
}

/// How pagination ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStop {
    /// Upstream returned a page without data
    Exhausted { page: u32 },
    /// A page request failed; results up to the previous page are kept
    Failed { page: u32, error: String },
    /// The configured page cap was reached before upstream ran dry
    PageCap { pages: u32 },
}

/// Result of one fetch pass.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Accepted listings in upstream page order, then within-page order
    pub listings: Vec<Listing>,
    /// Pages that carried data
    pub pages_fetched: u32,
    pub rejected: RejectCounts,
    pub stop: PageStop,
}

impl FetchOutcome {
    /// Whether pagination ended early rather than on an empty page.
    pub fn is_truncated(&self) -> bool {
        !matches!(self.stop, PageStop::Exhausted { .. })
    }
}

/// Service turning upstream pages into filtered, enriched listings.
pub struct ListingFetcher<'a> {
    api: &'a dyn JobBoardApi,
    reference: &'a ReferenceData,
    locale: &'a LocaleConfig,
    page_size: u32,
    max_pages: u32,
}

impl<'a> ListingFetcher<'a> {
    pub fn new(
        api: &'a dyn JobBoardApi,
        reference: &'a ReferenceData,
        locale: &'a LocaleConfig,
        upstream: &UpstreamConfig,
    ) -> Self {
        Self {
            api,
            reference,
            locale,
            page_size: upstream.page_size.max(1),
            max_pages: upstream.max_pages.max(1),
        }
    }

    /// Fetch every page and keep the listings that pass the filters.
    ///
    /// `now` is the single expiration cutoff for the whole pass. A failing
    /// page ends pagination without discarding what was already gathered.
    pub async fn fetch(&self, allowed_regions: &[i64], now: DateTime<Utc>) -> FetchOutcome {
        let allowed: HashSet<i64> = allowed_regions.iter().copied().collect();
        let mut listings = Vec::new();
        let mut rejected = RejectCounts::default();
        let mut pages_fetched = 0;
        let mut stop = PageStop::PageCap {
            pages: self.max_pages,
        };

        for page_index in 1..=self.max_pages {
            let page = match self.api.fetch_page(page_index, self.page_size).await {
                Ok(page) => page,
                Err(error) => {
                    log::warn!(
                        "Failed to fetch listings page {}, stopping pagination: {}",
                        page_index,
                        error
                    );
                    stop = PageStop::Failed {
                        page: page_index,
                        error: error.to_string(),
                    };
                    break;
                }
            };

            if page.is_exhausted() {
                stop = PageStop::Exhausted { page: page_index };
                break;
            }
            pages_fetched += 1;

            for record in page.records() {
                match self.admit(record, &allowed, now) {
                    Ok(listing) => listings.push(listing),
                    Err(rejection) => {
                        log::debug!("Page {page_index}: skipping record ({rejection:?})");
                        rejected.record(&rejection);
                    }
                }
            }
        }

        if let PageStop::PageCap { pages } = stop {
            log::warn!("Reached page cap of {pages} pages; upstream may not be terminating");
        }

        FetchOutcome {
            listings,
            pages_fetched,
            rejected,
            stop,
        }
    }

    /// Apply the per-record checks in order and build the listing.
    fn admit(
        &self,
        record: &Value,
        allowed: &HashSet<i64>,
        now: DateTime<Utc>,
    ) -> Result<Listing, Rejection> {
        let entry: RawEntry = serde_json::from_value(record.clone())
            .map_err(|e| Rejection::Malformed(e.to_string()))?;
        let posting = entry.puesto.unwrap_or_default();

        let id = posting.listing_id().ok_or(Rejection::MissingId)?;

        let raw_expiration = posting.expiration().ok_or(Rejection::MissingExpiration)?;
        let expiration = parse_expiration(raw_expiration)
            .ok_or_else(|| Rejection::UnparseableExpiration(raw_expiration.to_string()))?;

        if expiration.with_timezone(&Utc) <= now {
            return Err(Rejection::Expired);
        }

        let region_code = posting.region_code();
        let region_id = region_code
            .filter(|code| allowed.contains(code))
            .ok_or(Rejection::RegionNotAllowed(region_code))?;

        let text = |field: &Option<Value>| {
            scalar_text(field.as_ref()).unwrap_or_else(|| self.locale.not_specified.clone())
        };

        Ok(Listing {
            id,
            title: text(&posting.titulo),
            description: text(&posting.descripcion),
            benefits: text(&posting.beneficios_generales),
            requirements: text(&posting.requisitos_generales),
            salary_text: self
                .reference
                .salary(posting.salario_ofrecido.as_ref())
                .map(str::to_string)
                .unwrap_or_else(|| self.locale.not_specified.clone()),
            quantity_text: self.locale.quantity_text(posting.slot_count()),
            expiration_date_text: format_date(&expiration, self.locale),
            expiration_date: expiration,
            region_id,
            region_text: self
                .reference
                .region(region_id)
                .unwrap_or(&self.locale.unknown_region)
                .to_string(),
        })
    }
}

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp.
///
/// Offset-qualified values keep their offset. Values without an offset are
/// read as host-local time, and a bare date means local midnight.
pub fn parse_expiration(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// Render a date as "27 August 2025" using the locale's month names.
pub fn format_date(date: &DateTime<FixedOffset>, locale: &LocaleConfig) -> String {
    format!(
        "{} {} {}",
        date.day(),
        locale.month_name(date.month()),
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::models::ListingId;
    use crate::testing::{FakeBoard, id_list, page, posting};

    const FUTURE: &str = "2030-08-27T10:00:00Z";
    const PAST: &str = "2020-01-15T10:00:00Z";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn reference() -> ReferenceData {
        let mut data = ReferenceData::default();
        data.salaries.insert("1".into(), "RD$ 25,000".into());
        data.regions.insert("41".into(), "Santiago".into());
        data
    }

    async fn fetch_with(board: &FakeBoard, upstream: &UpstreamConfig) -> FetchOutcome {
        let reference = reference();
        let locale = LocaleConfig::default();
        ListingFetcher::new(board, &reference, &locale, upstream)
            .fetch(&[41, 190], now())
            .await
    }

    async fn fetch(board: &FakeBoard) -> FetchOutcome {
        fetch_with(board, &UpstreamConfig::default()).await
    }

    fn ids(outcome: &FetchOutcome) -> Vec<ListingId> {
        outcome.listings.iter().map(|l| l.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_two_page_scenario() {
        let board = FakeBoard::new(vec![
            page(vec![
                posting(1, FUTURE, 41, "Chofer", "a"),
                posting(2, PAST, 41, "Cajero", "b"),
                posting(3, FUTURE, 190, "Analista", "c"),
                posting(4, PAST, 190, "Chef", "d"),
                posting(5, FUTURE, 41, "Mesero", "e"),
                posting(6, PAST, 41, "Guardia", "f"),
            ]),
            page(vec![]),
        ]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[1, 3, 5]));
        assert_eq!(outcome.rejected.expired, 3);
        assert_eq!(outcome.pages_fetched, 1);
        assert_eq!(outcome.stop, PageStop::Exhausted { page: 2 });
        assert!(!outcome.is_truncated());
        assert_eq!(board.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_expiration_boundary() {
        let board = FakeBoard::new(vec![page(vec![
            posting(1, "2026-10-16T12:00:00Z", 41, "t", "d"),
            posting(2, "2026-10-16T12:00:00.000001Z", 41, "t", "d"),
            posting(3, "2026-10-16T08:00:00.000001-04:00", 41, "t", "d"),
        ])]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[2, 3]));
        assert_eq!(outcome.rejected.expired, 1);
    }

    #[tokio::test]
    async fn test_region_allow_list_and_unknown_name() {
        let board = FakeBoard::new(vec![page(vec![
            posting(1, FUTURE, 99, "t", "d"),
            posting(2, FUTURE, 190, "t", "d"),
            posting(3, FUTURE, 41, "t", "d"),
            json!({"puesto": {"id": 4, "fechaVencimiento": FUTURE}}),
        ])]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[2, 3]));
        assert_eq!(outcome.rejected.region, 2);
        assert_eq!(outcome.listings[0].region_text, "Unknown");
        assert_eq!(outcome.listings[1].region_text, "Santiago");
    }

    #[tokio::test]
    async fn test_bad_records_skipped_without_aborting_page() {
        let board = FakeBoard::new(vec![page(vec![
            json!({"puesto": {"fechaVencimiento": FUTURE, "idProvincia": 41}}),
            json!({"puesto": {"id": 2, "idProvincia": 41}}),
            json!({"puesto": {"id": 3, "fechaVencimiento": "next tuesday", "idProvincia": 41}}),
            json!({"puesto": {"id": 4, "fechaVencimiento": FUTURE, "idProvincia": "41"}}),
            json!({"other": true}),
            json!("not an object"),
            posting(7, FUTURE, 41, "ok", "ok"),
        ])]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[7]));
        assert_eq!(outcome.rejected.missing_id, 2);
        assert_eq!(outcome.rejected.bad_expiration, 2);
        assert_eq!(outcome.rejected.region, 1);
        assert_eq!(outcome.rejected.malformed, 1);
        assert_eq!(outcome.rejected.total(), 6);
    }

    #[tokio::test]
    async fn test_page_failure_truncates() {
        let board = FakeBoard::new(vec![
            page(vec![posting(1, FUTURE, 41, "t", "d")]),
            page(vec![posting(2, FUTURE, 41, "t", "d")]),
            None,
            page(vec![posting(4, FUTURE, 41, "t", "d")]),
        ]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[1, 2]));
        assert!(matches!(outcome.stop, PageStop::Failed { page: 3, .. }));
        assert!(outcome.is_truncated());
        assert_eq!(board.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_first_page_failure_yields_nothing() {
        let board = FakeBoard::new(vec![None]);
        let outcome = fetch(&board).await;
        assert!(outcome.listings.is_empty());
        assert_eq!(outcome.pages_fetched, 0);
    }

    #[tokio::test]
    async fn test_page_cap_bounds_runaway_upstream() {
        let board = FakeBoard::endless(posting(1, FUTURE, 41, "t", "d"));
        let upstream = UpstreamConfig {
            max_pages: 3,
            ..UpstreamConfig::default()
        };

        let outcome = fetch_with(&board, &upstream).await;

        assert_eq!(board.requested_pages(), vec![1, 2, 3]);
        assert_eq!(outcome.stop, PageStop::PageCap { pages: 3 });
        assert_eq!(outcome.listings.len(), 3);
    }

    #[tokio::test]
    async fn test_enrichment() {
        let board = FakeBoard::new(vec![page(vec![
            posting(1, FUTURE, 41, "Chofer", "Licencia"),
            json!({"puesto": {
                "id": "abc",
                "fechaVencimiento": FUTURE,
                "idProvincia": 41,
                "salarioOfrecido": null,
                "cantidad": 1
            }}),
        ])]);

        let outcome = fetch(&board).await;
        let first = &outcome.listings[0];
        let second = &outcome.listings[1];

        assert_eq!(first.salary_text, "RD$ 25,000");
        assert_eq!(first.quantity_text, "2 Slots available");
        assert_eq!(first.expiration_date_text, "27 August 2030");
        assert_eq!(first.benefits, "Seguro médico");

        assert_eq!(second.id, ListingId::from("abc"));
        assert_eq!(second.title, "not specified");
        assert_eq!(second.description, "not specified");
        assert_eq!(second.salary_text, "not specified");
        assert_eq!(second.quantity_text, "1 Slot available");
    }

    #[tokio::test]
    async fn test_loosely_typed_optional_fields_are_kept() {
        let board = FakeBoard::new(vec![page(vec![
            json!({"puesto": {"id": 1, "fechaVencimiento": FUTURE, "idProvincia": 41,
                              "titulo": "Chofer", "cantidad": "2"}}),
            json!({"puesto": {"id": 2, "fechaVencimiento": FUTURE, "idProvincia": 41,
                              "titulo": "Cajero", "cantidad": 2.0}}),
            json!({"puesto": {"id": 3, "fechaVencimiento": FUTURE, "idProvincia": 41,
                              "titulo": 12345, "descripcion": {"html": "x"}}}),
        ])]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[1, 2, 3]));
        assert_eq!(outcome.rejected.total(), 0);
        assert_eq!(outcome.listings[0].quantity_text, "2 Slots available");
        assert_eq!(outcome.listings[1].quantity_text, "2 Slots available");
        assert_eq!(outcome.listings[2].title, "12345");
        assert_eq!(outcome.listings[2].description, "not specified");
        assert_eq!(outcome.listings[2].quantity_text, "not specified");
    }

    #[tokio::test]
    async fn test_integral_float_region_is_allowed() {
        let board = FakeBoard::new(vec![page(vec![
            json!({"puesto": {"id": 1, "fechaVencimiento": FUTURE, "idProvincia": 41.0}}),
        ])]);

        let outcome = fetch(&board).await;

        assert_eq!(ids(&outcome), id_list(&[1]));
        assert_eq!(outcome.listings[0].region_id, 41);
    }

    #[test]
    fn test_parse_expiration_formats() {
        let with_offset = parse_expiration("2025-08-27T23:30:00-04:00").unwrap();
        assert_eq!(with_offset.day(), 27);
        assert_eq!(with_offset.offset().local_minus_utc(), -4 * 3600);

        let minutes_only = parse_expiration("2025-08-27T23:30+02:00").unwrap();
        assert_eq!(minutes_only.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(minutes_only.naive_local().to_string(), "2025-08-27 23:30:00");

        let naive = parse_expiration("2025-08-27T23:30:00.123").unwrap();
        assert_eq!((naive.day(), naive.month(), naive.year()), (27, 8, 2025));

        let spaced = parse_expiration("2025-08-27 10:00:00").unwrap();
        assert_eq!(spaced.day(), 27);

        let date_only = parse_expiration("2025-08-27").unwrap();
        assert_eq!(date_only.naive_local().time(), chrono::NaiveTime::MIN);

        assert!(parse_expiration("27/08/2025").is_none());
        assert!(parse_expiration("").is_none());
    }

    #[test]
    fn test_format_date_uses_locale_months() {
        let date = parse_expiration("2025-08-27T10:00:00Z").unwrap();
        assert_eq!(format_date(&date, &LocaleConfig::default()), "27 August 2025");

        let mut spanish = LocaleConfig::default();
        spanish.months[7] = "Agosto".into();
        assert_eq!(format_date(&date, &spanish), "27 Agosto 2025");
    }
}
