// src/testing.rs

//! In-memory collaborators shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::upstream::{ConceptsResponse, ListingPage, RegionsResponse};
use crate::models::{Listing, ListingId};
use crate::services::{JobBoardApi, Notifier};

fn outage(what: &str) -> AppError {
    AppError::Io(std::io::Error::other(format!("{what}: connection refused")))
}

/// Job board serving canned pages. `None` pages fail; pages past the end
/// come back empty.
pub struct FakeBoard {
    pages: Vec<Option<Value>>,
    concepts: Option<Value>,
    regions: Option<Value>,
    requested: Mutex<Vec<u32>>,
}

impl FakeBoard {
    pub fn new(pages: Vec<Option<Value>>) -> Self {
        Self {
            pages,
            concepts: None,
            regions: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// A board whose every page is full, for exercising the page cap.
    pub fn endless(record: Value) -> Self {
        let page = json!({ "data": [record] });
        Self::new(vec![Some(page); 1000])
    }

    pub fn with_concepts(mut self, concepts: Value) -> Self {
        self.concepts = Some(concepts);
        self
    }

    pub fn with_regions(mut self, regions: Value) -> Self {
        self.regions = Some(regions);
        self
    }

    /// Page indices requested so far, in order.
    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobBoardApi for FakeBoard {
    async fn fetch_page(&self, page_index: u32, _page_size: u32) -> Result<ListingPage> {
        self.requested.lock().unwrap().push(page_index);
        match self.pages.get(page_index as usize - 1) {
            Some(Some(page)) => Ok(serde_json::from_value(page.clone())?),
            Some(None) => Err(outage(&format!("page {page_index}"))),
            None => Ok(ListingPage {
                data: Some(Vec::new()),
            }),
        }
    }

    async fn fetch_concepts(&self) -> Result<ConceptsResponse> {
        match &self.concepts {
            Some(v) => Ok(serde_json::from_value(v.clone())?),
            None => Err(outage("concepts")),
        }
    }

    async fn fetch_regions(&self) -> Result<RegionsResponse> {
        match &self.regions {
            Some(v) => Ok(serde_json::from_value(v.clone())?),
            None => Err(outage("regions")),
        }
    }
}

/// Notifier that records every digest it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Vec<ListingId>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Vec<ListingId>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, listings: &[Listing]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(listings.iter().map(|l| l.id.clone()).collect());
        if self.fail {
            return Err(AppError::notify("digest", "relay rejected message"));
        }
        Ok(())
    }
}

/// An enriched listing with fixed display fields.
pub fn listing(id: i64, title: &str, description: &str) -> Listing {
    Listing {
        id: ListingId::Number(id),
        title: title.to_string(),
        description: description.to_string(),
        benefits: "not specified".into(),
        requirements: "not specified".into(),
        salary_text: "not specified".into(),
        quantity_text: "1 Slot available".into(),
        expiration_date: DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z").unwrap(),
        expiration_date_text: "1 January 2030".into(),
        region_id: 41,
        region_text: "Santiago".into(),
    }
}

/// One upstream record in page format.
pub fn posting(id: i64, expires: &str, region: i64, title: &str, description: &str) -> Value {
    json!({
        "puesto": {
            "id": id,
            "fechaVencimiento": expires,
            "idProvincia": region,
            "salarioOfrecido": 1,
            "titulo": title,
            "descripcion": description,
            "beneficiosGenerales": "Seguro médico",
            "requisitosGenerales": "Bachiller",
            "cantidad": 2
        }
    })
}

/// A page wrapping the given records.
pub fn page(records: Vec<Value>) -> Option<Value> {
    Some(json!({ "data": records }))
}

/// Numeric listing ids.
pub fn id_list(ids: &[i64]) -> Vec<ListingId> {
    ids.iter().map(|&id| ListingId::Number(id)).collect()
}
