// src/services/reference.rs

//! Reference-data loader.
//!
//! Salary and region tables are best-effort enrichment: a failed fetch
//! leaves the corresponding table empty and the run carries on.

use std::collections::HashMap;

use crate::error::Result;
use crate::models::LocaleConfig;
use crate::models::upstream::{ConceptsResponse, RegionsResponse, code_key};
use crate::services::JobBoardApi;

/// Lookup tables used to enrich listings.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// Salary code to salary band description
    pub salaries: HashMap<String, String>,
    /// Region code to region name
    pub regions: HashMap<String, String>,
}

impl ReferenceData {
    /// Fetch both tables; each one degrades to empty on its own failure.
    pub async fn load(api: &dyn JobBoardApi, locale: &LocaleConfig) -> Self {
        let salaries = collapse(
            "salary",
            api.fetch_concepts()
                .await
                .map(|c| salary_table(c, &locale.salary_range_unspecified)),
        );
        let regions = collapse("region", api.fetch_regions().await.map(region_table));

        log::info!(
            "Reference data: {} salary codes, {} regions",
            salaries.len(),
            regions.len()
        );

        Self { salaries, regions }
    }

    /// Salary text for a code; `None` when the code is null or unmapped.
    pub fn salary(&self, code: Option<&serde_json::Value>) -> Option<&str> {
        code.and_then(code_key)
            .and_then(|k| self.salaries.get(&k))
            .map(String::as_str)
    }

    /// Region name for a code; `None` when unmapped.
    pub fn region(&self, code: i64) -> Option<&str> {
        self.regions.get(&code.to_string()).map(String::as_str)
    }
}

fn collapse(table: &str, result: Result<HashMap<String, String>>) -> HashMap<String, String> {
    result.unwrap_or_else(|e| {
        log::warn!("Failed to fetch {table} table, continuing without it: {e}");
        HashMap::new()
    })
}

/// Entries without a code are skipped; a code without description gets
/// the locale's "range not specified" text.
fn salary_table(concepts: ConceptsResponse, unspecified: &str) -> HashMap<String, String> {
    concepts
        .conceptos
        .salario
        .into_iter()
        .filter_map(|concept| {
            let key = concept.codigo.as_ref().and_then(code_key)?;
            let description = concept
                .descripcion
                .unwrap_or_else(|| unspecified.to_string());
            Some((key, description))
        })
        .collect()
}

fn region_table(regions: RegionsResponse) -> HashMap<String, String> {
    regions
        .into_iter()
        .filter_map(|(code, name)| match name {
            serde_json::Value::String(name) => Some((code, name)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::FakeBoard;

    #[tokio::test]
    async fn test_load_both_tables() {
        let board = FakeBoard::new(vec![])
            .with_concepts(json!({
                "conceptos": {
                    "salario": [
                        {"codigo": 1, "descripcion": "RD$ 10,000 - 20,000"},
                        {"codigo": 2},
                        {"descripcion": "orphan"}
                    ]
                }
            }))
            .with_regions(json!({"41": "Santiago", "42": 7}));

        let data = ReferenceData::load(&board, &LocaleConfig::default()).await;

        assert_eq!(data.salaries.len(), 2);
        assert_eq!(data.salary(Some(&json!(1))), Some("RD$ 10,000 - 20,000"));
        assert_eq!(data.salary(Some(&json!(2))), Some("Range not specified"));
        assert_eq!(data.salary(Some(&json!(9))), None);
        assert_eq!(data.salary(None), None);
        assert_eq!(data.region(41), Some("Santiago"));
        assert_eq!(data.region(42), None);
    }

    #[tokio::test]
    async fn test_failures_degrade_independently() {
        let board = FakeBoard::new(vec![]).with_regions(json!({"190": "Distrito Nacional"}));

        let data = ReferenceData::load(&board, &LocaleConfig::default()).await;

        assert!(data.salaries.is_empty());
        assert_eq!(data.region(190), Some("Distrito Nacional"));
    }

    #[tokio::test]
    async fn test_both_failing_yields_empty() {
        let board = FakeBoard::new(vec![]);
        let data = ReferenceData::load(&board, &LocaleConfig::default()).await;
        assert!(data.salaries.is_empty());
        assert!(data.regions.is_empty());
    }
}
