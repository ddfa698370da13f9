//! Keyword taxonomy: category name to keyword list.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::utils::text::normalize_value;

/// Keywords grouped by category.
///
/// Categories are informational only; matching uses the flattened set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct KeywordTaxonomy {
    pub categories: BTreeMap<String, Vec<Value>>,
}

impl KeywordTaxonomy {
    /// Load a taxonomy from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load a taxonomy, or an empty one if the file is missing or invalid.
    ///
    /// An empty taxonomy lets nothing through the keyword filter.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::error!(
                "Keyword taxonomy load failed from {:?}: {}. No listing will match.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Build a taxonomy from string keywords.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>) -> Self {
        let categories = pairs
            .into_iter()
            .map(|(category, words)| {
                (
                    category.to_string(),
                    words.into_iter().map(|w| Value::String(w.to_string())).collect(),
                )
            })
            .collect();
        Self { categories }
    }

    /// Flatten every category into one set of normalized keywords.
    ///
    /// Non-string entries and keywords that normalize to `""` are dropped;
    /// an empty keyword would otherwise match every listing.
    pub fn normalized_keywords(&self) -> BTreeSet<String> {
        self.categories
            .values()
            .flatten()
            .map(normalize_value)
            .filter(|k| !k.trim().is_empty())
            .collect()
    }

    /// Number of usable keywords after normalization and deduplication.
    pub fn keyword_count(&self) -> usize {
        self.normalized_keywords().len()
    }

    /// Check that at least one keyword can match; returns the usable count.
    pub fn validate(&self) -> Result<usize> {
        match self.keyword_count() {
            0 => Err(AppError::validation(
                "keyword taxonomy has no usable keywords; no listing would match",
            )),
            n => Ok(n),
        }
    }
}
