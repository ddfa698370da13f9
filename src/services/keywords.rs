// src/services/keywords.rs

//! Keyword relevance filter.

use std::collections::BTreeSet;

use crate::models::{KeywordTaxonomy, Listing};
use crate::utils::text::normalize;

/// Matches listings against a flattened, normalized keyword set.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: BTreeSet<String>,
}

impl KeywordFilter {
    pub fn new(taxonomy: &KeywordTaxonomy) -> Self {
        Self {
            keywords: taxonomy.normalized_keywords(),
        }
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Whether any keyword occurs in the normalized title and description.
    ///
    /// With no keywords nothing matches.
    pub fn matches(&self, listing: &Listing) -> bool {
        let text = format!(
            "{} {}",
            normalize(&listing.title),
            normalize(&listing.description)
        );
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// Keep the matching listings, preserving their order.
    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        if self.keywords.is_empty() {
            return Vec::new();
        }
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Convenience function to filter listings by a taxonomy.
pub fn filter_by_keywords(listings: Vec<Listing>, taxonomy: &KeywordTaxonomy) -> Vec<Listing> {
    KeywordFilter::new(taxonomy).apply(listings)
}
