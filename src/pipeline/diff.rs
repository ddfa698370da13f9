//! Delta calculation against the seen-id set.
//!
//! Computes which filtered listings have not been notified yet, keeping
//! their filtered order.

use std::collections::HashSet;

use crate::models::{Listing, ListingId};
use crate::storage::SeenIds;

/// Listings split into new and already-notified.
#[derive(Debug, Clone, Default)]
pub struct Delta {
    /// Listings to notify, in filtered order
    pub new_listings: Vec<Listing>,
    /// Count of filtered listings whose id was already seen
    pub already_seen: usize,
    /// Count of repeated ids within this run
    pub duplicates: usize,
}

impl Delta {
    /// Check if there is anything to notify.
    pub fn has_changes(&self) -> bool {
        !self.new_listings.is_empty()
    }

    /// Ids of the new listings, in order.
    pub fn new_ids(&self) -> impl Iterator<Item = &ListingId> {
        self.new_listings.iter().map(|l| &l.id)
    }

    /// The seen set after this delta is committed.
    pub fn merged_into(&self, seen: &SeenIds) -> SeenIds {
        let mut merged = seen.clone();
        merged.extend(self.new_ids().cloned());
        merged
    }
}

/// Calculate the delta between filtered listings and the seen set.
///
/// An id that occurs more than once in `filtered` is kept at its first
/// position only.
pub fn calculate_delta(filtered: Vec<Listing>, seen: &SeenIds) -> Delta {
    let mut delta = Delta::default();
    let mut taken: HashSet<ListingId> = HashSet::new();

    for listing in filtered {
        if seen.contains(&listing.id) {
            delta.already_seen += 1;
        } else if !taken.insert(listing.id.clone()) {
            delta.duplicates += 1;
        } else {
            delta.new_listings.push(listing);
        }
    }

    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{id_list, listing};

    fn seen(ids: &[i64]) -> SeenIds {
        ids.iter().map(|&id| ListingId::from(id)).collect()
    }

    fn new_ids(delta: &Delta) -> Vec<ListingId> {
        delta.new_ids().cloned().collect()
    }

    #[test]
    fn test_empty_seen_set_takes_everything() {
        let filtered = vec![listing(3, "a", ""), listing(1, "b", ""), listing(2, "c", "")];
        let delta = calculate_delta(filtered, &SeenIds::new());

        assert!(delta.has_changes());
        assert_eq!(new_ids(&delta), id_list(&[3, 1, 2]));
        assert_eq!(delta.already_seen, 0);
    }

    #[test]
    fn test_seen_ids_are_excluded_in_order() {
        let filtered = vec![
            listing(5, "a", ""),
            listing(6, "b", ""),
            listing(7, "c", ""),
            listing(8, "d", ""),
        ];
        let delta = calculate_delta(filtered, &seen(&[6, 8, 100]));

        assert_eq!(new_ids(&delta), id_list(&[5, 7]));
        assert_eq!(delta.already_seen, 2);
    }

    #[test]
    fn test_everything_seen_means_no_changes() {
        let delta = calculate_delta(vec![listing(1, "a", "")], &seen(&[1]));
        assert!(!delta.has_changes());
        assert_eq!(delta.merged_into(&seen(&[1])), seen(&[1]));
    }

    #[test]
    fn test_repeated_ids_keep_first_occurrence() {
        let filtered = vec![
            listing(1, "first", ""),
            listing(2, "b", ""),
            listing(1, "again", ""),
        ];
        let delta = calculate_delta(filtered, &SeenIds::new());

        assert_eq!(new_ids(&delta), id_list(&[1, 2]));
        assert_eq!(delta.new_listings[0].title, "first");
        assert_eq!(delta.duplicates, 1);
    }

    #[test]
    fn test_merge_grows_monotonically() {
        let previous = seen(&[1, 2]);
        let delta = calculate_delta(vec![listing(3, "a", ""), listing(2, "b", "")], &previous);

        let merged = delta.merged_into(&previous);
        assert_eq!(merged, seen(&[1, 2, 3]));
        assert!(previous.is_subset(&merged));
    }
}
