//! Local multi-key re-sort of normalized records.

use crate::model::{PublicationRecord, SortCriterion, SortPriority};
use std::cmp::Ordering;

/// Re-sort `records` in place when a secondary criterion is active.
///
/// Relevance has no local key; the provider order stands for it. The sort
/// is stable, so records equal on every active key keep their fetch order.
pub fn apply_local_sort(records: &mut [PublicationRecord], priority: &SortPriority) {
    if priority.secondary.is_none() {
        return;
    }

    let keys: Vec<SortCriterion> = priority
        .criteria()
        .filter(|c| *c != SortCriterion::Relevance)
        .collect();

    if keys.is_empty() {
        return;
    }

    records.sort_by(|a, b| {
        keys.iter()
            .map(|key| compare_desc(a, b, *key))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

fn compare_desc(a: &PublicationRecord, b: &PublicationRecord, key: SortCriterion) -> Ordering {
    match key {
        SortCriterion::Recency => b.year.cmp(&a.year),
        SortCriterion::CitationCount => b.citation_count.cmp(&a.citation_count),
        SortCriterion::Relevance => Ordering::Equal,
    }
}
