//! Deduplication and final ordering of catalog hits.

use std::collections::HashSet;

use crate::catalog::{CatalogHit, Track};

/// Collapse duplicate ids (first occurrence wins), then order by provider
/// rank ascending with popularity descending as the tie-break, keeping at
/// most `limit` tracks. The sort is stable, so hits equal on both keys stay
/// in provider order.
pub fn dedup_and_rank(hits: Vec<CatalogHit>, limit: usize) -> Vec<Track> {
    let mut seen = HashSet::with_capacity(hits.len());
    let mut unique: Vec<CatalogHit> = hits
        .into_iter()
        .filter(|hit| seen.insert(hit.track.id.clone()))
        .collect();

    unique.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| b.track.popularity.cmp(&a.track.popularity))
    });

    unique.into_iter().take(limit).map(|hit| hit.track).collect()
}

/// Append broadened-retry hits after the first-attempt tracks.
///
/// Retry hits are ranked among themselves; ids already present are skipped.
pub fn merge_broadened(mut primary: Vec<Track>, retry: Vec<CatalogHit>, limit: usize) -> Vec<Track> {
    let present: HashSet<&str> = primary.iter().map(|t| t.id.as_str()).collect();
    let fresh: Vec<CatalogHit> = retry
        .into_iter()
        .filter(|hit| !present.contains(hit.track.id.as_str()))
        .collect();

    let room = limit.saturating_sub(primary.len());
    let extra = dedup_and_rank(fresh, room);

    primary.extend(extra);
    primary.truncate(limit);
    primary
}
