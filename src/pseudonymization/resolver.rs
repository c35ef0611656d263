//! Conflict resolution between overlapping candidates
//!
//! 1. Identical candidates (same range and category) are collapsed.
//! 2. A candidate that strictly contains a higher-priority candidate is
//!    dropped, so a loose name run can never swallow a BSN, a date or a place.
//! 3. The rest is sorted by start (ascending), length (descending) and
//!    category priority, then swept left to right. A candidate is accepted only
//!    if it starts at or after the end of the last accepted span.
//!
//! Steps 2 and 3 count their losers as `overlaps_discarded`.

use crate::pseudonymization::models::Span;
use std::cmp::Ordering;

/// Non-overlapping substitution plan for one document
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Accepted spans in document order
    pub spans: Vec<Span>,
    /// Candidates that lost to an overlapping or contained candidate
    pub overlaps_discarded: usize,
}

fn precedence(a: &Span, b: &Span) -> Ordering {
    a.start()
        .cmp(&b.start())
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.category().priority().cmp(&b.category().priority()))
        .then_with(|| b.confidence().total_cmp(&a.confidence()))
}

/// Merge candidates from all recognizers into a non-overlapping span list
pub fn resolve(mut candidates: Vec<Span>) -> Resolution {
    candidates.sort_by(precedence);
    // after sorting, identical ranges of one category are adjacent and the
    // most confident one comes first
    candidates.dedup_by(|later, earlier| {
        later.start() == earlier.start()
            && later.end() == earlier.end()
            && later.category() == earlier.category()
    });

    let contained_losers: Vec<bool> = candidates
        .iter()
        .map(|outer| {
            candidates.iter().any(|inner| {
                outer.strictly_contains(inner)
                    && inner.category().priority() < outer.category().priority()
            })
        })
        .collect();

    let mut resolution = Resolution::default();
    let mut last_end = 0usize;

    for (candidate, contains_stronger) in candidates.into_iter().zip(contained_losers) {
        if contains_stronger {
            tracing::trace!(
                category = %candidate.category(),
                start = candidate.start(),
                "Candidate discarded: contains a higher-priority span"
            );
            resolution.overlaps_discarded += 1;
            continue;
        }

        if candidate.start() < last_end {
            tracing::trace!(
                category = %candidate.category(),
                start = candidate.start(),
                "Candidate discarded: overlaps an accepted span"
            );
            resolution.overlaps_discarded += 1;
            continue;
        }

        last_end = candidate.end();
        resolution.spans.push(candidate);
    }

    resolution
}
