//! Tie-break policy between two records judged to be the same thing.
//!
//! A comparator returns how the `candidate` ranks against the `incumbent`:
//! [`Ordering::Greater`] replaces the incumbent, anything else keeps it.

use std::cmp::Ordering;

use crate::models::{Citation, Definition};

pub type Preference<T> = fn(candidate: &T, incumbent: &T) -> Ordering;

/// Marker word preferred on otherwise equal citations.
pub const PREFERRED_MARKER: &str = "federal";

/// Higher confidence wins; on equal confidence a text mentioning "federal"
/// beats one that does not.
#[must_use]
pub fn prefer_citation(candidate: &Citation, incumbent: &Citation) -> Ordering {
    candidate
        .confidence
        .total_cmp(&incumbent.confidence)
        .then_with(|| has_marker(&candidate.text).cmp(&has_marker(&incumbent.text)))
}

/// Higher confidence wins; ties keep the incumbent.
#[must_use]
pub fn prefer_definition(candidate: &Definition, incumbent: &Definition) -> Ordering {
    candidate.confidence.total_cmp(&incumbent.confidence)
}

fn has_marker(text: &str) -> bool {
    text.to_lowercase().contains(PREFERRED_MARKER)
}
