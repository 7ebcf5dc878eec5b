//! Query families over a [`RepoProjection`](crate::graph::projection::RepoProjection).
//!
//! Every function here is a pure reader: it takes an already-built projection
//! and returns ranked, capped records.

pub mod collaboration;
pub mod contributions;
pub mod distribution;
pub mod replacement;
pub mod roles;

use std::cmp::Ordering;

/// Descending by score, ties broken by handle ascending.
pub(crate) fn by_score_then_handle(a_score: f64, a_handle: &str, b_score: f64, b_handle: &str) -> Ordering {
    b_score
        .total_cmp(&a_score)
        .then_with(|| a_handle.cmp(b_handle))
}
