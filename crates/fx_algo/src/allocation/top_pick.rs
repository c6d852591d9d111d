//! Highest-weight picks among eligible rows (weight > 0).
//!
//! Contract:
//! - Only rows with a strictly positive weight are candidates.
//! - The strictly highest weight wins; equal weights resolve to the first-seen row.
//! - No candidate → `None`.

use fx_core::determinism::{first_max, rank_desc_where};

/// Position of the top eligible row.
pub fn top_pick(weights: &[f64]) -> Option<usize> {
    first_max(weights, (0..weights.len()).filter(|&i| weights[i] > 0.0))
}

/// Up to two top eligible rows, best first.
pub fn top_two(weights: &[f64]) -> Vec<usize> {
    let mut ranked = rank_desc_where(weights, |i| weights[i] > 0.0);
    ranked.truncate(2);
    ranked
}
