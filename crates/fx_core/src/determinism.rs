//! Stable ordering helpers.
//!
//! Every ranking in the engine breaks ties by first-seen (input) order. These
//! helpers rely on `sort_by` being stable and on `f64::total_cmp` so NaN can
//! never make an ordering inconsistent.

use core::cmp::Ordering;

/// Descending comparison on weights.
#[inline]
pub fn cmp_weight_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Positions `0..weights.len()` ordered by weight descending, ties first-seen.
pub fn rank_desc(weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| cmp_weight_desc(weights[a], weights[b]));
    order
}

/// Positions ordered by weight descending, restricted to `filter`.
pub fn rank_desc_where<F>(weights: &[f64], filter: F) -> Vec<usize>
where
    F: Fn(usize) -> bool,
{
    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| filter(i)).collect();
    order.sort_by(|&a, &b| cmp_weight_desc(weights[a], weights[b]));
    order
}

/// First position holding the strictly highest value among `candidates`.
pub fn first_max<I>(weights: &[f64], candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<usize> = None;
    for i in candidates {
        match best {
            None => best = Some(i),
            Some(b) if weights[i].total_cmp(&weights[b]) == Ordering::Greater => best = Some(i),
            Some(_) => {}
        }
    }
    best
}
