//! Largest Remainder (LR) over a group's weights with a round-up threshold.
//!
//! Contract:
//! - Raw share per row: r_i = w_i * k (every row, zero weights included).
//! - Floors: base_i = floor(r_i); remainders: f_i = r_i - base_i.
//! - Rows with f_i >= threshold round up to base_i + 1 (threshold 0.4 by default).
//! - If the rounded sum < k → distribute leftovers by largest remainder
//!   (remainder ↓, then first-seen), cycling if more units than rows remain.
//! - If the rounded sum > k → trim from smallest remainder among rows that still
//!   hold a unit (remainder ↑, then first-seen), skipping rows already at 0.
//!
//! The result always sums to exactly `k` when `weights` is non-empty.
//! Float comparisons against the threshold and integer boundaries use `eps`.

use fx_core::numeric::{floor_tolerant, to_units};

/// Allocate `k` units over `weights`.
pub fn allocate_largest_remainder(k: u32, weights: &[f64], threshold: f64, eps: f64) -> Vec<u32> {
    if k == 0 || weights.is_empty() {
        return vec![0; weights.len()];
    }

    let (mut alloc, remainders) = floors_and_remainders(k, weights, threshold, eps);

    let sum: u64 = alloc.iter().map(|&s| s as u64).sum();
    if sum < k as u64 {
        distribute_leftovers((k as u64 - sum) as u32, &mut alloc, &remainders);
    } else if sum > k as u64 {
        trim_over_allocation(k, &mut alloc, &remainders);
    }

    debug_assert_eq!(alloc.iter().map(|&s| s as u64).sum::<u64>(), k as u64);
    alloc
}

/// Floors (already rounded up past the threshold) and raw remainders.
fn floors_and_remainders(k: u32, weights: &[f64], threshold: f64, eps: f64) -> (Vec<u32>, Vec<f64>) {
    let mut rounded = Vec::with_capacity(weights.len());
    let mut rems = Vec::with_capacity(weights.len());

    for &w in weights {
        let raw = w * k as f64;
        let base = floor_tolerant(raw, eps);
        let frac = (raw - base).max(0.0);
        let mut units = to_units(base);
        if frac + eps >= threshold {
            units = units.saturating_add(1);
        }
        rounded.push(units);
        rems.push(frac);
    }

    (rounded, rems)
}

/// Stable ranking of positions by remainder; `descending` picks the direction.
fn rank_by_remainder(positions: impl Iterator<Item = usize>, remainders: &[f64], descending: bool) -> Vec<usize> {
    let mut ranking: Vec<usize> = positions.collect();
    ranking.sort_by(|&a, &b| {
        let o = remainders[a].total_cmp(&remainders[b]);
        if descending { o.reverse() } else { o }
    });
    ranking
}

/// Give `extra` units by largest remainder; cycle if `extra` exceeds the row count.
/// Whole cycles are granted in one step.
fn distribute_leftovers(extra: u32, alloc: &mut [u32], remainders: &[f64]) {
    let ranking = rank_by_remainder(0..alloc.len(), remainders, true);
    if ranking.is_empty() {
        return;
    }

    let n = ranking.len() as u64;
    let cycles = (extra as u64 / n) as u32;
    let partial = (extra as u64 % n) as usize;
    for (pos, &i) in ranking.iter().enumerate() {
        alloc[i] = alloc[i].saturating_add(cycles + u32::from(pos < partial));
    }
}

/// Remove units by smallest remainder until the sum equals `target`.
///
/// Same result as cycling one unit at a time over the ranking (skipping rows
/// at zero), but full passes are taken in bulk: each pass removes one unit from
/// every row still holding one, as many passes as the excess and the smallest
/// holding allow.
fn trim_over_allocation(target: u32, alloc: &mut [u32], remainders: &[f64]) {
    let total: u64 = alloc.iter().map(|&s| s as u64).sum();
    let mut excess = total.saturating_sub(target as u64);

    let ranking = rank_by_remainder(0..alloc.len(), remainders, false);

    while excess > 0 {
        let holding: Vec<usize> = ranking.iter().copied().filter(|&i| alloc[i] > 0).collect();
        let Some(min_held) = holding.iter().map(|&i| alloc[i]).min() else {
            return;
        };
        let m = holding.len() as u64;

        if excess >= m {
            let passes = (excess / m).min(min_held as u64);
            for &i in &holding {
                alloc[i] -= passes as u32;
            }
            excess -= passes * m;
        } else {
            for &i in holding.iter().take(excess as usize) {
                alloc[i] -= 1;
            }
            excess = 0;
        }
    }
}
