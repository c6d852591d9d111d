//! Round-Robin-Rank rule set.
//!
//! Contract:
//! - HALF:  0.5 to the top eligible row.
//! - UNIT:  1 to the top eligible row.
//! - MULTI(k):
//!     * eligible >= k → 1 each to the top-k eligible rows by weight (first-seen ties).
//!     * 1 <= eligible < k → `round_robin_fill` over the eligible rows: each row is
//!       capped at `round_half_even(weight * k)` slots; units are granted in
//!       descending-weight passes until k is exhausted or no row has room.
//!       A shortfall is left for the balance corrector.
//! - No eligible rows, or NONE → all zeros.

use fx_core::determinism::{rank_desc, rank_desc_where};
use fx_core::numeric::{round_half_even, to_units};
use fx_core::AllocationVariant;

use super::top_pick::top_pick;
use crate::{Allocator, GroupInput, Regime};

/// Result of a capped round-robin distribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundRobinFill {
    pub units: Vec<u32>,
    /// Per-row slot caps (`round_half_even(weight * k)`).
    pub caps: Vec<u32>,
    /// Units that could not be placed because every row hit its cap.
    pub shortfall: u32,
}

/// Proportional slot caps, rounded half to even.
pub fn slot_caps(weights: &[f64], k: u32) -> Vec<u32> {
    weights
        .iter()
        .map(|&w| to_units(round_half_even(w * k as f64)))
        .collect()
}

/// Distribute `k` units over `weights` respecting `slot_caps`.
///
/// Units go one per row per pass in descending-weight order. Full passes over
/// the rows that still have room are granted in bulk.
pub fn round_robin_fill(weights: &[f64], k: u32) -> RoundRobinFill {
    let caps = slot_caps(weights, k);
    let order = rank_desc(weights);

    let mut units = vec![0u32; weights.len()];
    let mut remaining = k;

    while remaining > 0 {
        let open: Vec<usize> = order.iter().copied().filter(|&i| units[i] < caps[i]).collect();
        let Some(min_room) = open.iter().map(|&i| caps[i] - units[i]).min() else {
            break;
        };
        let m = open.len() as u32;

        if remaining >= m {
            let passes = (remaining / m).min(min_room);
            for &i in &open {
                units[i] += passes;
            }
            remaining -= passes * m;
        } else {
            for &i in open.iter().take(remaining as usize) {
                units[i] += 1;
            }
            remaining = 0;
        }
    }

    RoundRobinFill { units, caps, shortfall: remaining }
}

/// Legacy rule set: single winners for small targets, top-k or capped round-robin above.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobinRank;

impl Allocator for RoundRobinRank {
    fn variant(&self) -> AllocationVariant {
        AllocationVariant::RoundRobin
    }

    fn allocate(&self, group: &GroupInput<'_>) -> Vec<f64> {
        let weights = group.weights;
        let mut out = vec![0.0; weights.len()];

        match group.regime {
            Regime::None => {}
            Regime::Half => {
                if let Some(i) = top_pick(weights) {
                    out[i] = 0.5;
                }
            }
            Regime::Unit => {
                if let Some(i) = top_pick(weights) {
                    out[i] = 1.0;
                }
            }
            Regime::Multi(k) => {
                let eligible = rank_desc_where(weights, |i| weights[i] > 0.0);
                if eligible.is_empty() || k == 0 {
                    return out;
                }
                if eligible.len() >= k as usize {
                    for &i in eligible.iter().take(k as usize) {
                        out[i] = 1.0;
                    }
                } else {
                    // Fill runs over eligible rows in first-seen order.
                    let mut positions: Vec<usize> = eligible;
                    positions.sort_unstable();
                    let sub: Vec<f64> = positions.iter().map(|&i| weights[i]).collect();
                    let fill = round_robin_fill(&sub, k);
                    for (&i, &u) in positions.iter().zip(&fill.units) {
                        out[i] = u as f64;
                    }
                }
            }
        }
        out
    }
}
