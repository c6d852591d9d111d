//! Largest-Remainder-Balanced rule set.
//!
//! Contract:
//! - HALF:  0.5 to the top eligible row.
//! - UNIT:  one eligible row → 1; two or more → 0.5 each to the top two.
//! - MULTI(k): largest remainder over *all* member rows (zero weights included),
//!   self-balancing to exactly k. Groups with no eligible row stay at zero
//!   unless `allocate_unweighted_groups` is set.
//! - NONE → all zeros.

use fx_core::numeric::DEFAULT_EPSILON;
use fx_core::variables::DEFAULT_ROUND_UP_THRESHOLD;
use fx_core::{AllocationVariant, Params};

use super::largest_remainder::allocate_largest_remainder;
use super::top_pick::{top_pick, top_two};
use crate::{Allocator, GroupInput, Regime};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LargestRemainderBalanced {
    pub round_up_threshold: f64,
    pub epsilon: f64,
    pub allocate_unweighted_groups: bool,
}

impl Default for LargestRemainderBalanced {
    fn default() -> Self {
        Self {
            round_up_threshold: DEFAULT_ROUND_UP_THRESHOLD,
            epsilon: DEFAULT_EPSILON,
            allocate_unweighted_groups: false,
        }
    }
}

impl LargestRemainderBalanced {
    pub fn from_params(p: &Params) -> Self {
        Self {
            round_up_threshold: p.round_up_threshold,
            epsilon: p.epsilon,
            allocate_unweighted_groups: p.allocate_unweighted_groups,
        }
    }
}

impl Allocator for LargestRemainderBalanced {
    fn variant(&self) -> AllocationVariant {
        AllocationVariant::Balanced
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
                let top = top_two(weights);
                match top.as_slice() {
                    [] => {}
                    [only] => out[*only] = 1.0,
                    [first, second, ..] => {
                        out[*first] = 0.5;
                        out[*second] = 0.5;
                    }
                }
            }
            Regime::Multi(k) => {
                if group.eligible_count() == 0 && !self.allocate_unweighted_groups {
                    return out;
                }
                let units = allocate_largest_remainder(k, weights, self.round_up_threshold, self.epsilon);
                for (slot, u) in out.iter_mut().zip(units) {
                    *slot = u as f64;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(weights: &[f64], regime: Regime) -> Vec<f64> {
        LargestRemainderBalanced::default().allocate(&GroupInput::new(weights, regime))
    }

    #[test]
    fn unit_splits_across_top_two() {
        assert_eq!(run(&[0.2, 0.5, 0.3], Regime::Unit), vec![0.0, 0.5, 0.5]);
        assert_eq!(run(&[0.4, 0.4, 0.4], Regime::Unit), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn unit_with_single_eligible_row_gets_one() {
        assert_eq!(run(&[0.0, 0.9, 0.0], Regime::Unit), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn half_goes_to_top_row_only() {
        assert_eq!(run(&[0.3, 0.3, 0.4], Regime::Half), vec![0.0, 0.0, 0.5]);
        assert_eq!(run(&[0.0, 0.0], Regime::Half), vec![0.0, 0.0]);
    }

    #[test]
    fn multi_is_exact() {
        let w = [0.5, 0.3, 0.2];
        let out = run(&w, Regime::Multi(3));
        assert_eq!(out.iter().sum::<f64>(), 3.0);
        // r = [1.5, 0.9, 0.6] → all round up → [2, 1, 1] = 4 > 3 → trim smallest remainder (0.5, row 0).
        assert_eq!(out, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn multi_with_no_weights_follows_policy() {
        assert_eq!(run(&[0.0, 0.0, 0.0], Regime::Multi(2)), vec![0.0, 0.0, 0.0]);

        let permissive = LargestRemainderBalanced { allocate_unweighted_groups: true, ..Default::default() };
        let out = permissive.allocate(&GroupInput::new(&[0.0, 0.0, 0.0], Regime::Multi(2)));
        assert_eq!(out, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn from_params_copies_tuning() {
        let p = Params { round_up_threshold: 0.5, allocate_unweighted_groups: true, ..Params::default() };
        let a = LargestRemainderBalanced::from_params(&p);
        assert_eq!(a.round_up_threshold, 0.5);
        assert!(a.allocate_unweighted_groups);
    }
}
