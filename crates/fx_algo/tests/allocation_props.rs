//! Property tests over both rule sets: exact sums, half-target exclusivity,
//! caps and non-negativity, and run-to-run determinism.

use fx_algo::allocation::{round_robin_fill, slot_caps};
use fx_algo::{allocator_for, correct, GroupInput};
use fx_core::{classify_target, AllocationVariant, CorrectionMode, Params, Regime};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn weight() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        4 => 0.0f64..1.0,
    ]
}

fn weights(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(weight(), 1..max_len)
}

fn params(variant: AllocationVariant) -> Params {
    Params { variant, ..Params::default() }
}

proptest! {
    #[test]
    fn balanced_multi_sums_to_target(w in weights(12), k in 1u32..40) {
        prop_assume!(w.iter().any(|&x| x > 0.0));
        let alloc = allocator_for(&params(AllocationVariant::Balanced));
        let out = alloc.allocate(&GroupInput::new(&w, Regime::Multi(k)));
        prop_assert_eq!(out.iter().sum::<f64>(), k as f64);
    }

    #[test]
    fn balanced_unit_sums_to_one(w in weights(12)) {
        prop_assume!(w.iter().any(|&x| x > 0.0));
        let alloc = allocator_for(&params(AllocationVariant::Balanced));
        let out = alloc.allocate(&GroupInput::new(&w, Regime::Unit));
        prop_assert_eq!(out.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn balanced_unweighted_groups_sum_when_enabled(n in 1usize..10, k in 1u32..20) {
        let w = vec![0.0; n];
        let p = Params { allocate_unweighted_groups: true, ..Params::default() };
        let out = allocator_for(&p).allocate(&GroupInput::new(&w, Regime::Multi(k)));
        prop_assert_eq!(out.iter().sum::<f64>(), k as f64);
    }

    #[test]
    fn half_target_is_exclusive(w in weights(12), rr in any::<bool>()) {
        let variant = if rr { AllocationVariant::RoundRobin } else { AllocationVariant::Balanced };
        let out = allocator_for(&params(variant)).allocate(&GroupInput::new(&w, Regime::Half));
        let nonzero: Vec<f64> = out.iter().copied().filter(|&v| v != 0.0).collect();
        prop_assert!(nonzero.len() <= 1);
        if let Some(&v) = nonzero.first() {
            prop_assert_eq!(v, 0.5);
        }
        prop_assert_eq!(nonzero.len(), usize::from(w.iter().any(|&x| x > 0.0)));
    }

    #[test]
    fn round_robin_fill_respects_caps(w in prop::collection::vec(0.01f64..1.0, 1..8), k in 2u32..30) {
        let fill = round_robin_fill(&w, k);
        prop_assert_eq!(&fill.caps, &slot_caps(&w, k));
        for (u, c) in fill.units.iter().zip(&fill.caps) {
            prop_assert!(u <= c);
        }
        prop_assert_eq!(fill.units.iter().sum::<u32>() + fill.shortfall, k);
    }

    #[test]
    fn allocations_are_never_negative(w in weights(12), target in 0.0f64..25.0, rr in any::<bool>()) {
        let variant = if rr { AllocationVariant::RoundRobin } else { AllocationVariant::Balanced };
        let p = params(variant);
        let regime = classify_target(target, EPS).regime;
        let mut out = allocator_for(&p).allocate(&GroupInput::new(&w, regime));
        correct(&mut out, &w, regime, CorrectionMode::Iterative, EPS);
        prop_assert!(out.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn iterative_correction_balances_round_robin(w in weights(10), k in 2u32..30) {
        prop_assume!(w.iter().any(|&x| x > 0.0));
        let mut out = allocator_for(&params(AllocationVariant::RoundRobin))
            .allocate(&GroupInput::new(&w, Regime::Multi(k)));
        let outcome = correct(&mut out, &w, Regime::Multi(k), CorrectionMode::Iterative, EPS);
        prop_assert!(outcome.is_balanced());
        prop_assert_eq!(out.iter().sum::<f64>(), k as f64);
    }

    #[test]
    fn reruns_are_identical(w in weights(12), target in 0.0f64..25.0, rr in any::<bool>()) {
        let variant = if rr { AllocationVariant::RoundRobin } else { AllocationVariant::Balanced };
        let alloc = allocator_for(&params(variant));
        let regime = classify_target(target, EPS).regime;
        let a = alloc.allocate(&GroupInput::new(&w, regime));
        let b = alloc.allocate(&GroupInput::new(&w, regime));
        prop_assert_eq!(a, b);
    }
}

#[test]
fn round_robin_top_k_exactness() {
    let w = [0.4, 0.3, 0.2, 0.1, 0.0];
    let out = allocator_for(&params(AllocationVariant::RoundRobin))
        .allocate(&GroupInput::new(&w, Regime::Multi(3)));
    assert_eq!(out, vec![1.0, 1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn round_robin_shortage_needs_no_correction() {
    let w = [0.7, 0.3];
    let mut out = allocator_for(&params(AllocationVariant::RoundRobin))
        .allocate(&GroupInput::new(&w, Regime::Multi(3)));
    assert_eq!(out, vec![2.0, 1.0]);
    let outcome = correct(&mut out, &w, Regime::Multi(3), CorrectionMode::SingleUnit, EPS);
    assert_eq!(outcome.added, 0);
    assert_eq!(out, vec![2.0, 1.0]);
}

#[test]
fn largest_remainder_threshold_bias() {
    let w = [0.34, 0.33, 0.33];
    let out = allocator_for(&Params::default()).allocate(&GroupInput::new(&w, Regime::Multi(1)));
    assert_eq!(out, vec![1.0, 0.0, 0.0]);
}

#[test]
fn all_zero_weights_with_multi_target_stay_empty() {
    let w = [0.0, 0.0, 0.0];
    for variant in [AllocationVariant::Balanced, AllocationVariant::RoundRobin] {
        let out = allocator_for(&params(variant)).allocate(&GroupInput::new(&w, Regime::Multi(2)));
        assert_eq!(out, vec![0.0; 3], "{variant:?}");
    }
}
