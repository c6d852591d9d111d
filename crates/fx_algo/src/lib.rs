// crates/fx_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Per-group allocation math. Pure functions over a group's weights (CONT%, in
//! first-seen row order) and its resolved `Regime`; no I/O, no shared state.

pub use fx_core::{AllocationVariant, CorrectionMode, Params, Regime};

// ----------------------------- Strategy surface --------------------------------------

/// One group's allocation input. `weights[i]` belongs to the i-th member row in input order.
#[derive(Clone, Copy, Debug)]
pub struct GroupInput<'a> {
    pub weights: &'a [f64],
    pub regime: Regime,
}

impl<'a> GroupInput<'a> {
    pub fn new(weights: &'a [f64], regime: Regime) -> Self {
        Self { weights, regime }
    }

    pub fn eligible_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0.0).count()
    }
}

/// Interchangeable allocation rule set. Returns one value per member row.
pub trait Allocator {
    fn variant(&self) -> AllocationVariant;
    fn allocate(&self, group: &GroupInput<'_>) -> Vec<f64>;
}

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    pub mod balanced;
    pub mod largest_remainder;
    pub mod round_robin;
    pub mod top_pick;

    pub use balanced::LargestRemainderBalanced;
    pub use largest_remainder::allocate_largest_remainder;
    pub use round_robin::{round_robin_fill, slot_caps, RoundRobinFill, RoundRobinRank};
    pub use top_pick::{top_pick, top_two};
}

pub mod balance;

pub use allocation::{LargestRemainderBalanced, RoundRobinRank};
pub use balance::{correct, CorrectionOutcome};

/// Build the configured strategy.
pub fn allocator_for(params: &Params) -> Box<dyn Allocator + Send + Sync> {
    match params.variant {
        AllocationVariant::Balanced => Box::new(LargestRemainderBalanced::from_params(params)),
        AllocationVariant::RoundRobin => Box::new(RoundRobinRank),
    }
}
