//! Balance corrector: force a group's allocated sum up to its integer target.
//!
//! Contract:
//! - Applies to UNIT and MULTI regimes only; HALF and NONE are left untouched.
//! - `SingleUnit`: if `target - sum` is exactly one unit and an eligible row
//!   exists, add 1 to the top eligible row (first-seen ties).
//! - `Iterative`: while at least one whole unit is missing, grant one unit per
//!   pass to eligible rows in descending-weight order (whole passes in bulk).
//!   Every eligible row counts as capacity: round-robin slot caps bound the
//!   fill stage only, and correction may place units beyond them.
//! - Never removes units. Whatever remains (missing units, or an overshoot) is
//!   returned for the caller to report.

use fx_core::determinism::rank_desc_where;
use fx_core::numeric::{approx_eq, floor_tolerant, to_units};

use crate::allocation::top_pick::top_pick;
use crate::{CorrectionMode, Regime};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CorrectionOutcome {
    /// Units added by the corrector.
    pub added: u32,
    /// Still missing after correction (0 when balanced).
    pub residual_deficit: f64,
    /// Allocated beyond the target (0 when balanced).
    pub overshoot: f64,
}

impl CorrectionOutcome {
    pub fn is_balanced(&self) -> bool {
        self.residual_deficit == 0.0 && self.overshoot == 0.0
    }
}

/// Correct `values` in place. `weights` and `values` are parallel, in member order.
pub fn correct(
    values: &mut [f64],
    weights: &[f64],
    regime: Regime,
    mode: CorrectionMode,
    eps: f64,
) -> CorrectionOutcome {
    debug_assert_eq!(values.len(), weights.len());

    let target = match regime {
        Regime::Unit | Regime::Multi(_) => regime.expected_sum(),
        Regime::Half | Regime::None => return CorrectionOutcome::default(),
    };

    let mut added = 0u32;
    let deficit = target - values.iter().sum::<f64>();

    match mode {
        CorrectionMode::SingleUnit => {
            if approx_eq(deficit, 1.0, eps) {
                if let Some(i) = top_pick(weights) {
                    values[i] += 1.0;
                    added = 1;
                }
            }
        }
        CorrectionMode::Iterative => {
            let missing = to_units(floor_tolerant(deficit, eps));
            let order = rank_desc_where(weights, |i| weights[i] > 0.0);
            if missing > 0 && !order.is_empty() {
                let n = order.len() as u64;
                let cycles = missing as u64 / n;
                let partial = (missing as u64 % n) as usize;
                for (pos, &i) in order.iter().enumerate() {
                    values[i] += (cycles + u64::from(pos < partial)) as f64;
                }
                added = missing;
            }
        }
    }

    let gap = target - values.iter().sum::<f64>();
    let (residual_deficit, overshoot) = if gap > eps {
        (gap, 0.0)
    } else if gap < -eps {
        (0.0, -gap)
    } else {
        (0.0, 0.0)
    };

    CorrectionOutcome { added, residual_deficit, overshoot }
}
