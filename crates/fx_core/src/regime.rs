//! Target regimes.
//!
//! Contract:
//! - `target ≈ 0.5` → `Half`
//! - `target ≈ 1`   → `Unit`
//! - `target > 1`   → `Multi(k)` with `k = floor(target)` (fractional part dropped, noted)
//! - `floor(target) > u32::MAX` → `None`, noted as out of range
//! - anything else  → `None` (no allocation). `0` is a silent no-op; negative
//!   values and fractions in `(0, 1)` other than 0.5 are noted as non-contract.
//!
//! Comparisons use an explicit tolerance so values coerced from free text with
//! float drift still land in the intended regime.

use serde::{Deserialize, Serialize};

use crate::numeric::{approx_eq, floor_tolerant, to_units};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "units", rename_all = "snake_case")]
pub enum Regime {
    None,
    Half,
    Unit,
    Multi(u32),
}

impl Regime {
    /// Sum the group must reach after allocation (0 for `None`).
    pub fn expected_sum(self) -> f64 {
        match self {
            Regime::None => 0.0,
            Regime::Half => 0.5,
            Regime::Unit => 1.0,
            Regime::Multi(k) => k as f64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Regime::None => "none",
            Regime::Half => "half",
            Regime::Unit => "unit",
            Regime::Multi(_) => "multi",
        }
    }
}

/// Why a target was not taken at face value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetNote {
    /// Negative, or in `(0, 1)` but not 0.5.
    NonContract { target: f64 },
    /// `target > 1` with a fractional part; allocated as `floor(target)`.
    FractionalTruncated { target: f64, units: u32 },
    /// Whole units exceed what a group can be allocated (`u32::MAX`). Nothing allocated.
    OutOfRange { target: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetClass {
    pub target: f64,
    pub regime: Regime,
    pub note: Option<TargetNote>,
}

/// Classify a group target under tolerance `eps`.
pub fn classify_target(target: f64, eps: f64) -> TargetClass {
    let class = |regime, note| TargetClass { target, regime, note };

    if !target.is_finite() || approx_eq(target, 0.0, eps) {
        return class(Regime::None, None);
    }
    if approx_eq(target, 0.5, eps) {
        return class(Regime::Half, None);
    }
    if approx_eq(target, 1.0, eps) {
        return class(Regime::Unit, None);
    }
    if target > 1.0 {
        let whole = floor_tolerant(target, eps);
        if whole > u32::MAX as f64 {
            return class(Regime::None, Some(TargetNote::OutOfRange { target }));
        }
        let k = to_units(whole);
        let note = if approx_eq(target, whole, eps) {
            None
        } else {
            Some(TargetNote::FractionalTruncated { target, units: k })
        };
        return class(Regime::Multi(k), note);
    }
    class(Regime::None, Some(TargetNote::NonContract { target }))
}
