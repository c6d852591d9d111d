//! fx_core: core types, numeric coercion, regimes, and ordering helpers.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! workspace (`fx_algo`, `fx_io`, `fx_pipeline`, `fx_cli`).
//!
//! - Grouping: `KeyField`, `GroupKey`
//! - Input rows: `Row` (weight = CONT%, group_target = MC_FIX)
//! - Numerics: lenient coercion, tolerant comparison, round-half-to-even
//! - Target regimes: `Regime` (HALF / UNIT / MULTI(k) / NONE)
//! - Run parameters: `Params` with serde wire tokens
//! - Deterministic ranking helpers (first-seen on ties)

#![forbid(unsafe_code)]

pub mod determinism;
pub mod ids;
pub mod regime;
pub mod variables;

pub use ids::{GroupKey, KeyField};
pub use regime::{classify_target, Regime, TargetClass, TargetNote};
pub use variables::{AllocationVariant, CorrectionMode, Params};

pub mod errors {
    use thiserror::Error;

    /// Domain and parameter errors raised by core types.
    #[derive(Clone, Debug, PartialEq, Error)]
    pub enum CoreError {
        #[error("domain out of range: {name} = {value}")]
        DomainOutOfRange { name: &'static str, value: f64 },
        #[error("unknown wire token for {name}: {token}")]
        UnknownToken { name: &'static str, token: String },
    }
}

pub use errors::CoreError;

pub mod numeric {
    //! Lenient numeric coercion and tolerant float helpers.
    //!
    //! Coercion mirrors a "to numeric, errors become 0" policy: whitespace is
    //! trimmed, anything that does not parse, and any non-finite value, maps to 0.

    /// Default tolerance for target classification and remainder thresholds.
    pub const DEFAULT_EPSILON: f64 = 1e-9;

    /// Parse a cell as a finite number. `None` for empty, non-numeric or non-finite input.
    pub fn parse_number(cell: &str) -> Option<f64> {
        let t = cell.trim();
        if t.is_empty() {
            return None;
        }
        match t.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }

    /// Coerce a cell to a number; anything unparseable becomes 0.
    #[inline]
    pub fn coerce_number(cell: &str) -> f64 {
        parse_number(cell).unwrap_or(0.0)
    }

    /// Clamp to `[0, ∞)`. NaN maps to 0.
    #[inline]
    pub fn clamp_non_negative(v: f64) -> f64 {
        if v > 0.0 { v } else { 0.0 }
    }

    #[inline]
    pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    /// Round half to even (`round(2.5) == 2`, `round(3.5) == 4`).
    #[inline]
    pub fn round_half_even(x: f64) -> f64 {
        x.round_ties_even()
    }

    /// Floor that absorbs drift just below an integer (`2.9999999999` → 3 for eps 1e-9).
    #[inline]
    pub fn floor_tolerant(x: f64, eps: f64) -> f64 {
        (x + eps).floor()
    }

    /// Integer units from a non-negative float, saturating at `u32::MAX`.
    #[inline]
    pub fn to_units(x: f64) -> u32 {
        if x <= 0.0 {
            0
        } else if x >= u32::MAX as f64 {
            u32::MAX
        } else {
            x as u32
        }
    }
}

/// One input row as seen by the allocation core.
///
/// Raw record fields stay with the table owner (fx_io); the core only needs the
/// key, the two coerced numerics and the ART token used for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub key: GroupKey,
    pub art: Option<String>,
    /// CONT%, clamped to `[0, ∞)`.
    pub weight: f64,
    /// MC_FIX as coerced (sign kept so non-contract targets can be flagged).
    pub group_target: f64,
}

impl Row {
    pub fn new(key: GroupKey, weight: f64, group_target: f64) -> Self {
        Self {
            key,
            art: None,
            weight: numeric::clamp_non_negative(weight),
            group_target: if group_target.is_finite() { group_target } else { 0.0 },
        }
    }

    pub fn with_art(mut self, art: impl Into<String>) -> Self {
        self.art = Some(art.into());
        self
    }

    /// Eligible rows carry a strictly positive weight.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        self.weight > 0.0
    }
}
