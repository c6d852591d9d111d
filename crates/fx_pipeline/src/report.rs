//! Run report: per-group diagnostics, warnings, totals, and digests.
//! Serialized as canonical JSON by the CLI.

use std::collections::BTreeSet;

use fx_core::{GroupKey, Params, Regime};
use serde::{Deserialize, Serialize};

/// Anything about a group that a reviewer should see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum GroupWarning {
    /// Negative target, or a fraction in (0, 1) other than 0.5. Nothing allocated.
    NonContractTarget { target: f64 },
    /// Target above 1 with a fractional part; allocated as whole units.
    FractionalTarget { target: f64, units: u32 },
    /// Target too large to allocate as whole units. Nothing allocated.
    TargetOutOfRange { target: f64 },
    /// Member rows disagree on the target; the first row's value was used.
    InconsistentTarget { used: f64, other: f64 },
    /// A target was requested but no row has weight > 0.
    NoEligibleRows { target: f64 },
    /// Units still missing after correction.
    UnresolvedDeficit { missing: f64 },
    /// Allocated beyond the target.
    Overshoot { excess: f64 },
}

impl GroupWarning {
    /// Deficits, overshoots, and unallocatable targets break the group-sum invariant.
    pub fn breaks_invariant(&self) -> bool {
        matches!(
            self,
            GroupWarning::UnresolvedDeficit { .. } | GroupWarning::Overshoot { .. } | GroupWarning::TargetOutOfRange { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub key: GroupKey,
    pub target: f64,
    pub regime: Regime,
    pub rows: usize,
    pub eligible: usize,
    /// Distinct non-empty ART values (present when ART is mapped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_art: Option<usize>,
    pub expected_sum: f64,
    pub allocated_sum: f64,
    /// Units added by the balance corrector.
    pub corrected_units: u32,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<GroupWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTotals {
    pub groups: usize,
    pub rows: usize,
    pub allocated_total: f64,
    pub warnings: usize,
    pub invariant_breaks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub engine: String,
    pub params: Params,
    pub input_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sha256: Option<String>,
    pub totals: RunTotals,
    pub groups: Vec<GroupReport>,
}

impl RunReport {
    pub fn new(params: Params, input_sha256: String, groups: Vec<GroupReport>) -> Self {
        let mut totals = RunTotals { groups: groups.len(), ..RunTotals::default() };
        for g in &groups {
            totals.rows += g.rows;
            totals.allocated_total += g.allocated_sum;
            totals.warnings += g.warnings.len();
            totals.invariant_breaks += g.warnings.iter().filter(|w| w.breaks_invariant()).count();
        }
        Self {
            engine: crate::engine_identifier(),
            params,
            input_sha256,
            output_sha256: None,
            totals,
            groups,
        }
    }

    pub fn has_invariant_breaks(&self) -> bool {
        self.totals.invariant_breaks > 0
    }

    pub fn warnings(&self) -> impl Iterator<Item = (&GroupKey, &GroupWarning)> {
        self.groups.iter().flat_map(|g| g.warnings.iter().map(move |w| (&g.key, w)))
    }
}

/// Count distinct non-empty ART tokens.
pub fn distinct_art<'a, I>(arts: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    arts.into_iter().filter(|a| !a.is_empty()).collect::<BTreeSet<_>>().len()
}
