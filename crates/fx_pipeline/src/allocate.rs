//! ALLOCATE stage: per-group allocation and balance correction.
//!
//! Input: rows, the group partition, and a `Params` snapshot (variant,
//! correction mode, tolerance). Output: one allocation per row in input order
//! plus one `GroupReport` per group. Each group is computed into its own
//! buffer and merged by row index; no group sees another group's values.

use fx_algo::{allocator_for, correct, Allocator, GroupInput};
use fx_core::{GroupKey, Params, Regime, Row, TargetNote};
use tracing::{debug, warn};

use crate::group::Groups;
use crate::report::{distinct_art, GroupReport, GroupWarning};
use crate::resolve::resolve_target;

/// Allocation values by row index, plus per-group diagnostics in group order.
#[derive(Debug, Clone)]
pub struct Allocations {
    pub values: Vec<f64>,
    pub groups: Vec<GroupReport>,
}

#[derive(Debug, Clone)]
pub struct GroupOutcome {
    /// Parallel to the group's member list.
    pub values: Vec<f64>,
    pub report: GroupReport,
}

pub fn allocate_all(rows: &[Row], groups: &Groups, params: &Params) -> Allocations {
    let allocator = allocator_for(params);
    let mut values = vec![0.0; rows.len()];
    let mut reports = Vec::with_capacity(groups.len());

    for (key, members) in groups {
        let outcome = allocate_group(rows, key, members, allocator.as_ref(), params);
        for (&i, &v) in members.iter().zip(&outcome.values) {
            values[i] = v;
        }
        reports.push(outcome.report);
    }

    Allocations { values, groups: reports }
}

/// Resolve, allocate, and correct one group.
pub fn allocate_group(
    rows: &[Row],
    key: &GroupKey,
    members: &[usize],
    allocator: &dyn Allocator,
    params: &Params,
) -> GroupOutcome {
    let resolved = resolve_target(rows, members, params.epsilon);
    let regime = resolved.class.regime;

    let weights: Vec<f64> = members.iter().map(|&i| rows[i].weight).collect();
    let input = GroupInput::new(&weights, regime);
    let eligible = input.eligible_count();

    let mut values = allocator.allocate(&input);
    let correction = correct(&mut values, &weights, regime, params.correction, params.epsilon);
    let allocated_sum: f64 = values.iter().sum();

    let mut warnings = Vec::new();
    match resolved.class.note {
        Some(TargetNote::NonContract { target }) => warnings.push(GroupWarning::NonContractTarget { target }),
        Some(TargetNote::FractionalTruncated { target, units }) => {
            warnings.push(GroupWarning::FractionalTarget { target, units })
        }
        Some(TargetNote::OutOfRange { target }) => warnings.push(GroupWarning::TargetOutOfRange { target }),
        None => {}
    }
    if let Some(other) = resolved.conflicting {
        warnings.push(GroupWarning::InconsistentTarget { used: resolved.class.target, other });
    }
    if regime != Regime::None && eligible == 0 && allocated_sum == 0.0 {
        warnings.push(GroupWarning::NoEligibleRows { target: resolved.class.target });
    } else if correction.residual_deficit > 0.0 {
        warnings.push(GroupWarning::UnresolvedDeficit { missing: correction.residual_deficit });
    }
    if correction.overshoot > 0.0 {
        warnings.push(GroupWarning::Overshoot { excess: correction.overshoot });
    }

    for w in &warnings {
        warn!(group = %key, warning = ?w, "group flagged");
    }
    debug!(
        group = %key,
        variant = allocator.variant().as_str(),
        regime = regime.as_str(),
        rows = members.len(),
        eligible,
        allocated = allocated_sum,
        corrected = correction.added,
        "group allocated"
    );

    let art_mapped = members.iter().any(|&i| rows[i].art.is_some());
    let art = art_mapped.then(|| distinct_art(members.iter().filter_map(|&i| rows[i].art.as_deref())));

    let report = GroupReport {
        key: key.clone(),
        target: resolved.class.target,
        regime,
        rows: members.len(),
        eligible,
        distinct_art: art,
        expected_sum: regime.expected_sum(),
        allocated_sum,
        corrected_units: correction.added,
        warnings,
    };

    GroupOutcome { values, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::group_rows;
    use fx_core::{AllocationVariant, CorrectionMode};

    fn rows(store: &str, weights: &[f64], target: f64) -> Vec<Row> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                Row::new(GroupKey::from_parts([store, "D", "S", "G", "DEP", "U", "F"]), w, target)
                    .with_art(format!("A{i}"))
            })
            .collect()
    }

    fn rr() -> Params {
        Params { variant: AllocationVariant::RoundRobin, ..Params::default() }
    }

    #[test]
    fn merges_group_values_back_by_index() {
        let mut all = rows("S1", &[0.6, 0.4], 1.0);
        all.extend(rows("S2", &[0.2, 0.8], 0.5));
        all.swap(1, 2); // interleave: S1, S2, S1, S2
        let groups = group_rows(&all);

        let out = allocate_all(&all, &groups, &rr());
        assert_eq!(out.values, vec![1.0, 0.0, 0.0, 0.5]);
        assert_eq!(out.groups.len(), 2);
        assert_eq!(out.groups[0].distinct_art, Some(2));
    }

    #[test]
    fn legacy_single_unit_leaves_and_flags_large_shortfall() {
        let all = rows("S1", &[0.1, 0.2], 4.0);
        let groups = group_rows(&all);
        let p = Params { correction: CorrectionMode::SingleUnit, ..rr() };

        let out = allocate_all(&all, &groups, &p);
        assert_eq!(out.values, vec![0.0, 1.0]);
        assert_eq!(out.groups[0].warnings, vec![GroupWarning::UnresolvedDeficit { missing: 3.0 }]);
    }

    #[test]
    fn iterative_correction_fills_shortfall() {
        let all = rows("S1", &[0.1, 0.2], 4.0);
        let groups = group_rows(&all);

        let out = allocate_all(&all, &groups, &rr());
        assert_eq!(out.values, vec![1.0, 3.0]);
        assert_eq!(out.groups[0].corrected_units, 3);
        assert!(out.groups[0].warnings.is_empty());
    }

    #[test]
    fn zero_weight_group_is_flagged_not_filled() {
        let all = rows("S1", &[0.0, 0.0], 2.0);
        let groups = group_rows(&all);
        let out = allocate_all(&all, &groups, &Params::default());
        assert_eq!(out.values, vec![0.0, 0.0]);
        assert_eq!(out.groups[0].warnings, vec![GroupWarning::NoEligibleRows { target: 2.0 }]);
    }

    #[test]
    fn fractional_and_non_contract_targets_are_reported() {
        let mut all = rows("S1", &[0.5, 0.5], 2.5);
        all.extend(rows("S2", &[0.5, 0.5], 0.75));
        let groups = group_rows(&all);
        let out = allocate_all(&all, &groups, &Params::default());

        assert_eq!(out.groups[0].warnings, vec![GroupWarning::FractionalTarget { target: 2.5, units: 2 }]);
        assert_eq!(out.groups[0].allocated_sum, 2.0);
        assert_eq!(out.groups[1].warnings, vec![GroupWarning::NonContractTarget { target: 0.75 }]);
        assert_eq!(out.groups[1].allocated_sum, 0.0);
    }

    #[test]
    fn oversized_target_is_flagged_and_not_allocated() {
        let all = rows("S1", &[0.6, 0.4], 1e12);
        let groups = group_rows(&all);
        let out = allocate_all(&all, &groups, &Params::default());
        assert_eq!(out.values, vec![0.0, 0.0]);
        assert_eq!(out.groups[0].regime, Regime::None);
        assert_eq!(out.groups[0].warnings, vec![GroupWarning::TargetOutOfRange { target: 1e12 }]);
    }

    #[test]
    fn inconsistent_targets_use_first_row() {
        let mut all = rows("S1", &[0.5, 0.5], 2.0);
        all[1].group_target = 3.0;
        let groups = group_rows(&all);
        let out = allocate_all(&all, &groups, &Params::default());
        assert_eq!(out.groups[0].allocated_sum, 2.0);
        assert_eq!(out.groups[0].warnings, vec![GroupWarning::InconsistentTarget { used: 2.0, other: 3.0 }]);
    }
}
