//! RESOLVE stage: read a group's target and classify its regime.
//!
//! The target comes from the first member row. Members are expected to agree;
//! the first disagreeing value is returned so the caller can flag it.

use fx_core::numeric::approx_eq;
use fx_core::{classify_target, Row, TargetClass};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedTarget {
    pub class: TargetClass,
    /// First member target that differs from the first row's value.
    pub conflicting: Option<f64>,
}

pub fn resolve_target(rows: &[Row], members: &[usize], eps: f64) -> ResolvedTarget {
    let first = members.first().map(|&i| rows[i].group_target).unwrap_or(0.0);
    let conflicting = members
        .iter()
        .map(|&i| rows[i].group_target)
        .find(|&t| !approx_eq(t, first, eps));

    ResolvedTarget { class: classify_target(first, eps), conflicting }
}
