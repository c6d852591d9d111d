//! GROUP stage: partition rows by their composite key.
//!
//! Every row lands in exactly one group; member indices keep input order.
//! Groups iterate in `GroupKey` order, which keeps reports stable.

use std::collections::BTreeMap;

use fx_core::{GroupKey, Row};

pub type Groups = BTreeMap<GroupKey, Vec<usize>>;

pub fn group_rows(rows: &[Row]) -> Groups {
    let mut groups: Groups = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        groups.entry(row.key.clone()).or_default().push(i);
    }
    groups
}
