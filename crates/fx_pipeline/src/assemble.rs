//! ASSEMBLE stage: write allocations back onto the input table.
//!
//! Every input field and the row order are preserved verbatim; only the
//! output column is written (overwritten in place if the header already exists).

use fx_io::table::Table;

/// Float literal as the exporter expects it: `0.0`, `0.5`, `1.0`, `2.0`.
pub fn format_alloc(v: f64) -> String {
    format!("{v:?}")
}

pub fn assemble(table: &Table, column: &str, values: &[f64]) -> Table {
    debug_assert_eq!(table.len(), values.len());
    let mut out = table.clone();
    out.set_column(column, values.iter().copied().map(format_alloc).collect());
    out
}
