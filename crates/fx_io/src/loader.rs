//! Loader: CSV bytes → `Table` → resolved columns → typed `Row`s.
//!
//! Coercion policy:
//! - CONT% and MC_FIX cells that do not parse become 0 (counted, logged at warn).
//! - Negative weights are clamped to 0; targets keep their sign for the resolver.
//! - A numeric column with non-empty cells of which *none* parse is a
//!   `Configuration` error: the wrong column was mapped.

use std::fs;
use std::path::Path;

use fx_core::numeric::{coerce_number, parse_number};
use fx_core::{GroupKey, KeyField, Params, Row};
use tracing::{debug, warn};

use crate::hasher::sha256_hex;
use crate::mapping::{ColumnMapping, ResolvedColumns};
use crate::table::Table;
use crate::{IoError, IoResult};

/// Everything the pipeline needs from one input file.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub table: Table,
    pub columns: ResolvedColumns,
    pub rows: Vec<Row>,
    /// SHA-256 of the raw input bytes.
    pub input_sha256: String,
}

pub fn load_csv_path(path: &Path, mapping: &ColumnMapping) -> IoResult<LoadedInput> {
    let bytes = fs::read(path)?;
    load_csv_bytes(&bytes, mapping)
}

pub fn load_csv_bytes(bytes: &[u8], mapping: &ColumnMapping) -> IoResult<LoadedInput> {
    let table = Table::from_csv_bytes(bytes)?;
    let columns = mapping.resolve(&table)?;
    let rows = load_rows(&table, &columns)?;
    Ok(LoadedInput { table, columns, rows, input_sha256: sha256_hex(bytes) })
}

/// Read a `Params` JSON file. Unknown keys are rejected; domain checks are left to `Params::validate`.
pub fn load_params_path(path: &Path) -> IoResult<Params> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Build rows in input order.
pub fn load_rows(table: &Table, cols: &ResolvedColumns) -> IoResult<Vec<Row>> {
    check_numeric_column(table, cols.cont, "cont")?;
    check_numeric_column(table, cols.mc_fix, "mc_fix")?;

    let mut coerced = 0usize;
    let mut clamped = 0usize;
    let mut rows = Vec::with_capacity(table.len());

    for r in 0..table.len() {
        let key = GroupKey::from_parts(KeyField::ALL.iter().map(|f| table.cell(r, cols.key[f.index()])));

        let weight = numeric_cell(table.cell(r, cols.cont), &mut coerced);
        let target = numeric_cell(table.cell(r, cols.mc_fix), &mut coerced);
        if weight < 0.0 {
            clamped += 1;
        }

        let mut row = Row::new(key, weight, target);
        if let Some(c) = cols.art {
            row = row.with_art(table.cell(r, c).trim());
        }
        rows.push(row);
    }

    if coerced > 0 {
        warn!(cells = coerced, "non-numeric CONT%/MC_FIX cells coerced to 0");
    }
    if clamped > 0 {
        warn!(rows = clamped, "negative CONT% clamped to 0");
    }
    debug!(rows = rows.len(), "rows loaded");
    Ok(rows)
}

fn numeric_cell(cell: &str, coerced: &mut usize) -> f64 {
    if parse_number(cell).is_none() && !cell.trim().is_empty() {
        *coerced += 1;
    }
    coerce_number(cell)
}

fn check_numeric_column(table: &Table, col: usize, field: &str) -> IoResult<()> {
    let mut non_empty = 0usize;
    let mut numeric = 0usize;
    for r in 0..table.len() {
        let cell = table.cell(r, col);
        if cell.trim().is_empty() {
            continue;
        }
        non_empty += 1;
        if parse_number(cell).is_some() {
            numeric += 1;
        }
    }
    if non_empty > 0 && numeric == 0 {
        let header = table.headers.get(col).map(String::as_str).unwrap_or("?");
        return Err(IoError::configuration(
            field,
            format!("column `{header}` has no numeric values"),
        ));
    }
    Ok(())
}
