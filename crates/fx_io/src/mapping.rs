//! Column mapping: which header carries which semantic field.
//!
//! A mapping file is JSON with one entry per field; every entry is optional and
//! falls back to the conventional header (`STORE`, `DIVISION`, …, `CONT%`,
//! `MC_FIX`). `art` is the only optional column: when its header is absent the
//! ART diagnostics are skipped, while every other missing column is a
//! `Configuration` error naming the field.

use std::fs;
use std::path::Path;

use fx_core::KeyField;
use serde::{Deserialize, Serialize};

use crate::table::Table;
use crate::{IoError, IoResult};

pub const DEFAULT_ART: &str = "ART";
pub const DEFAULT_CONT: &str = "CONT%";
pub const DEFAULT_MC_FIX: &str = "MC_FIX";
pub const DEFAULT_OUTPUT_COLUMN: &str = "ALLOC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub store: String,
    pub division: String,
    pub section: String,
    pub group: String,
    pub department: String,
    pub udf06: String,
    pub floor: String,
    pub art: String,
    pub cont: String,
    pub mc_fix: String,
    /// Column receiving the allocation.
    pub output: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            store: KeyField::Store.default_header().into(),
            division: KeyField::Division.default_header().into(),
            section: KeyField::Section.default_header().into(),
            group: KeyField::Group.default_header().into(),
            department: KeyField::Department.default_header().into(),
            udf06: KeyField::Udf06.default_header().into(),
            floor: KeyField::Floor.default_header().into(),
            art: DEFAULT_ART.into(),
            cont: DEFAULT_CONT.into(),
            mc_fix: DEFAULT_MC_FIX.into(),
            output: DEFAULT_OUTPUT_COLUMN.into(),
        }
    }
}

/// Header positions for a concrete table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub key: [usize; 7],
    pub art: Option<usize>,
    pub cont: usize,
    pub mc_fix: usize,
}

impl ColumnMapping {
    pub fn load(path: &Path) -> IoResult<Self> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn key_header(&self, field: KeyField) -> &str {
        match field {
            KeyField::Store => &self.store,
            KeyField::Division => &self.division,
            KeyField::Section => &self.section,
            KeyField::Group => &self.group,
            KeyField::Department => &self.department,
            KeyField::Udf06 => &self.udf06,
            KeyField::Floor => &self.floor,
        }
    }

    pub fn set_key_header(&mut self, field: KeyField, header: String) {
        let slot = match field {
            KeyField::Store => &mut self.store,
            KeyField::Division => &mut self.division,
            KeyField::Section => &mut self.section,
            KeyField::Group => &mut self.group,
            KeyField::Department => &mut self.department,
            KeyField::Udf06 => &mut self.udf06,
            KeyField::Floor => &mut self.floor,
        };
        *slot = header;
    }

    /// Resolve every mapped header against `table`. Fails fast on the first missing field.
    pub fn resolve(&self, table: &Table) -> IoResult<ResolvedColumns> {
        let mut key = [0usize; 7];
        for field in KeyField::ALL {
            key[field.index()] = require(table, field.as_str(), self.key_header(field))?;
        }
        let cont = require(table, "cont", &self.cont)?;
        let mc_fix = require(table, "mc_fix", &self.mc_fix)?;
        let art = if self.art.trim().is_empty() { None } else { table.column_index(&self.art) };

        if self.output.trim().is_empty() {
            return Err(IoError::configuration("output", "output column name must not be empty"));
        }

        Ok(ResolvedColumns { key, art, cont, mc_fix })
    }
}

fn require(table: &Table, field: &str, header: &str) -> IoResult<usize> {
    if header.trim().is_empty() {
        return Err(IoError::configuration(field, "no column mapped"));
    }
    table
        .column_index(header)
        .ok_or_else(|| IoError::configuration(field, format!("column `{header}` not found in header row")))
}
