//! crates/fx_io/src/lib.rs
//! I/O crate: CSV tables in and out, column mapping, row coercion, canonical
//! JSON, and digests. The allocation core never touches files; everything that
//! reads or writes bytes lives here.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for fx_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(#[from] std::io::Error),

    /// CSV read/write failures.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (mapping / params / report) failures.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or unusable column for a semantic field. Fatal by contract.
    #[error("configuration error: field `{field}`: {reason}")]
    Configuration { field: String, reason: String },
}

impl IoError {
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        IoError::Configuration { field: field.into(), reason: reason.into() }
    }
}

pub type IoResult<T> = Result<T, IoError>;

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod mapping;
pub mod table;
