//! fx_pipeline: deterministic pipeline surface (load → group → resolve → allocate → correct → assemble → report).
//! File access and CSV/JSON shapes are delegated to `fx_io`, allocation math to `fx_algo`.

use std::path::Path;

use fx_core::{CoreError, Params};
use fx_io::{loader::LoadedInput, mapping::ColumnMapping, table::Table, IoError};
use thiserror::Error;
use tracing::info;

pub mod allocate;
pub mod assemble;
pub mod group;
pub mod report;
pub mod resolve;

pub use allocate::{allocate_all, allocate_group, Allocations, GroupOutcome};
pub use assemble::{assemble, format_alloc};
pub use group::{group_rows, Groups};
pub use report::{GroupReport, GroupWarning, RunReport, RunTotals};
pub use resolve::{resolve_target, ResolvedTarget};

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("invalid parameters: {0}")]
    Params(#[from] CoreError),
}

/// Pipeline context: input already loaded and columns resolved by fx_io.
#[derive(Debug, Clone)]
pub struct PipelineCtx {
    pub input: LoadedInput,
    pub output_column: String,
    pub params: Params,
}

/// Output table (input fields + allocation column) and the run report.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub table: Table,
    pub report: RunReport,
}

impl PipelineOutputs {
    /// Serialize the output table and stamp its digest into the report.
    pub fn finalize_csv(&mut self) -> Result<Vec<u8>, PipelineError> {
        let bytes = self.table.to_csv_bytes()?;
        self.report.output_sha256 = Some(fx_io::hasher::sha256_hex(&bytes));
        Ok(bytes)
    }
}

/// Run every stage over a loaded input.
pub fn run_with_ctx(ctx: PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    ctx.params.validate()?;

    let rows = &ctx.input.rows;
    let groups = group_rows(rows);
    let allocations = allocate_all(rows, &groups, &ctx.params);
    let table = assemble(&ctx.input.table, &ctx.output_column, &allocations.values);
    let report = RunReport::new(ctx.params, ctx.input.input_sha256, allocations.groups);

    info!(
        groups = report.totals.groups,
        rows = report.totals.rows,
        allocated = report.totals.allocated_total,
        warnings = report.totals.warnings,
        "allocation complete"
    );

    Ok(PipelineOutputs { table, report })
}

/// Convenience entry: load a CSV with `mapping`, then run.
pub fn run_from_path(path: &Path, mapping: &ColumnMapping, params: Params) -> Result<PipelineOutputs, PipelineError> {
    let input = fx_io::loader::load_csv_path(path, mapping)?;
    run_with_ctx(PipelineCtx { input, output_column: mapping.output.clone(), params })
}

/// Same as `run_from_path` over in-memory CSV bytes.
pub fn run_from_bytes(bytes: &[u8], mapping: &ColumnMapping, params: Params) -> Result<PipelineOutputs, PipelineError> {
    let input = fx_io::loader::load_csv_bytes(bytes, mapping)?;
    run_with_ctx(PipelineCtx { input, output_column: mapping.output.clone(), params })
}

/// Engine identifier echoed in reports.
pub fn engine_identifier() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
