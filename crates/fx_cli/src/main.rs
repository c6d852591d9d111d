// crates/fx_cli/src/main.rs
//
// Wires up exit codes, typed error mapping, CLI parsing, logging, the
// validate-only short-circuit, and the full run path
// (config → load → pipeline → output CSV → optional report).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bad flags, mapping/params problems, unusable columns.
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    /// `--strict` and at least one group missed its target.
    pub const INVARIANT: i32 = 5;
}

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args};
use fx_core::Params;
use fx_io::{canonical_json, loader, mapping::ColumnMapping, IoError};
use fx_pipeline::PipelineError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
    Invariant(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Io(m) | MainError::Invariant(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("fixalloc: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    init_tracing(&args);

    let result = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match result {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("fixalloc: error: {e}");
            map_error(&e)
        }
    };

    ExitCode::from(rc as u8)
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Invariant(_) => INVARIANT,
    }
}

/// Translate fx_io::IoError into MainError buckets for exit-code mapping.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Configuration { .. } | IoError::Json(_) => MainError::Validation(e.to_string()),
        IoError::Csv(ref c) if !c.is_io_error() => MainError::Validation(e.to_string()),
        IoError::Csv(_) | IoError::Path(_) => MainError::Io(e.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Params(_) => MainError::Validation(e.to_string()),
    }
}

/// Mapping file (or defaults) with header flags on top; params likewise.
fn load_config(args: &Args) -> Result<(ColumnMapping, Params), MainError> {
    let mut mapping = match &args.mapping {
        Some(p) => ColumnMapping::load(p).map_err(map_io_err)?,
        None => ColumnMapping::default(),
    };
    args.apply_mapping_overrides(&mut mapping);

    let mut params = match &args.params {
        Some(p) => loader::load_params_path(p).map_err(map_io_err)?,
        None => Params::default(),
    };
    args.apply_param_overrides(&mut params);
    params
        .validate()
        .map_err(|e| MainError::Validation(format!("invalid parameters: {e}")))?;

    Ok((mapping, params))
}

/// Load and resolve without allocating or writing.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let (mapping, _params) = load_config(args)?;
    let loaded = loader::load_csv_path(&args.input, &mapping).map_err(map_io_err)?;
    let groups = fx_pipeline::group_rows(&loaded.rows).len();

    if !args.quiet {
        eprintln!("validate-only: inputs OK ({} rows, {groups} groups)", loaded.rows.len());
    }
    Ok(())
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let (mapping, params) = load_config(args)?;

    let mut outs = fx_pipeline::run_from_path(&args.input, &mapping, params).map_err(map_pipeline_err)?;
    let csv_bytes = outs.finalize_csv().map_err(map_pipeline_err)?;

    let out_path = args.output_path();
    write_output(&out_path, &csv_bytes)?;
    info!(path = %out_path.display(), "output written");

    if let Some(report_path) = &args.report {
        canonical_json::write_canonical_file(report_path, &outs.report)
            .map_err(|e| MainError::Io(format!("write {}: {e}", report_path.display())))?;
        info!(path = %report_path.display(), "report written");
    }

    let totals = &outs.report.totals;
    if !args.quiet {
        eprintln!(
            "run: {} rows in {} groups, {} allocated → {}",
            totals.rows,
            totals.groups,
            totals.allocated_total,
            out_path.display()
        );
    }

    if totals.invariant_breaks > 0 {
        warn!(groups = totals.invariant_breaks, "groups did not reach their target");
        if args.strict {
            return Err(MainError::Invariant(format!(
                "{} group(s) did not reach their target",
                totals.invariant_breaks
            )));
        }
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), MainError> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", dir.display())))?;
    }
    fs::write(path, bytes).map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))
}
