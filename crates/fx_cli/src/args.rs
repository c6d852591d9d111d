// crates/fx_cli/src/args.rs
//
// Deterministic, offline CLI argument surface.
// - No networked paths (reject any scheme:// like http/https/file)
// - --input must exist; --mapping / --params must exist when given
// - Per-field header flags override entries of the mapping file
// - Parameter flags override entries of the params file
// - --validate-only loads and resolves the input without allocating

use clap::{ArgAction, Parser};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use fx_core::{AllocationVariant, CorrectionMode, KeyField, Params};
use fx_io::mapping::ColumnMapping;

/// Output file written next to the input when `--output` is omitted.
pub const DEFAULT_OUTPUT_FILE: &str = "Citykart_Output.csv";

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "fixalloc",
    version,
    disable_help_subcommand = true,
    about = "Distribute per-group fixture targets across rows by contribution weight"
)]
pub struct Args {
    // --- Input / output ---
    /// Input CSV path.
    #[arg(long, short = 'i')]
    pub input: PathBuf,
    /// Output CSV path (default: Citykart_Output.csv next to the input).
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
    /// Write the run report (canonical JSON) to this path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    // --- Column mapping ---
    /// Column mapping JSON path.
    #[arg(long)]
    pub mapping: Option<PathBuf>,
    #[arg(long, value_name = "HEADER")]
    pub store: Option<String>,
    #[arg(long, value_name = "HEADER")]
    pub division: Option<String>,
    #[arg(long, value_name = "HEADER")]
    pub section: Option<String>,
    #[arg(long, value_name = "HEADER")]
    pub group: Option<String>,
    #[arg(long, value_name = "HEADER")]
    pub department: Option<String>,
    #[arg(long, value_name = "HEADER")]
    pub udf06: Option<String>,
    #[arg(long, value_name = "HEADER")]
    pub floor: Option<String>,
    /// ART header; pass an empty string to skip ART diagnostics.
    #[arg(long, value_name = "HEADER")]
    pub art: Option<String>,
    /// Weight column (CONT%).
    #[arg(long, value_name = "HEADER")]
    pub cont: Option<String>,
    /// Group target column (MC_FIX).
    #[arg(long, value_name = "HEADER")]
    pub mc_fix: Option<String>,
    /// Column receiving the allocation (default: ALLOC).
    #[arg(long, value_name = "HEADER")]
    pub output_column: Option<String>,

    // --- Parameters ---
    /// Params JSON path.
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Allocation rule set: balanced | round_robin.
    #[arg(long, value_parser = parse_variant)]
    pub variant: Option<AllocationVariant>,
    /// Balance correction: iterative | single_unit.
    #[arg(long, value_parser = parse_correction)]
    pub correction: Option<CorrectionMode>,
    /// Comparison tolerance.
    #[arg(long)]
    pub epsilon: Option<f64>,
    /// Remainder at or above which the balanced variant rounds up.
    #[arg(long)]
    pub round_up_threshold: Option<f64>,
    /// Let the balanced variant allocate MULTI groups whose weights are all zero.
    #[arg(long)]
    pub allocate_unweighted_groups: bool,

    // --- Control ---
    /// Load and resolve inputs only; do not allocate or write anything.
    #[arg(long)]
    pub validate_only: bool,
    /// Exit with a failure code when any group misses its target.
    #[arg(long)]
    pub strict: bool,
    /// Only warnings and errors on stderr.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

fn parse_variant(s: &str) -> Result<AllocationVariant, String> {
    s.trim().parse().map_err(|e: fx_core::CoreError| e.to_string())
}

fn parse_correction(s: &str) -> Result<CorrectionMode, String> {
    s.trim().parse().map_err(|e: fx_core::CoreError| e.to_string())
}

impl Args {
    /// Resolved output path.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(p) => p.clone(),
            None => self
                .input
                .parent()
                .map(|dir| dir.join(DEFAULT_OUTPUT_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        }
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Layer header flags over `mapping`.
    pub fn apply_mapping_overrides(&self, mapping: &mut ColumnMapping) {
        let keys = [
            (KeyField::Store, &self.store),
            (KeyField::Division, &self.division),
            (KeyField::Section, &self.section),
            (KeyField::Group, &self.group),
            (KeyField::Department, &self.department),
            (KeyField::Udf06, &self.udf06),
            (KeyField::Floor, &self.floor),
        ];
        for (field, header) in keys {
            if let Some(h) = header {
                mapping.set_key_header(field, h.clone());
            }
        }
        if let Some(h) = &self.art {
            mapping.art = h.clone();
        }
        if let Some(h) = &self.cont {
            mapping.cont = h.clone();
        }
        if let Some(h) = &self.mc_fix {
            mapping.mc_fix = h.clone();
        }
        if let Some(h) = &self.output_column {
            mapping.output = h.clone();
        }
    }

    /// Layer parameter flags over `params`.
    pub fn apply_param_overrides(&self, params: &mut Params) {
        if let Some(v) = self.variant {
            params.variant = v;
        }
        if let Some(c) = self.correction {
            params.correction = c;
        }
        if let Some(e) = self.epsilon {
            params.epsilon = e;
        }
        if let Some(t) = self.round_up_threshold {
            params.round_up_threshold = t;
        }
        if self.allocate_unweighted_groups {
            params.allocate_unweighted_groups = true;
        }
    }
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Scheme, existence, and combination checks, then path normalization.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    ensure_local_exists(&args.input, "--input")?;
    if let Some(m) = &args.mapping {
        ensure_local_exists(m, "--mapping")?;
    }
    if let Some(p) = &args.params {
        ensure_local_exists(p, "--params")?;
    }

    args.input = normalize_path(&args.input);
    args.mapping = args.mapping.take().map(|p| normalize_path(&p));
    args.params = args.params.take().map(|p| normalize_path(&p));
    args.output = Some(normalize_path(&args.output_path()));
    args.report = args.report.take().map(|p| normalize_path(&p));

    if args.output.as_deref() == Some(args.input.as_path()) {
        return Err(CliError::BadCombo("--output must differ from --input"));
    }
    if args.report.is_some() && args.report == args.output {
        return Err(CliError::BadCombo("--report must differ from --output"));
    }

    Ok(args)
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        Some(args.input.as_path()),
        args.output.as_deref(),
        args.report.as_deref(),
        args.mapping.as_deref(),
        args.params.as_deref(),
    ]
    .into_iter()
    .flatten()
}

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), produce an absolute path relative to CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
