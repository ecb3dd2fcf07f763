//! CLI argument definitions for the MPOW normalizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use mpow_output::TableFormat;

#[derive(Parser)]
#[command(
    name = "mpow",
    version,
    about = "MPOW sheet normalizer - pivoted pain/opioid sheets to long-form tables",
    long_about = "Convert the pivoted MPOW study sheet (one row per subject-day, one column\n\
                  per intraday slot) into a long-form measurement table.\n\n\
                  Writes CSV and/or Parquet tables plus a checksummed manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the emitting module in log lines.
    #[arg(long = "log-targets", global = true)]
    pub log_targets: bool,

    /// Include subject identifiers in log output.
    ///
    /// Subject ids are patient data and are redacted by default.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a pivoted sheet and write the tabular store.
    Normalize(NormalizeArgs),

    /// Show how the sheet header resolves into measure columns.
    Inspect(SheetArgs),

    /// Report subjects whose pain and dose day counts differ.
    Integrity(SheetArgs),

    /// Print the built-in sheet layout as TOML.
    Layout,
}

#[derive(Parser)]
pub struct SheetArgs {
    /// Pivoted sheet: a workbook (.xlsx, .xlsm, .xlsb, .xls, .ods) or a
    /// delimited export.
    #[arg(value_name = "SHEET")]
    pub sheet: PathBuf,

    /// Worksheet to read from a workbook (default: the layout's
    /// `sheet_name`, or the only worksheet).
    #[arg(long = "sheet-name", value_name = "NAME")]
    pub sheet_name: Option<String>,

    /// Sheet layout TOML (default: built-in layout).
    #[arg(long = "layout", value_name = "FILE")]
    pub layout: Option<PathBuf>,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Per-subject detail table to store alongside the measurements.
    #[arg(long = "details", value_name = "FILE")]
    pub details: Option<PathBuf>,

    /// Store directory (default: <SHEET directory>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Table encoding to write.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Normalize and report without writing the store.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Parquet,
    Both,
}

impl From<OutputFormatArg> for TableFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Csv => TableFormat::Csv,
            OutputFormatArg::Parquet => TableFormat::Parquet,
            OutputFormatArg::Both => TableFormat::Both,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
