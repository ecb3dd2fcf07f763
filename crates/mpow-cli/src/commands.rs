use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use mpow_ingest::{RawSheet, load_subject_details, read_sheet};
use mpow_layout::{SheetLayout, SheetSchema};
use mpow_model::IntegrityIssue;
use mpow_normalize::{check_integrity, normalize_sheet, summarize_days};
use mpow_output::{StoreContents, write_store};
use tracing::{debug, info, info_span, warn};

use crate::cli::{NormalizeArgs, SheetArgs};
use crate::logging::redact_value;
use crate::types::{InspectResult, IntegrityResult, NormalizeResult};

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeResult> {
    let sheet_path = &args.sheet.sheet;
    let span = info_span!("normalize_command", sheet = %sheet_path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let (layout, sheet) = load_sheet(&args.sheet)?;
    let normalized = normalize_sheet(&sheet, &layout)
        .with_context(|| format!("normalize {}", sheet_path.display()))?;

    let details = args
        .details
        .as_deref()
        .map(|path| {
            load_subject_details(path, layout.delimiter_byte())
                .with_context(|| format!("load subject details {}", path.display()))
        })
        .transpose()?;

    let daily = summarize_days(&normalized.measurements);
    let integrity = check_integrity(&normalized.measurements);
    log_integrity(&integrity);

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(sheet_path));

    let manifest = if args.dry_run {
        info!(output_dir = %output_dir.display(), "dry run, store not written");
        None
    } else {
        let contents = StoreContents {
            measurements: &normalized.measurements,
            daily: &daily,
            details: details.as_deref(),
            integrity: &integrity,
        };
        let manifest = write_store(&output_dir, sheet_path, &contents, args.format.into())
            .with_context(|| format!("write store {}", output_dir.display()))?;
        Some(manifest)
    };

    info!(
        rows = normalized.row_count,
        measurements = normalized.measurements.len(),
        duration_ms = start.elapsed().as_millis(),
        "normalize complete"
    );

    Ok(NormalizeResult {
        sheet: sheet_path.clone(),
        output_dir,
        rows: normalized.row_count,
        subjects: normalized.subjects().len(),
        slots: normalized.schema.slot_count(),
        measurements: normalized.measurements.len(),
        missing: normalized.missing_count(),
        daily_rows: daily.len(),
        detail_rows: details.as_ref().map(Vec::len),
        integrity,
        manifest,
    })
}

pub fn run_inspect(args: &SheetArgs) -> Result<InspectResult> {
    let (layout, sheet) = load_sheet(args)?;
    let schema = SheetSchema::resolve(&layout, &sheet.headers)
        .with_context(|| format!("resolve header of {}", args.sheet.display()))?;
    Ok(InspectResult {
        sheet: args.sheet.clone(),
        rows: sheet.row_count(),
        schema,
    })
}

pub fn run_integrity(args: &SheetArgs) -> Result<IntegrityResult> {
    let span = info_span!("integrity_command", sheet = %args.sheet.display());
    let _guard = span.enter();

    let (layout, sheet) = load_sheet(args)?;
    let normalized = normalize_sheet(&sheet, &layout)
        .with_context(|| format!("normalize {}", args.sheet.display()))?;
    let issues = check_integrity(&normalized.measurements);
    log_integrity(&issues);

    Ok(IntegrityResult {
        sheet: args.sheet.clone(),
        subjects: normalized.subjects().len(),
        issues,
    })
}

/// Built-in layout rendered as TOML.
pub fn run_layout() -> Result<String> {
    SheetLayout::default()
        .to_toml_string()
        .context("render default layout")
}

fn load_sheet(args: &SheetArgs) -> Result<(SheetLayout, RawSheet)> {
    let layout = SheetLayout::load_or_default(args.layout.as_deref())
        .context("load sheet layout")?;
    debug!(
        custom = args.layout.is_some(),
        measures = layout.measures.len(),
        "sheet layout ready"
    );
    let sheet_name = args.sheet_name.as_deref().or(layout.sheet_name.as_deref());
    let sheet = read_sheet(&args.sheet, layout.delimiter_byte(), sheet_name)
        .with_context(|| format!("read sheet {}", args.sheet.display()))?;
    Ok((layout, sheet))
}

fn log_integrity(issues: &[IntegrityIssue]) {
    for issue in issues {
        warn!(
            subject = redact_value(issue.subject_id.as_str()),
            pain_days = issue.pain_days,
            dose_days = issue.dose_days,
            "pain and dose day counts differ"
        );
    }
}

fn default_output_dir(sheet: &Path) -> PathBuf {
    sheet
        .parent()
        .map_or_else(|| PathBuf::from("output"), |parent| parent.join("output"))
}
