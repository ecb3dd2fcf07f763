//! End-to-end tests for the CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use mpow_cli::cli::{NormalizeArgs, OutputFormatArg, SheetArgs};
use mpow_cli::commands::{run_inspect, run_integrity, run_layout, run_normalize};
use mpow_layout::SheetLayout;
use mpow_model::{MeasurementType, Slot};
use mpow_output::{MANIFEST_FILE, MEASUREMENTS_TABLE, read_manifest, read_table};
use tempfile::TempDir;

const SHEET: &str = "\
Subject,Date,pain_slot1,pain_slot2,dose_slot1,dose_slot2
1,2019-01-01,3,5,10,
1,2019-01-02,4,,,
2,2019-01-01,,,,
";

const DETAILS: &str = "\
Subject,Age at Admit,Gender,Impairment Group,\"Depression (1=Y, 0=N)\"
1,54,F,Stroke,1
2,61,M,Spinal Cord,0
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn sheet_args(sheet: &Path) -> SheetArgs {
    SheetArgs {
        sheet: sheet.to_path_buf(),
        sheet_name: None,
        layout: None,
    }
}

fn normalize_args(sheet: &Path, output_dir: &Path) -> NormalizeArgs {
    NormalizeArgs {
        sheet: sheet_args(sheet),
        details: None,
        output_dir: Some(output_dir.to_path_buf()),
        format: OutputFormatArg::Both,
        dry_run: false,
    }
}

#[test]
fn normalize_writes_store_with_manifest() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(&dir, "pain_scores.csv", SHEET);
    let details = write_file(&dir, "patient features.csv", DETAILS);
    let store = dir.path().join("store");

    let mut args = normalize_args(&sheet, &store);
    args.details = Some(details);
    let result = run_normalize(&args).unwrap();

    assert_eq!(result.rows, 3);
    assert_eq!(result.subjects, 2);
    assert_eq!(result.slots, 2);
    assert_eq!(result.measurements, 12);
    assert_eq!(result.missing, 8);
    assert_eq!(result.daily_rows, 3);
    assert_eq!(result.detail_rows, Some(2));
    assert_eq!(result.integrity.len(), 1);
    assert_eq!(result.integrity[0].subject_id.as_str(), "1");

    let manifest = read_manifest(&store).unwrap();
    assert_eq!(Some(&manifest), result.manifest.as_ref());
    assert_eq!(manifest.rows(MEASUREMENTS_TABLE), Some(12));
    assert_eq!(manifest.rows("detail"), Some(2));

    let df = read_table(&store, MEASUREMENTS_TABLE).unwrap();
    assert_eq!(df.height(), 12);
}

#[test]
fn normalize_reads_a_named_worksheet() {
    let workbook = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../mpow-ingest/tests/fixtures/pivot.xlsx");
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");

    let mut args = normalize_args(&workbook, &store);
    args.sheet.sheet_name = Some("Pain scores".to_string());
    let result = run_normalize(&args).unwrap();

    assert_eq!(result.rows, 2);
    assert_eq!(result.subjects, 2);
    assert_eq!(result.measurements, 8);
    // Empty dose_slot2, "NA" pain and a #N/A error cell.
    assert_eq!(result.missing, 3);
    assert_eq!(result.daily_rows, 2);

    let manifest = read_manifest(&store).unwrap();
    assert_eq!(manifest.rows(MEASUREMENTS_TABLE), Some(8));
}

#[test]
fn workbook_with_several_worksheets_needs_a_name() {
    let workbook = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../mpow-ingest/tests/fixtures/pivot.xlsx");
    let err = run_inspect(&sheet_args(&workbook)).unwrap_err();
    assert!(format!("{err:#}").contains("name the one to read"), "{err:#}");
}

#[test]
fn rerun_produces_identical_store() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(&dir, "pain_scores.csv", SHEET);
    let store = dir.path().join("store");
    let args = normalize_args(&sheet, &store);

    run_normalize(&args).unwrap();
    let first: Vec<(String, Vec<u8>)> = snapshot_dir(&store);
    run_normalize(&args).unwrap();

    assert_eq!(snapshot_dir(&store), first);
}

fn snapshot_dir(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(&dir, "pain_scores.csv", SHEET);
    let store = dir.path().join("store");

    let mut args = normalize_args(&sheet, &store);
    args.dry_run = true;
    let result = run_normalize(&args).unwrap();

    assert!(result.manifest.is_none());
    assert_eq!(result.measurements, 12);
    assert!(!store.join(MANIFEST_FILE).exists());
}

#[test]
fn default_output_dir_is_next_to_the_sheet() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(&dir, "pain_scores.csv", SHEET);

    let mut args = normalize_args(&sheet, dir.path());
    args.output_dir = None;
    args.format = OutputFormatArg::Csv;
    let result = run_normalize(&args).unwrap();

    assert_eq!(result.output_dir, dir.path().join("output"));
    assert!(dir.path().join("output").join("measurements.csv").is_file());
    assert!(!dir.path().join("output").join("measurements.parquet").exists());
}

#[test]
fn schema_error_names_the_missing_column() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(
        &dir,
        "bad.csv",
        "subject,date,pain_slot1,pain_slot2,dose_slot1\n1,2019-01-01,3,5,10\n",
    );

    let err = run_normalize(&normalize_args(&sheet, &dir.path().join("store"))).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("dose_slot2"), "{message}");
    assert!(!dir.path().join("store").exists());
}

#[test]
fn bad_date_reports_the_line() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(
        &dir,
        "bad.csv",
        "subject,date,pain_slot1,dose_slot1\n1,2019-01-01,3,10\n1,soon,3,10\n",
    );

    let err = run_normalize(&normalize_args(&sheet, &dir.path().join("store"))).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("line 3"), "{message}");
    assert!(message.contains("'soon'"), "{message}");
}

#[test]
fn custom_layout_is_applied() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(
        &dir,
        "semicolon.csv",
        "patient;day;nrs_slot1;nrs_slot2\n7;2019-03-01;2;8\n",
    );
    let layout = write_file(
        &dir,
        "layout.toml",
        r#"
subject_column = "patient"
date_column = "day"
delimiter = ";"

[[measures]]
kind = "pain_score"
prefix = "nrs"
unit = "NRS"
min = 0.0
max = 10.0
"#,
    );

    let args = SheetArgs {
        sheet,
        sheet_name: None,
        layout: Some(layout),
    };
    let inspected = run_inspect(&args).unwrap();
    assert_eq!(inspected.rows, 1);
    assert_eq!(inspected.schema.subject_name, "patient");
    let cells: Vec<(MeasurementType, Slot)> = inspected
        .schema
        .measure_columns
        .iter()
        .map(|c| (c.measurement_type, c.slot))
        .collect();
    assert_eq!(
        cells,
        vec![
            (MeasurementType::PainScore, Slot::Intraday(1)),
            (MeasurementType::PainScore, Slot::Intraday(2)),
        ]
    );

    let integrity = run_integrity(&args).unwrap();
    assert_eq!(integrity.subjects, 1);
    assert!(integrity.issues.is_empty());
}

#[test]
fn integrity_command_reports_mismatches() {
    let dir = TempDir::new().unwrap();
    let sheet = write_file(&dir, "pain_scores.csv", SHEET);

    let result = run_integrity(&sheet_args(&sheet)).unwrap();
    assert_eq!(result.subjects, 2);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].pain_days, 2);
    assert_eq!(result.issues[0].dose_days, 1);
}

#[test]
fn layout_command_round_trips() {
    let rendered = run_layout().unwrap();
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "layout.toml", &rendered);

    assert_eq!(SheetLayout::load(&path).unwrap(), SheetLayout::default());
}
