//! Integration tests for the tabular store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use mpow_model::{
    DailySummary, IntegrityIssue, Measurement, MeasurementType, Slot, SubjectDetail, SubjectId,
};
use mpow_output::{
    DAILY_TABLE, DETAIL_TABLE, FileFormat, MANIFEST_FILE, MEASUREMENTS_TABLE, OutputError,
    StoreContents, TableFormat, read_manifest, read_table, write_store,
};
use polars::prelude::{AnyValue, DataType};
use tempfile::TempDir;

fn subject(id: &str) -> SubjectId {
    SubjectId::new(id).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

fn measurements() -> Vec<Measurement> {
    let record = |slot, kind, value, unit: &str| Measurement {
        subject_id: subject("1"),
        date: day(),
        day_num: 1,
        slot,
        measurement_type: kind,
        value,
        unit: unit.to_string(),
    };
    vec![
        record(Slot::Intraday(1), MeasurementType::PainScore, Some(3.0), "NRS"),
        record(Slot::Intraday(2), MeasurementType::PainScore, Some(5.0), "NRS"),
        record(Slot::Intraday(1), MeasurementType::OpioidDose, Some(10.0), "mg OMEq"),
        record(Slot::Intraday(2), MeasurementType::OpioidDose, None, "mg OMEq"),
    ]
}

fn daily() -> Vec<DailySummary> {
    vec![DailySummary {
        subject_id: subject("1"),
        date: day(),
        day_num: 1,
        pain_observations: 2,
        pain_sum: Some(8.0),
        pain_mean: Some(4.0),
        dose_observations: 1,
        dose_total: Some(10.0),
    }]
}

fn details() -> Vec<SubjectDetail> {
    vec![SubjectDetail {
        subject_id: subject("1"),
        age_at_admit: Some(54),
        gender: Some("F".to_string()),
        impairment_group: None,
        depression: Some(true),
    }]
}

fn source_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sheet.csv");
    fs::write(&path, "subject,date,pain_slot1\n1,2019-01-01,3\n").unwrap();
    path
}

fn write(dir: &Path, source: &Path, format: TableFormat, with_details: bool) -> mpow_output::Manifest {
    let measurements = measurements();
    let daily = daily();
    let details = details();
    let integrity = vec![IntegrityIssue {
        subject_id: subject("1"),
        pain_days: 1,
        dose_days: 0,
    }];
    let contents = StoreContents {
        measurements: &measurements,
        daily: &daily,
        details: with_details.then_some(details.as_slice()),
        integrity: &integrity,
    };
    write_store(dir, source, &contents, format).unwrap()
}

#[test]
fn manifest_lists_every_table_with_row_counts() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let store = TempDir::new().unwrap();

    let manifest = write(store.path(), &source, TableFormat::Both, true);

    assert_eq!(manifest.tables.len(), 6);
    assert_eq!(manifest.rows(MEASUREMENTS_TABLE), Some(4));
    assert_eq!(manifest.rows(DAILY_TABLE), Some(1));
    assert_eq!(manifest.rows(DETAIL_TABLE), Some(1));
    for table in &manifest.tables {
        assert!(store.path().join(&table.file).is_file(), "{}", table.file);
        assert_eq!(table.sha256.len(), 64);
    }
    assert_eq!(manifest.integrity.len(), 1);
    assert_eq!(read_manifest(store.path()).unwrap(), manifest);
}

#[test]
fn rewriting_identical_input_is_byte_identical() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    write(first.path(), &source, TableFormat::Both, true);
    write(second.path(), &source, TableFormat::Both, true);
    let before = fs::read(first.path().join(MANIFEST_FILE)).unwrap();
    write(first.path(), &source, TableFormat::Both, true);

    assert_eq!(fs::read(first.path().join(MANIFEST_FILE)).unwrap(), before);
    for entry in fs::read_dir(first.path()).unwrap() {
        let name = entry.unwrap().file_name();
        assert_eq!(
            fs::read(first.path().join(&name)).unwrap(),
            fs::read(second.path().join(&name)).unwrap(),
            "{name:?} differs"
        );
    }
}

#[test]
fn parquet_read_back_keeps_types_and_nulls() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let store = TempDir::new().unwrap();
    write(store.path(), &source, TableFormat::Parquet, false);

    let df = read_table(store.path(), MEASUREMENTS_TABLE).unwrap();
    assert_eq!(df.height(), 4);
    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    assert_eq!(df.column("value").unwrap().get(1).unwrap(), AnyValue::Float64(5.0));
    assert_eq!(df.column("value").unwrap().get(3).unwrap(), AnyValue::Null);
    assert_eq!(df.column("slot_index").unwrap().get(2).unwrap(), AnyValue::UInt32(1));
}

#[test]
fn csv_fallback_parses_dates() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let store = TempDir::new().unwrap();
    write(store.path(), &source, TableFormat::Csv, true);

    let df = read_table(store.path(), DAILY_TABLE).unwrap();
    assert_eq!(df.height(), 1);
    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    assert_eq!(
        df.column("subject_id").unwrap().get(0).unwrap(),
        AnyValue::String("1")
    );
    assert_eq!(df.column("day_num").unwrap().dtype(), &DataType::UInt32);

    let detail = read_table(store.path(), DETAIL_TABLE).unwrap();
    assert_eq!(detail.column("impairment_group").unwrap().dtype(), &DataType::String);
    assert_eq!(detail.column("age_at_admit").unwrap().get(0).unwrap(), AnyValue::UInt32(54));
}

#[test]
fn csv_fallback_keeps_leading_zero_subject_ids() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let store = TempDir::new().unwrap();
    let measurements = vec![Measurement {
        subject_id: subject("007"),
        date: day(),
        day_num: 1,
        slot: Slot::Daily,
        measurement_type: MeasurementType::OpioidDose,
        value: Some(20.0),
        unit: "mg OMEq".to_string(),
    }];
    let contents = StoreContents {
        measurements: &measurements,
        daily: &[],
        details: None,
        integrity: &[],
    };
    write_store(store.path(), &source, &contents, TableFormat::Csv).unwrap();

    let df = read_table(store.path(), MEASUREMENTS_TABLE).unwrap();
    assert_eq!(df.column("subject_id").unwrap().dtype(), &DataType::String);
    assert_eq!(
        df.column("subject_id").unwrap().get(0).unwrap(),
        AnyValue::String("007")
    );
    assert_eq!(df.column("slot_index").unwrap().dtype(), &DataType::UInt32);
    assert_eq!(df.column("slot_index").unwrap().get(0).unwrap(), AnyValue::Null);
    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
}

#[test]
fn switching_format_removes_stale_files() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let store = TempDir::new().unwrap();

    write(store.path(), &source, TableFormat::Both, true);
    let manifest = write(store.path(), &source, TableFormat::Csv, false);

    assert!(manifest.tables.iter().all(|t| t.format == FileFormat::Csv));
    assert!(!store.path().join("measurements.parquet").exists());
    assert!(!store.path().join("detail.csv").exists());
    assert!(store.path().join("measurements.csv").is_file());
}

#[test]
fn failed_manifest_write_leaves_previous_store_untouched() {
    let input = TempDir::new().unwrap();
    let source = source_file(&input);
    let store = TempDir::new().unwrap();
    write(store.path(), &source, TableFormat::Csv, true);
    let files = ["measurements.csv", "daily.csv", "detail.csv", MANIFEST_FILE];
    let before: Vec<Vec<u8>> = files
        .iter()
        .map(|file| fs::read(store.path().join(file)).unwrap())
        .collect();

    // A directory in the way of the staged manifest fails the run after
    // every table has been staged.
    fs::create_dir(store.path().join(format!("{MANIFEST_FILE}.tmp"))).unwrap();
    let measurements = measurements()[..1].to_vec();
    let contents = StoreContents {
        measurements: &measurements,
        daily: &[],
        details: None,
        integrity: &[],
    };
    let err = write_store(store.path(), &source, &contents, TableFormat::Both).unwrap_err();
    assert!(matches!(err, OutputError::Io { .. }), "{err:?}");

    for (file, bytes) in files.iter().zip(&before) {
        assert_eq!(&fs::read(store.path().join(file)).unwrap(), bytes, "{file} changed");
    }
    assert!(!store.path().join("measurements.parquet").exists());
    assert!(!store.path().join("measurements.csv.tmp").exists());
    assert!(!store.path().join("measurements.parquet.tmp").exists());
    assert!(!store.path().join("daily.csv.tmp").exists());
}

#[test]
fn missing_table_is_reported() {
    let store = TempDir::new().unwrap();
    let err = read_table(store.path(), DETAIL_TABLE).unwrap_err();
    assert!(matches!(err, OutputError::TableNotFound { ref name, .. } if name == "detail"));
}
