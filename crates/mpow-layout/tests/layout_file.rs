use std::io::Write;

use mpow_layout::{LayoutError, SheetLayout};
use mpow_model::MeasurementType;
use tempfile::NamedTempFile;

fn layout_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
fn loads_custom_layout() {
    let file = layout_file(
        r#"
subject_column = "Patient"
date_column = "Date"
ignored_columns = ["Notes"]
delimiter = ";"

[[measures]]
kind = "pain_score"
prefix = "ps"
unit = "NRS"
max = 10.0

[[measures]]
kind = "opioid_dose"
prefix = "omeq"
unit = "mg"
"#,
    );
    let layout = SheetLayout::load(file.path()).expect("load layout");
    assert_eq!(layout.subject_column, "Patient");
    assert_eq!(layout.delimiter_byte(), b';');
    assert_eq!(layout.ignored_columns, vec!["Notes".to_string()]);
    let dose = layout.measure(MeasurementType::OpioidDose).expect("dose");
    assert_eq!(dose.prefix, "omeq");
    assert_eq!(dose.min, None);
}

#[test]
fn invalid_toml_reports_path() {
    let file = layout_file("measures = 3\n");
    let err = SheetLayout::load(file.path()).expect_err("bad toml");
    assert!(matches!(err, LayoutError::Toml { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn semantic_validation_runs_on_load() {
    let file = layout_file("measures = []\n");
    let err = SheetLayout::load(file.path()).expect_err("no measures");
    assert!(matches!(err, LayoutError::Invalid { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let err = SheetLayout::load(std::path::Path::new("/nonexistent/layout.toml"))
        .expect_err("missing");
    assert!(matches!(err, LayoutError::Io { .. }));
}

#[test]
fn default_used_without_path() {
    let layout = SheetLayout::load_or_default(None).unwrap();
    assert_eq!(layout, SheetLayout::default());
}
