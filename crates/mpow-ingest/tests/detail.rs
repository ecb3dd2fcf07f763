use std::io::Write;

use mpow_ingest::{IngestError, load_subject_details};
use tempfile::NamedTempFile;

fn temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
fn loads_and_renames_feature_columns() {
    let file = temp_csv(
        "Subject,Age at Admit,Gender,Impairment Group,\"Depression (1=Y, 0=N)\",Notes\n\
         1,32,Female,Spinal_Cord_Dysfunction,0,first\n\
         2.0,,Male,Brain_Dysfunction,1,\n",
    );
    let details = load_subject_details(file.path(), b',').expect("load details");

    assert_eq!(details.len(), 2);
    assert_eq!(details[0].subject_id.as_str(), "1");
    assert_eq!(details[0].age_at_admit, Some(32));
    assert_eq!(details[0].gender.as_deref(), Some("Female"));
    assert_eq!(
        details[0].impairment_group.as_deref(),
        Some("Spinal_Cord_Dysfunction")
    );
    assert_eq!(details[0].depression, Some(false));

    assert_eq!(details[1].subject_id.as_str(), "2");
    assert_eq!(details[1].age_at_admit, None);
    assert_eq!(details[1].depression, Some(true));
}

#[test]
fn missing_subject_column_is_reported() {
    let file = temp_csv("Patient Name,Gender\nA,Female\n");
    let err = load_subject_details(file.path(), b',').expect_err("no subject column");
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "Subject"));
}

#[test]
fn invalid_age_names_line_and_field() {
    let file = temp_csv("Subject,Age at Admit\n1,32\n2,thirty\n");
    let err = load_subject_details(file.path(), b',').expect_err("bad age");
    match err {
        IngestError::InvalidValue {
            field, value, line, ..
        } => {
            assert_eq!(field, "age_at_admit");
            assert_eq!(value, "thirty");
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_subject_is_rejected() {
    let file = temp_csv("Subject,Gender\n7,Female\n7.0,Male\n");
    let err = load_subject_details(file.path(), b',').expect_err("duplicate");
    assert!(matches!(err, IngestError::DuplicateSubject { line: 3, .. }));
}

#[test]
fn blank_subject_is_invalid() {
    let file = temp_csv("Subject,Gender\n,Female\n");
    let err = load_subject_details(file.path(), b',').expect_err("blank subject");
    assert!(matches!(err, IngestError::InvalidValue { line: 2, .. }));
}
