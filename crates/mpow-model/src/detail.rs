use serde::{Deserialize, Serialize};

use crate::SubjectId;

/// Per-subject covariates from the patient features table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDetail {
    pub subject_id: SubjectId,
    pub age_at_admit: Option<u32>,
    pub gender: Option<String>,
    pub impairment_group: Option<String>,
    pub depression: Option<bool>,
}
