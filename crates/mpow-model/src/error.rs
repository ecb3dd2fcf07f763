use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("subject identifier is empty")]
    EmptySubjectId,
    #[error("unknown measurement type: {0}")]
    UnknownMeasurementType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
