use thiserror::Error;

/// Configuration and conversion failures of the form machinery.
///
/// Validation messages are not errors; they live on each `Field`.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("initial values must serialize to an object, got {0}")]
    InitialValues(String),

    #[error("values error: {0}")]
    Values(#[from] serde_json::Error),
}

pub type Result<T, E = FormError> = std::result::Result<T, E>;
