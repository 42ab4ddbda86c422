use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown drug or alias: {0}")]
    UnknownDrug(String),

    #[error("Unknown route of administration: {0}")]
    UnknownRoute(String),

    #[error("Input validation error: {0}")]
    Validation(String),
}

pub type DetectResult<T> = Result<T, DetectError>;
