use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("HistoryError - Serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("HistoryError - InvalidEntry: {0}")]
    InvalidEntry(String),
    #[error("HistoryError - Storage: {0}")]
    Storage(String),
}
