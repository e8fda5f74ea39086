use thiserror::Error;

use crate::utxo::error::UtxoError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("SyncError - InvalidIndexerUrl: {0}")]
    InvalidIndexerUrl(String),
    #[error("SyncError - Connection: {0}")]
    Connection(String),
    #[error("SyncError - Decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("SyncError - Schema: {0}")]
    Schema(String),
    #[error("SyncError - Apply: {0}")]
    Apply(#[from] UtxoError),
}
