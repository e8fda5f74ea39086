use thiserror::Error;

use super::entity::{UpdateStatus, UtxoKey};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtxoError {
    #[error("UtxoError - UtxoNotFound: {0}")]
    UtxoNotFound(UtxoKey),
    #[error("UtxoError - InvalidUpdateStatus: expected {expected}, got {actual}")]
    InvalidUpdateStatus {
        expected: UpdateStatus,
        actual: UpdateStatus,
    },
}
