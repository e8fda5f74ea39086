mod entity;
pub mod error;
mod storage;

use futures::stream::BoxStream;
use tracing::instrument;

use std::sync::Arc;

use crate::{primitives::*, sync::FeedTransaction};

pub use entity::*;
pub use error::HistoryError;
pub use storage::*;

/// Records reconciled transactions in a pluggable storage.
#[derive(Clone)]
pub struct TransactionHistory {
    storage: Arc<dyn TransactionHistoryStorage>,
}

impl TransactionHistory {
    pub fn new(storage: Arc<dyn TransactionHistoryStorage>) -> Self {
        Self { storage }
    }

    pub fn no_op() -> Self {
        Self::new(Arc::new(NoOpTransactionHistoryStorage))
    }

    #[instrument(name = "history.create", skip_all, fields(hash = %transaction.hash), err)]
    pub async fn create(&self, transaction: &FeedTransaction) -> Result<(), HistoryError> {
        self.storage.create(to_entry(transaction)?).await
    }

    pub async fn get(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        self.storage.get(hash).await
    }

    pub fn get_all(&self) -> BoxStream<'_, TransactionHistoryEntry> {
        self.storage.get_all()
    }

    pub async fn delete(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        self.storage.delete(hash).await
    }
}

pub(crate) fn to_entry(
    transaction: &FeedTransaction,
) -> Result<TransactionHistoryEntry, HistoryError> {
    let regular = transaction.is_regular();
    let transaction_result = transaction
        .transaction_result
        .as_ref()
        .filter(|_| regular)
        .map(|result| TransactionResult {
            status: result.status,
            segments: result
                .segments
                .iter()
                .flatten()
                .map(|segment| SegmentResult {
                    id: segment.id.to_string(),
                    success: segment.success,
                })
                .collect(),
        });
    Ok(TransactionHistoryEntry {
        id: transaction.id,
        hash: transaction.hash.clone(),
        protocol_version: ProtocolVersion::new(transaction.protocol_version),
        identifiers: if regular {
            transaction.identifiers.clone()
        } else {
            Vec::new()
        },
        transaction_result,
        timestamp: transaction
            .block_timestamp()
            .map_err(|e| HistoryError::InvalidEntry(e.to_string()))?,
        fees: transaction
            .fees
            .as_ref()
            .filter(|_| regular)
            .map(|fees| fees.paid_fees),
    })
}
