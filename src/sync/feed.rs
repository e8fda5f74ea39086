use async_trait::async_trait;
use futures::stream::BoxStream;

use super::error::SyncError;
use crate::primitives::{TransactionId, UserAddress};

pub type FeedPayload = serde_json::Value;
pub type FeedStream = BoxStream<'static, Result<FeedPayload, SyncError>>;

/// Resume point of a subscription. The feed delivers transactions after
/// `transaction_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub transaction_id: TransactionId,
}

impl FeedCursor {
    pub fn after(transaction_id: TransactionId) -> Self {
        Self { transaction_id }
    }
}

/// Subscription to the unshielded transactions of one address.
#[async_trait]
pub trait TransactionFeed: Send + Sync {
    async fn subscribe(
        &self,
        address: &UserAddress,
        cursor: FeedCursor,
    ) -> Result<FeedStream, SyncError>;
}
