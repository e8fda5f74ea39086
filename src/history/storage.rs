use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;

use std::collections::HashMap;

use super::{entity::TransactionHistoryEntry, error::HistoryError};
use crate::primitives::TransactionHash;

#[async_trait]
pub trait TransactionHistoryStorage: Send + Sync {
    async fn create(&self, entry: TransactionHistoryEntry) -> Result<(), HistoryError>;
    async fn get(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError>;
    /// Lazily yields every stored entry. Call again to start over.
    fn get_all(&self) -> BoxStream<'_, TransactionHistoryEntry>;
    async fn delete(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError>;
}

#[derive(Default)]
pub struct InMemoryTransactionHistoryStorage {
    entries: RwLock<HashMap<TransactionHash, TransactionHistoryEntry>>,
}

impl InMemoryTransactionHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_serialized(serialized: &str) -> Result<Self, HistoryError> {
        let entries: Vec<TransactionHistoryEntry> = serde_json::from_str(serialized)?;
        Ok(Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|entry| (entry.hash.clone(), entry))
                    .collect(),
            ),
        })
    }

    pub async fn serialize(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.sorted_entries().await)?)
    }

    async fn sorted_entries(&self) -> Vec<TransactionHistoryEntry> {
        let mut entries: Vec<_> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}

#[async_trait]
impl TransactionHistoryStorage for InMemoryTransactionHistoryStorage {
    async fn create(&self, entry: TransactionHistoryEntry) -> Result<(), HistoryError> {
        self.entries.write().await.insert(entry.hash.clone(), entry);
        Ok(())
    }

    async fn get(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        Ok(self.entries.read().await.get(hash).cloned())
    }

    fn get_all(&self) -> BoxStream<'_, TransactionHistoryEntry> {
        stream::once(self.sorted_entries())
            .flat_map(stream::iter)
            .boxed()
    }

    async fn delete(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        Ok(self.entries.write().await.remove(hash))
    }
}

/// Discards everything. For wallets that keep no history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTransactionHistoryStorage;

#[async_trait]
impl TransactionHistoryStorage for NoOpTransactionHistoryStorage {
    async fn create(&self, _entry: TransactionHistoryEntry) -> Result<(), HistoryError> {
        Ok(())
    }

    async fn get(
        &self,
        _hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        Ok(None)
    }

    fn get_all(&self) -> BoxStream<'_, TransactionHistoryEntry> {
        stream::empty().boxed()
    }

    async fn delete(
        &self,
        _hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        Ok(None)
    }
}
