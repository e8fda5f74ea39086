use serde::{Deserialize, Serialize};

use crate::primitives::TransactionId;

pub const DEFAULT_ALLOWED_GAP: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    pub applied_id: TransactionId,
    pub highest_transaction_id: TransactionId,
    pub is_connected: bool,
}

/// Partial update merged by [`SyncProgress::update`]; `None` keeps the previous value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProgressUpdate {
    pub applied_id: Option<TransactionId>,
    pub highest_transaction_id: Option<TransactionId>,
    pub is_connected: Option<bool>,
}

impl SyncProgressUpdate {
    pub fn applied(id: TransactionId) -> Self {
        Self {
            applied_id: Some(id),
            ..Default::default()
        }
    }

    pub fn connected_at(highest_transaction_id: TransactionId) -> Self {
        Self {
            highest_transaction_id: Some(highest_transaction_id),
            is_connected: Some(true),
            ..Default::default()
        }
    }

    pub fn disconnected() -> Self {
        Self {
            is_connected: Some(false),
            ..Default::default()
        }
    }
}

impl SyncProgress {
    pub fn new(
        applied_id: TransactionId,
        highest_transaction_id: TransactionId,
        is_connected: bool,
    ) -> Self {
        Self {
            applied_id,
            highest_transaction_id,
            is_connected,
        }
    }

    pub fn update(&self, update: SyncProgressUpdate) -> Self {
        Self {
            applied_id: update.applied_id.unwrap_or(self.applied_id),
            highest_transaction_id: update
                .highest_transaction_id
                .unwrap_or(self.highest_transaction_id),
            is_connected: update.is_connected.unwrap_or(self.is_connected),
        }
    }

    pub fn gap(&self) -> u64 {
        self.highest_transaction_id.abs_diff(self.applied_id)
    }

    pub fn is_complete_within(&self, max_gap: u64) -> bool {
        self.is_connected && self.gap() <= max_gap
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete_within(DEFAULT_ALLOWED_GAP)
    }

    pub fn is_strictly_complete(&self) -> bool {
        self.is_complete_within(0)
    }
}
