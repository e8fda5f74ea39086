use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::primitives::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionResultStatus {
    Success,
    Failure,
    PartialSuccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub id: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub status: TransactionResultStatus,
    pub segments: Vec<SegmentResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryEntry {
    pub id: TransactionId,
    pub hash: TransactionHash,
    pub protocol_version: ProtocolVersion,
    pub identifiers: Vec<String>,
    pub transaction_result: Option<TransactionResult>,
    pub timestamp: Option<DateTime<Utc>>,
    pub fees: Option<TokenAmount>,
}
