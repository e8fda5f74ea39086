use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::SyncError;
use crate::{history::TransactionResultStatus, primitives::*, utxo::*};

/// One decoded message of the unshielded transaction feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WalletSyncUpdate {
    #[serde(rename = "UnshieldedTransactionsProgress", rename_all = "camelCase")]
    Progress { highest_transaction_id: TransactionId },
    #[serde(rename = "UnshieldedTransaction")]
    Transaction(TransactionMessage),
}

impl WalletSyncUpdate {
    pub fn decode(payload: serde_json::Value) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(payload)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    pub transaction: FeedTransaction,
    pub created_utxos: Vec<FeedUtxo>,
    pub spent_utxos: Vec<FeedUtxo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedTransactionKind {
    RegularTransaction,
    SystemTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedBlock {
    /// unix milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedFees {
    pub paid_fees: TokenAmount,
    pub estimated_fees: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSegment {
    pub id: u64,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedTransactionResult {
    pub status: TransactionResultStatus,
    pub segments: Option<Vec<FeedSegment>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTransaction {
    pub id: TransactionId,
    pub hash: TransactionHash,
    #[serde(rename = "type")]
    pub kind: FeedTransactionKind,
    pub protocol_version: u64,
    #[serde(default)]
    pub identifiers: Vec<String>,
    pub block: Option<FeedBlock>,
    pub fees: Option<FeedFees>,
    pub transaction_result: Option<FeedTransactionResult>,
}

impl FeedTransaction {
    pub fn is_regular(&self) -> bool {
        self.kind == FeedTransactionKind::RegularTransaction
    }

    pub fn update_status(&self) -> UpdateStatus {
        match self.transaction_result.as_ref().map(|result| result.status) {
            Some(TransactionResultStatus::Failure) if self.is_regular() => UpdateStatus::Failure,
            _ => UpdateStatus::Success,
        }
    }

    pub fn block_timestamp(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
        self.block
            .as_ref()
            .map(|block| {
                Utc.timestamp_millis_opt(block.timestamp)
                    .single()
                    .ok_or_else(|| {
                        SyncError::Schema(format!(
                            "block timestamp {} out of range in transaction {}",
                            block.timestamp, self.hash
                        ))
                    })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedUtxo {
    pub value: TokenAmount,
    pub owner: UserAddress,
    pub token_type: TokenType,
    pub intent_hash: IntentHash,
    pub output_index: u32,
    /// unix seconds
    pub ctime: Option<i64>,
    pub registered_for_dust_generation: bool,
}

impl TryFrom<&FeedUtxo> for UtxoWithMeta {
    type Error = SyncError;

    fn try_from(utxo: &FeedUtxo) -> Result<Self, Self::Error> {
        let ctime = utxo
            .ctime
            .map(|secs| {
                Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
                    SyncError::Schema(format!("ctime {secs} out of range for {}", utxo.intent_hash))
                })
            })
            .transpose()?;
        Ok(UtxoWithMeta::new(
            Utxo {
                value: utxo.value,
                owner: utxo.owner,
                token_type: utxo.token_type.clone(),
                intent_hash: utxo.intent_hash.clone(),
                output_index: utxo.output_index,
            },
            UtxoMeta {
                ctime,
                registered_for_dust_generation: utxo.registered_for_dust_generation,
            },
        ))
    }
}

impl TryFrom<&TransactionMessage> for TransactionUpdate {
    type Error = SyncError;

    fn try_from(message: &TransactionMessage) -> Result<Self, Self::Error> {
        let convert = |utxos: &[FeedUtxo]| {
            utxos
                .iter()
                .map(UtxoWithMeta::try_from)
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(TransactionUpdate {
            created_utxos: convert(&message.created_utxos)?,
            spent_utxos: convert(&message.spent_utxos)?,
            status: message.transaction.update_status(),
            transaction_id: message.transaction.id,
            transaction_hash: message.transaction.hash.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const OWNER: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    fn utxo_json(index: u32) -> serde_json::Value {
        json!({
            "value": "340282366920938463463374607431768211455",
            "owner": OWNER,
            "tokenType": "T",
            "intentHash": "intent",
            "outputIndex": index,
            "ctime": 1_700_000_000,
            "registeredForDustGeneration": true
        })
    }

    fn transaction_json(result: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "UnshieldedTransaction",
            "transaction": {
                "id": 7,
                "hash": "abc",
                "type": "RegularTransaction",
                "protocolVersion": 1,
                "identifiers": ["id-1"],
                "block": { "timestamp": 1_700_000_000_123i64 },
                "fees": { "paidFees": "10", "estimatedFees": "12" },
                "transactionResult": result
            },
            "createdUtxos": [utxo_json(0)],
            "spentUtxos": []
        })
    }

    #[test]
    fn decodes_progress() {
        let update = WalletSyncUpdate::decode(json!({
            "type": "UnshieldedTransactionsProgress",
            "highestTransactionId": 10
        }))
        .unwrap();
        assert_eq!(
            update,
            WalletSyncUpdate::Progress {
                highest_transaction_id: 10
            }
        );
    }

    #[test]
    fn decodes_transaction_into_update() {
        let update = WalletSyncUpdate::decode(transaction_json(
            json!({ "status": "SUCCESS", "segments": [{ "id": 0, "success": true }] }),
        ))
        .unwrap();
        let WalletSyncUpdate::Transaction(message) = update else {
            panic!("expected a transaction message");
        };
        let update = TransactionUpdate::try_from(&message).unwrap();
        assert_eq!(update.status, UpdateStatus::Success);
        assert_eq!(update.transaction_id, 7);
        assert_eq!(update.created_utxos.len(), 1);
        let coin = &update.created_utxos[0];
        assert_eq!(coin.utxo.value.into_inner(), u128::MAX);
        assert_eq!(
            coin.meta.ctime,
            Utc.timestamp_opt(1_700_000_000, 0).single()
        );
        assert!(coin.meta.registered_for_dust_generation);
    }

    #[test]
    fn status_mapping() {
        let decode = |status: &str| {
            let WalletSyncUpdate::Transaction(message) = WalletSyncUpdate::decode(
                transaction_json(json!({ "status": status, "segments": null })),
            )
            .unwrap() else {
                panic!("expected a transaction message");
            };
            message.transaction.update_status()
        };
        assert_eq!(decode("SUCCESS"), UpdateStatus::Success);
        assert_eq!(decode("PARTIAL_SUCCESS"), UpdateStatus::Success);
        assert_eq!(decode("FAILURE"), UpdateStatus::Failure);
    }

    #[test]
    fn system_transactions_succeed() {
        let mut payload = transaction_json(serde_json::Value::Null);
        payload["transaction"]["type"] = json!("SystemTransaction");
        let WalletSyncUpdate::Transaction(message) = WalletSyncUpdate::decode(payload).unwrap()
        else {
            panic!("expected a transaction message");
        };
        assert_eq!(message.transaction.update_status(), UpdateStatus::Success);
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(WalletSyncUpdate::decode(json!({ "type": "Unknown" })).is_err());
        assert!(WalletSyncUpdate::decode(json!({
            "type": "UnshieldedTransactionsProgress",
            "highestTransactionId": "ten"
        }))
        .is_err());

        let mut bad_owner = transaction_json(serde_json::Value::Null);
        bad_owner["createdUtxos"][0]["owner"] = json!("not-hex");
        assert!(matches!(
            WalletSyncUpdate::decode(bad_owner),
            Err(SyncError::Decode(_))
        ));

        let mut bad_value = transaction_json(serde_json::Value::Null);
        bad_value["createdUtxos"][0]["value"] = json!("-1");
        assert!(WalletSyncUpdate::decode(bad_value).is_err());
    }
}
