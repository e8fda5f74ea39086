use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::primitives::*;

/// Identity of a coin. Metadata never participates in equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoKey {
    pub intent_hash: IntentHash,
    pub output_index: u32,
}

impl fmt::Display for UtxoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.intent_hash, self.output_index)
    }
}

#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    #[builder(setter(into))]
    pub value: TokenAmount,
    pub owner: UserAddress,
    #[builder(setter(into))]
    pub token_type: TokenType,
    #[builder(setter(into))]
    pub intent_hash: IntentHash,
    pub output_index: u32,
}

impl Utxo {
    pub fn builder() -> UtxoBuilder {
        UtxoBuilder::default()
    }

    pub fn key(&self) -> UtxoKey {
        UtxoKey {
            intent_hash: self.intent_hash.clone(),
            output_index: self.output_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoMeta {
    pub ctime: Option<DateTime<Utc>>,
    pub registered_for_dust_generation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoWithMeta {
    pub utxo: Utxo,
    pub meta: UtxoMeta,
}

impl UtxoWithMeta {
    pub fn new(utxo: Utxo, meta: UtxoMeta) -> Self {
        Self { utxo, meta }
    }

    pub fn key(&self) -> UtxoKey {
        self.utxo.key()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateStatus {
    Success,
    Failure,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct TransactionUpdate {
    #[builder(default)]
    pub created_utxos: Vec<UtxoWithMeta>,
    #[builder(default)]
    pub spent_utxos: Vec<UtxoWithMeta>,
    pub status: UpdateStatus,
    pub transaction_id: TransactionId,
    #[builder(setter(into))]
    pub transaction_hash: TransactionHash,
}

impl TransactionUpdate {
    pub fn builder() -> TransactionUpdateBuilder {
        TransactionUpdateBuilder::default()
    }
}
