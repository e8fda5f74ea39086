use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use super::error::TransactingError;
use crate::{primitives::*, utxo::*};

/// Requested payment of `amount` of `token_type` to a bech32m encoded address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token_type: TokenType,
    pub amount: TokenAmount,
    pub receiver_address: String,
}

impl TokenTransfer {
    pub fn new(
        token_type: impl Into<TokenType>,
        amount: impl Into<TokenAmount>,
        receiver_address: impl Into<String>,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            amount: amount.into(),
            receiver_address: receiver_address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoSpend {
    pub value: TokenAmount,
    pub owner: UserAddress,
    pub token_type: TokenType,
    pub intent_hash: IntentHash,
    pub output_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl UtxoSpend {
    pub fn key(&self) -> UtxoKey {
        UtxoKey {
            intent_hash: self.intent_hash.clone(),
            output_index: self.output_index,
        }
    }
}

impl From<&Utxo> for UtxoSpend {
    fn from(utxo: &Utxo) -> Self {
        Self {
            value: utxo.value,
            owner: utxo.owner,
            token_type: utxo.token_type.clone(),
            intent_hash: utxo.intent_hash.clone(),
            output_index: utxo.output_index,
            signature: None,
        }
    }
}

impl From<&UtxoSpend> for Utxo {
    fn from(spend: &UtxoSpend) -> Self {
        Self {
            value: spend.value,
            owner: spend.owner,
            token_type: spend.token_type.clone(),
            intent_hash: spend.intent_hash.clone(),
            output_index: spend.output_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoOutput {
    pub value: TokenAmount,
    pub owner: UserAddress,
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnshieldedOffer {
    pub inputs: Vec<UtxoSpend>,
    pub outputs: Vec<UtxoOutput>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenImbalance {
    pub inputs: TokenAmount,
    pub outputs: TokenAmount,
}

impl TokenImbalance {
    /// Amount the inputs fall short of the outputs.
    pub fn deficit(&self) -> Option<TokenAmount> {
        self.outputs
            .checked_sub(self.inputs)
            .filter(|amount| !amount.is_zero())
    }

    pub fn surplus(&self) -> Option<TokenAmount> {
        self.inputs
            .checked_sub(self.outputs)
            .filter(|amount| !amount.is_zero())
    }
}

/// Transaction skeleton that still has to be proven before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnprovenTransaction {
    pub network_id: NetworkId,
    pub ttl: DateTime<Utc>,
    pub offer: UnshieldedOffer,
}

impl UnprovenTransaction {
    pub fn new(network_id: NetworkId, ttl: DateTime<Utc>, offer: UnshieldedOffer) -> Self {
        Self {
            network_id,
            ttl,
            offer,
        }
    }

    /// Per-token input and output totals. Fails if a total overflows.
    pub fn imbalances(&self) -> Result<BTreeMap<TokenType, TokenImbalance>, TransactingError> {
        let mut imbalances: BTreeMap<TokenType, TokenImbalance> = BTreeMap::new();
        for input in self.offer.inputs.iter() {
            let entry = imbalances.entry(input.token_type.clone()).or_default();
            entry.inputs = entry
                .inputs
                .checked_add(input.value)
                .ok_or_else(|| TransactingError::AmountOverflow(input.token_type.clone()))?;
        }
        for output in self.offer.outputs.iter() {
            let entry = imbalances.entry(output.token_type.clone()).or_default();
            entry.outputs = entry
                .outputs
                .checked_add(output.value)
                .ok_or_else(|| TransactingError::AmountOverflow(output.token_type.clone()))?;
        }
        Ok(imbalances)
    }

    /// `false` for transactions whose totals overflow.
    pub fn is_balanced(&self) -> bool {
        self.imbalances().map_or(false, |imbalances| {
            imbalances
                .values()
                .all(|imbalance| imbalance.deficit().is_none() && imbalance.surplus().is_none())
        })
    }

    /// Canonical bytes covered by input signatures.
    pub fn signing_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut unsigned = self.clone();
        for input in unsigned.offer.inputs.iter_mut() {
            input.signature = None;
        }
        serde_json::to_vec(&unsigned)
    }
}
