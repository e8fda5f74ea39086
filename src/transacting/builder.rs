use std::collections::BTreeMap;

use super::{coin_selection::WantedAmounts, error::TransactingError, transaction::*};
use crate::{primitives::*, utxo::UtxoWithMeta};

/// Accumulates the inputs and outputs of an offer. Change goes to `owner`.
pub struct OfferBuilder {
    owner: UserAddress,
    offer: UnshieldedOffer,
}

impl OfferBuilder {
    pub fn new(owner: UserAddress) -> Self {
        Self::from_offer(owner, UnshieldedOffer::default())
    }

    pub fn from_offer(owner: UserAddress, offer: UnshieldedOffer) -> Self {
        Self { owner, offer }
    }

    pub fn spend_coins<'a>(mut self, coins: impl IntoIterator<Item = &'a UtxoWithMeta>) -> Self {
        self.offer
            .inputs
            .extend(coins.into_iter().map(|coin| UtxoSpend::from(&coin.utxo)));
        self
    }

    pub fn pay(mut self, owner: UserAddress, token_type: TokenType, value: TokenAmount) -> Self {
        self.offer.outputs.push(UtxoOutput {
            value,
            owner,
            token_type,
        });
        self
    }

    /// Returns whatever `selected` holds beyond `wanted` to the owner, one
    /// output per token type.
    pub fn add_change(
        mut self,
        selected: &[UtxoWithMeta],
        wanted: &WantedAmounts,
    ) -> Result<Self, TransactingError> {
        for (token_type, total) in sum_by_token(selected)? {
            let required = wanted.get(&token_type).copied().unwrap_or_default();
            let change =
                total
                    .checked_sub(required)
                    .ok_or_else(|| TransactingError::InsufficientFunds {
                        token_type: token_type.clone(),
                        amount: required,
                    })?;
            if !change.is_zero() {
                let owner = self.owner;
                self = self.pay(owner, token_type, change);
            }
        }
        Ok(self)
    }

    pub fn build(self) -> UnshieldedOffer {
        self.offer
    }
}

pub(super) fn sum_by_token(
    coins: &[UtxoWithMeta],
) -> Result<BTreeMap<TokenType, TokenAmount>, TransactingError> {
    let mut totals: BTreeMap<TokenType, TokenAmount> = BTreeMap::new();
    for coin in coins {
        let total = totals.entry(coin.utxo.token_type.clone()).or_default();
        *total = total
            .checked_add(coin.utxo.value)
            .ok_or_else(|| TransactingError::AmountOverflow(coin.utxo.token_type.clone()))?;
    }
    Ok(totals)
}
