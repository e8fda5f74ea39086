use std::collections::BTreeMap;

use crate::{primitives::*, utxo::UtxoWithMeta};

pub type WantedAmounts = BTreeMap<TokenType, TokenAmount>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsufficientCoins {
    pub token_type: TokenType,
    pub amount: TokenAmount,
}

/// Pluggable strategy choosing which available coins cover `wanted`.
///
/// Runs while the wallet state is write locked, so an implementation must
/// not read or modify the wallet it is selecting for.
pub trait CoinSelection: Send + Sync {
    fn select(
        &self,
        available: &[UtxoWithMeta],
        wanted: &WantedAmounts,
    ) -> Result<Vec<UtxoWithMeta>, InsufficientCoins>;
}

impl<F> CoinSelection for F
where
    F: Fn(&[UtxoWithMeta], &WantedAmounts) -> Result<Vec<UtxoWithMeta>, InsufficientCoins>
        + Send
        + Sync,
{
    fn select(
        &self,
        available: &[UtxoWithMeta],
        wanted: &WantedAmounts,
    ) -> Result<Vec<UtxoWithMeta>, InsufficientCoins> {
        self(available, wanted)
    }
}
