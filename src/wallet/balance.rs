use std::collections::BTreeMap;

use super::entity::CoreWallet;
use crate::{primitives::*, utxo::UtxoWithMeta};

pub type Balances = BTreeMap<TokenType, TokenAmount>;

/// Coin and balance views over a wallet snapshot.
pub struct WalletBalances<'a> {
    wallet: &'a CoreWallet,
}

impl<'a> WalletBalances<'a> {
    pub fn new(wallet: &'a CoreWallet) -> Self {
        Self { wallet }
    }

    pub fn available_coins(&self) -> Vec<&'a UtxoWithMeta> {
        self.wallet.state.available_utxos().collect()
    }

    pub fn pending_coins(&self) -> Vec<&'a UtxoWithMeta> {
        self.wallet.state.pending_utxos().collect()
    }

    pub fn total_coins(&self) -> Vec<&'a UtxoWithMeta> {
        self.wallet
            .state
            .available_utxos()
            .chain(self.wallet.state.pending_utxos())
            .collect()
    }

    pub fn available_balances(&self) -> Balances {
        calculate_balances(self.wallet.state.available_utxos())
    }

    pub fn pending_balances(&self) -> Balances {
        calculate_balances(self.wallet.state.pending_utxos())
    }

    pub fn total_balances(&self) -> Balances {
        let mut total = self.available_balances();
        for (token_type, amount) in self.pending_balances() {
            *total.entry(token_type).or_default() += amount;
        }
        total
    }
}

pub fn calculate_balances<'a>(utxos: impl Iterator<Item = &'a UtxoWithMeta>) -> Balances {
    utxos.fold(Balances::new(), |mut acc, coin| {
        *acc.entry(coin.utxo.token_type.clone()).or_default() += coin.utxo.value;
        acc
    })
}
