mod builder;
mod coin_selection;
pub mod error;
mod recipe;
mod transaction;

use chrono::{DateTime, Utc};
use tracing::instrument;

use std::{collections::BTreeSet, sync::Arc};

use crate::{primitives::*, utxo::*, wallet::CoreWallet};

pub use builder::*;
pub use coin_selection::*;
pub use error::TransactingError;
pub use recipe::*;
pub use transaction::*;

/// Builds transaction skeletons out of a wallet snapshot.
///
/// Every operation is a pure function of the snapshot it is handed. On
/// success it returns the recipe together with the next snapshot in which
/// the selected coins are pending, on failure the caller keeps the old one.
#[derive(Clone)]
pub struct Transacting {
    coin_selection: Arc<dyn CoinSelection>,
}

impl Transacting {
    pub fn new(coin_selection: Arc<dyn CoinSelection>) -> Self {
        Self { coin_selection }
    }

    #[instrument(
        name = "transacting.transfer_transaction",
        skip_all,
        fields(n_outputs = outputs.len(), n_inputs),
        err
    )]
    pub fn transfer_transaction(
        &self,
        wallet: &CoreWallet,
        outputs: &[TokenTransfer],
        ttl: DateTime<Utc>,
    ) -> Result<(ProvingRecipe, CoreWallet), TransactingError> {
        if outputs.is_empty() {
            return Err(TransactingError::EmptyTransfer);
        }
        let wanted = wanted_amounts(
            outputs
                .iter()
                .map(|transfer| (&transfer.token_type, transfer.amount)),
        )?;
        let payments = resolve_receivers(outputs, &wallet.network_id)?;

        let (spent, next) = self.select_and_spend(wallet, &wanted, &BTreeSet::new())?;
        tracing::Span::current().record("n_inputs", spent.len());

        let mut builder = OfferBuilder::new(*wallet.address()).spend_coins(spent.iter());
        for (owner, transfer) in payments {
            builder = builder.pay(owner, transfer.token_type.clone(), transfer.amount);
        }
        let offer = builder.add_change(&spent, &wanted)?.build();

        let transaction = UnprovenTransaction::new(wallet.network_id.clone(), ttl, offer);
        Ok((ProvingRecipe::TransactionToProve { transaction }, next))
    }

    /// Builds this side of a swap: spends coins worth `desired_inputs` and
    /// asks for `desired_outputs` in return. The result stays
    /// unbalanced until a counterparty balances it.
    #[instrument(
        name = "transacting.init_swap",
        skip_all,
        fields(n_desired_inputs = desired_inputs.len(), n_desired_outputs = desired_outputs.len()),
        err
    )]
    pub fn init_swap(
        &self,
        wallet: &CoreWallet,
        desired_inputs: &WantedAmounts,
        desired_outputs: &[TokenTransfer],
        ttl: DateTime<Utc>,
    ) -> Result<(ProvingRecipe, CoreWallet), TransactingError> {
        if desired_inputs.is_empty() && desired_outputs.is_empty() {
            return Err(TransactingError::EmptyTransfer);
        }
        let wanted = wanted_amounts(desired_inputs.iter().map(|(token, amount)| (token, *amount)))?;
        wanted_amounts(
            desired_outputs
                .iter()
                .map(|transfer| (&transfer.token_type, transfer.amount)),
        )?;
        let payments = resolve_receivers(desired_outputs, &wallet.network_id)?;

        let (spent, next) = self.select_and_spend(wallet, &wanted, &BTreeSet::new())?;

        let mut builder = OfferBuilder::new(*wallet.address()).spend_coins(spent.iter());
        for (owner, transfer) in payments {
            builder = builder.pay(owner, transfer.token_type.clone(), transfer.amount);
        }
        let offer = builder.add_change(&spent, &wanted)?.build();

        let transaction = UnprovenTransaction::new(wallet.network_id.clone(), ttl, offer);
        Ok((ProvingRecipe::TransactionToProve { transaction }, next))
    }

    /// Covers every token whose outputs exceed its inputs out of this
    /// wallet's available coins and claims every token whose inputs exceed
    /// its outputs. A transaction that is already balanced comes back
    /// unchanged and nothing is spent.
    #[instrument(
        name = "transacting.balance_transaction",
        skip_all,
        fields(n_deficits, n_surpluses, n_inputs),
        err
    )]
    pub fn balance_transaction(
        &self,
        wallet: &CoreWallet,
        transaction: &UnprovenTransaction,
    ) -> Result<(ProvingRecipe, CoreWallet), TransactingError> {
        if transaction.network_id != wallet.network_id {
            return Err(TransactingError::NetworkMismatch {
                expected: wallet.network_id.clone(),
                found: transaction.network_id.clone(),
            });
        }
        let imbalances = transaction.imbalances()?;
        let wanted: WantedAmounts = imbalances
            .iter()
            .filter_map(|(token_type, imbalance)| {
                imbalance.deficit().map(|deficit| (token_type.clone(), deficit))
            })
            .collect();
        let surpluses: Vec<(TokenType, TokenAmount)> = imbalances
            .into_iter()
            .filter_map(|(token_type, imbalance)| {
                imbalance.surplus().map(|surplus| (token_type, surplus))
            })
            .collect();
        let span = tracing::Span::current();
        span.record("n_deficits", wanted.len());
        span.record("n_surpluses", surpluses.len());

        if wanted.is_empty() && surpluses.is_empty() {
            return Ok((
                ProvingRecipe::BalanceTransactionToProve {
                    transaction_to_prove: transaction.clone(),
                    transaction_to_balance: transaction.clone(),
                },
                wallet.clone(),
            ));
        }

        let already_spent: BTreeSet<UtxoKey> = transaction
            .offer
            .inputs
            .iter()
            .map(UtxoSpend::key)
            .collect();
        let (spent, next) = self.select_and_spend(wallet, &wanted, &already_spent)?;
        span.record("n_inputs", spent.len());

        let mut builder = OfferBuilder::from_offer(*wallet.address(), transaction.offer.clone())
            .spend_coins(spent.iter())
            .add_change(&spent, &wanted)?;
        for (token_type, surplus) in surpluses {
            builder = builder.pay(*wallet.address(), token_type, surplus);
        }
        let balanced = UnprovenTransaction::new(
            transaction.network_id.clone(),
            transaction.ttl,
            builder.build(),
        );

        Ok((
            ProvingRecipe::BalanceTransactionToProve {
                transaction_to_prove: balanced,
                transaction_to_balance: transaction.clone(),
            },
            next,
        ))
    }

    /// Signs every input that does not carry a signature yet.
    #[instrument(name = "transacting.sign_transaction", skip_all, fields(n_signed), err)]
    pub fn sign_transaction<F, E>(
        transaction: &UnprovenTransaction,
        sign: F,
    ) -> Result<UnprovenTransaction, TransactingError>
    where
        F: Fn(&[u8]) -> Result<Signature, E>,
        E: std::fmt::Display,
    {
        let payload = transaction.signing_payload()?;
        let mut signed = transaction.clone();
        let mut n_signed = 0;
        for input in signed.offer.inputs.iter_mut() {
            if input.signature.is_none() {
                let signature =
                    sign(&payload).map_err(|e| TransactingError::Sign(e.to_string()))?;
                input.signature = Some(signature);
                n_signed += 1;
            }
        }
        tracing::Span::current().record("n_signed", n_signed);
        Ok(signed)
    }

    fn select_and_spend(
        &self,
        wallet: &CoreWallet,
        wanted: &WantedAmounts,
        exclude: &BTreeSet<UtxoKey>,
    ) -> Result<(Vec<UtxoWithMeta>, CoreWallet), TransactingError> {
        if wanted.is_empty() {
            return Ok((Vec::new(), wallet.clone()));
        }
        let available: Vec<UtxoWithMeta> = wallet
            .state
            .available_utxos()
            .filter(|coin| !exclude.contains(&coin.key()))
            .cloned()
            .collect();
        let selected = self
            .coin_selection
            .select(&available, wanted)
            .map_err(
                |InsufficientCoins { token_type, amount }| TransactingError::InsufficientFunds {
                    token_type,
                    amount,
                },
            )?;

        let totals = sum_by_token(&selected)?;
        for (token_type, amount) in wanted {
            if totals.get(token_type).copied().unwrap_or_default() < *amount {
                return Err(TransactingError::InsufficientFunds {
                    token_type: token_type.clone(),
                    amount: *amount,
                });
            }
        }

        Ok(wallet.spend(selected.iter().map(|coin| &coin.utxo))?)
    }
}

fn wanted_amounts<'a>(
    amounts: impl Iterator<Item = (&'a TokenType, TokenAmount)>,
) -> Result<WantedAmounts, TransactingError> {
    let mut wanted = WantedAmounts::new();
    for (token_type, amount) in amounts {
        if amount.is_zero() {
            return Err(TransactingError::InvalidAmount(token_type.clone()));
        }
        let total = wanted.entry(token_type.clone()).or_default();
        *total = total
            .checked_add(amount)
            .ok_or_else(|| TransactingError::AmountOverflow(token_type.clone()))?;
    }
    Ok(wanted)
}

fn resolve_receivers<'a>(
    transfers: &'a [TokenTransfer],
    network_id: &NetworkId,
) -> Result<Vec<(UserAddress, &'a TokenTransfer)>, TransactingError> {
    transfers
        .iter()
        .map(|transfer| {
            let receiver = UnshieldedAddress::decode(&transfer.receiver_address, network_id)?;
            Ok((receiver.address, transfer))
        })
        .collect()
}
