use super::transaction::UnprovenTransaction;

/// Hand-off to the prover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvingRecipe {
    TransactionToProve {
        transaction: UnprovenTransaction,
    },
    BalanceTransactionToProve {
        transaction_to_prove: UnprovenTransaction,
        transaction_to_balance: UnprovenTransaction,
    },
}

impl ProvingRecipe {
    pub fn transaction(&self) -> &UnprovenTransaction {
        match self {
            Self::TransactionToProve { transaction } => transaction,
            Self::BalanceTransactionToProve {
                transaction_to_prove,
                ..
            } => transaction_to_prove,
        }
    }
}
