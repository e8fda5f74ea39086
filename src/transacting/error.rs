use thiserror::Error;

use crate::{
    primitives::{AddressError, NetworkId, TokenAmount, TokenType},
    utxo::error::UtxoError,
};

#[derive(Error, Debug)]
pub enum TransactingError {
    #[error("TransactingError - InsufficientFunds: {amount} of {token_type}")]
    InsufficientFunds {
        token_type: TokenType,
        amount: TokenAmount,
    },
    #[error("TransactingError - EmptyTransfer: at least one output is required")]
    EmptyTransfer,
    #[error("TransactingError - InvalidAmount: amount of {0} must be positive")]
    InvalidAmount(TokenType),
    #[error("TransactingError - AmountOverflow: {0}")]
    AmountOverflow(TokenType),
    #[error("TransactingError - NetworkMismatch: expected {expected}, found {found}")]
    NetworkMismatch {
        expected: NetworkId,
        found: NetworkId,
    },
    #[error("TransactingError - Sign: {0}")]
    Sign(String),
    #[error("TransactingError - Address: {0}")]
    Address(#[from] AddressError),
    #[error("TransactingError - Encoding: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("TransactingError - Utxo: {0}")]
    Utxo(#[from] UtxoError),
}
