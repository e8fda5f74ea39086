use thiserror::Error;

use crate::{
    history::error::HistoryError,
    primitives::{AddressError, TokenAmount, TokenType},
    sync::SyncError,
    transacting::error::TransactingError,
    utxo::{error::UtxoError, UtxoKey},
    wallet::SigningError,
};

pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Every failure a wallet operation can surface, one variant per kind.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("WalletError - UtxoNotFound: {0}")]
    UtxoNotFound(UtxoKey),
    #[error("WalletError - ApplyTransaction: {0}")]
    ApplyTransaction(String),
    #[error("WalletError - InsufficientFunds: {amount} of {token_type}")]
    InsufficientFunds {
        token_type: TokenType,
        amount: TokenAmount,
    },
    #[error("WalletError - Sync: {0}")]
    Sync(SyncError),
    #[error("WalletError - Transacting: {0}")]
    Transacting(TransactingError),
    #[error("WalletError - Sign: {0}")]
    Sign(String),
    #[error("WalletError - Address: {0}")]
    Address(#[from] AddressError),
    #[error("WalletError - Other: {message}")]
    Other {
        message: String,
        #[source]
        cause: Option<BoxedCause>,
    },
}

impl WalletError {
    pub fn other(cause: impl Into<BoxedCause>) -> Self {
        let cause = cause.into();
        Self::Other {
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub fn other_msg(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            cause: None,
        }
    }
}

impl From<UtxoError> for WalletError {
    fn from(err: UtxoError) -> Self {
        match err {
            UtxoError::UtxoNotFound(key) => Self::UtxoNotFound(key),
            err @ UtxoError::InvalidUpdateStatus { .. } => Self::ApplyTransaction(err.to_string()),
        }
    }
}

impl From<TransactingError> for WalletError {
    fn from(err: TransactingError) -> Self {
        match err {
            TransactingError::InsufficientFunds { token_type, amount } => {
                Self::InsufficientFunds { token_type, amount }
            }
            TransactingError::Utxo(err) => err.into(),
            TransactingError::Address(err) => Self::Address(err),
            TransactingError::Sign(message) => Self::Sign(message),
            err => Self::Transacting(err),
        }
    }
}

impl From<SyncError> for WalletError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Apply(err) => err.into(),
            err => Self::Sync(err),
        }
    }
}

impl From<SigningError> for WalletError {
    fn from(err: SigningError) -> Self {
        Self::Sign(err.to_string())
    }
}

impl From<HistoryError> for WalletError {
    fn from(err: HistoryError) -> Self {
        Self::other(err)
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_module_errors_to_their_kind() {
        let key = UtxoKey {
            intent_hash: "a".into(),
            output_index: 0,
        };
        assert!(matches!(
            WalletError::from(TransactingError::Utxo(UtxoError::UtxoNotFound(key.clone()))),
            WalletError::UtxoNotFound(k) if k == key
        ));
        assert!(matches!(
            WalletError::from(TransactingError::InsufficientFunds {
                token_type: "T".into(),
                amount: 150u64.into()
            }),
            WalletError::InsufficientFunds { amount, .. } if amount == 150u64.into()
        ));
        assert!(matches!(
            WalletError::from(TransactingError::EmptyTransfer),
            WalletError::Transacting(_)
        ));
        assert!(matches!(
            WalletError::from(SyncError::Connection("down".to_string())),
            WalletError::Sync(_)
        ));
    }

    #[test]
    fn other_keeps_its_cause() {
        let err = WalletError::other(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("boom"));
    }
}
