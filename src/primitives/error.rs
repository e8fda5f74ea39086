use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("AddressError - MalformedHex: '{original_address}': {message}")]
    MalformedHex {
        original_address: String,
        message: String,
    },
    #[error("AddressError - InvalidLength: '{original_address}' decodes to {len} bytes")]
    InvalidLength { original_address: String, len: usize },
    #[error("AddressError - Bech32: '{original_address}': {message}")]
    Bech32 {
        original_address: String,
        message: String,
    },
    #[error("AddressError - UnsupportedVariant: '{original_address}' is not bech32m")]
    UnsupportedVariant { original_address: String },
    #[error(
        "AddressError - NetworkMismatch: '{original_address}' expected prefix {expected}, found {found}"
    )]
    NetworkMismatch {
        original_address: String,
        expected: String,
        found: String,
    },
}

impl AddressError {
    pub fn original_address(&self) -> &str {
        match self {
            Self::MalformedHex {
                original_address, ..
            }
            | Self::InvalidLength {
                original_address, ..
            }
            | Self::Bech32 {
                original_address, ..
            }
            | Self::UnsupportedVariant { original_address }
            | Self::NetworkMismatch {
                original_address, ..
            } => original_address,
        }
    }
}
