mod address;
pub mod error;

use serde::{Deserialize, Serialize};

use std::fmt;

pub use address::*;
pub use error::AddressError;

pub type TransactionId = u64;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

string_id! { TokenType }
string_id! { IntentHash }
string_id! { TransactionHash }
string_id! { PublicKey }
string_id! { Signature }
string_id! { NetworkId }

impl NetworkId {
    pub const MAINNET: &'static str = "mainnet";

    pub fn is_mainnet(&self) -> bool {
        self.0 == Self::MAINNET
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProtocolVersion(u64);

impl ProtocolVersion {
    pub const MIN_SUPPORTED: Self = Self(1);

    pub fn new(version: u64) -> Self {
        Self(version)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unsigned token quantity. Serialized as a decimal string so values above
/// 2^53 survive JSON encoders that only know doubles.
#[serde_with::serde_as]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TokenAmount(#[serde_as(as = "serde_with::DisplayFromStr")] u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn into_inner(self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<u32> for TokenAmount {
    fn from(value: u32) -> Self {
        Self(u128::from(value))
    }
}

impl From<TokenAmount> for u128 {
    fn from(amount: TokenAmount) -> u128 {
        amount.0
    }
}

impl std::str::FromStr for TokenAmount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Saturating. Use `checked_add` where overflow must surface as an error.
impl std::ops::Add<TokenAmount> for TokenAmount {
    type Output = TokenAmount;
    fn add(self, rhs: TokenAmount) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign<TokenAmount> for TokenAmount {
    fn add_assign(&mut self, rhs: TokenAmount) {
        *self = *self + rhs
    }
}

impl std::iter::Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(TokenAmount::ZERO, |a, b| a + b)
    }
}

impl<'a> std::iter::Sum<&'a TokenAmount> for TokenAmount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(TokenAmount::ZERO, |a, b| a + *b)
    }
}
