use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Serialize};

use std::fmt;

use super::{error::AddressError, NetworkId};

pub const USER_ADDRESS_LEN: usize = 32;
const ADDRESS_HRP_PREFIX: &str = "mn_addr";

/// Raw 32 byte owner of an unshielded output, hex encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserAddress([u8; USER_ADDRESS_LEN]);

impl UserAddress {
    pub fn from_bytes(bytes: [u8; USER_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; USER_ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::str::FromStr for UserAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| AddressError::MalformedHex {
            original_address: s.to_string(),
            message: e.to_string(),
        })?;
        let bytes: [u8; USER_ADDRESS_LEN] =
            bytes
                .try_into()
                .map_err(|bytes: Vec<u8>| AddressError::InvalidLength {
                    original_address: s.to_string(),
                    len: bytes.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for UserAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for UserAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Human facing bech32m form of a [`UserAddress`], bound to a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnshieldedAddress {
    pub address: UserAddress,
    pub network_id: NetworkId,
}

impl UnshieldedAddress {
    pub fn new(address: UserAddress, network_id: NetworkId) -> Self {
        Self {
            address,
            network_id,
        }
    }

    fn hrp(network_id: &NetworkId) -> String {
        if network_id.is_mainnet() {
            ADDRESS_HRP_PREFIX.to_string()
        } else {
            format!("{ADDRESS_HRP_PREFIX}_{}", network_id.as_str().to_lowercase())
        }
    }

    pub fn encode(&self) -> Result<String, AddressError> {
        let hrp = Self::hrp(&self.network_id);
        bech32::encode(&hrp, self.address.as_bytes().to_base32(), Variant::Bech32m).map_err(
            |e| AddressError::Bech32 {
                original_address: self.address.to_hex(),
                message: e.to_string(),
            },
        )
    }

    pub fn decode(encoded: &str, network_id: &NetworkId) -> Result<Self, AddressError> {
        let (hrp, data, variant) = bech32::decode(encoded).map_err(|e| AddressError::Bech32 {
            original_address: encoded.to_string(),
            message: e.to_string(),
        })?;
        if variant != Variant::Bech32m {
            return Err(AddressError::UnsupportedVariant {
                original_address: encoded.to_string(),
            });
        }
        let expected_hrp = Self::hrp(network_id);
        if hrp != expected_hrp {
            return Err(AddressError::NetworkMismatch {
                original_address: encoded.to_string(),
                expected: expected_hrp,
                found: hrp,
            });
        }
        let payload = Vec::<u8>::from_base32(&data).map_err(|e| AddressError::Bech32 {
            original_address: encoded.to_string(),
            message: e.to_string(),
        })?;
        let bytes: [u8; USER_ADDRESS_LEN] =
            payload
                .try_into()
                .map_err(|payload: Vec<u8>| AddressError::InvalidLength {
                    original_address: encoded.to_string(),
                    len: payload.len(),
                })?;
        Ok(Self {
            address: UserAddress(bytes),
            network_id: network_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> UserAddress {
        UserAddress::from_bytes([7; USER_ADDRESS_LEN])
    }

    #[test]
    fn bech32m_encoding_is_network_scoped() {
        let undeployed = NetworkId::from("undeployed");
        let encoded = UnshieldedAddress::new(address(), undeployed.clone())
            .encode()
            .unwrap();
        assert!(encoded.starts_with("mn_addr_undeployed1"));

        let decoded = UnshieldedAddress::decode(&encoded, &undeployed).unwrap();
        assert_eq!(decoded.address, address());

        let err = UnshieldedAddress::decode(&encoded, &NetworkId::from("preview")).unwrap_err();
        assert!(matches!(err, AddressError::NetworkMismatch { .. }));
    }

    #[test]
    fn mainnet_has_bare_prefix() {
        let encoded = UnshieldedAddress::new(address(), NetworkId::from(NetworkId::MAINNET))
            .encode()
            .unwrap();
        assert!(encoded.starts_with("mn_addr1"));
    }

    #[test]
    fn rejects_garbage() {
        let err = UnshieldedAddress::decode("not an address", &NetworkId::from("undeployed"))
            .unwrap_err();
        assert!(matches!(err, AddressError::Bech32 { .. }));
    }

    #[test]
    fn hex_form_requires_32_bytes() {
        assert!("abcd".parse::<UserAddress>().is_err());
        assert!("zz".parse::<UserAddress>().is_err());
        let hex = address().to_hex();
        assert_eq!(hex.parse::<UserAddress>().unwrap(), address());
    }
}
