use serde::{Deserialize, Serialize};

use super::error::SigningError;
use crate::primitives::*;

/// Key/identity provider. Signs on behalf of the wallet without ever handing
/// out the secret key.
pub trait UnshieldedKeystore: Send + Sync {
    fn public_key(&self) -> PublicKey;
    fn address(&self) -> UserAddress;
    fn sign_data(&self, data: &[u8]) -> Result<Signature, SigningError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeys {
    pub public_key: PublicKey,
    pub address_hex: UserAddress,
    /// bech32m encoding of `address_hex` for the wallet's network
    pub address: String,
}

impl PublicKeys {
    pub fn new(
        public_key: PublicKey,
        address_hex: UserAddress,
        network_id: &NetworkId,
    ) -> Result<Self, AddressError> {
        let address = UnshieldedAddress::new(address_hex, network_id.clone()).encode()?;
        Ok(Self {
            public_key,
            address_hex,
            address,
        })
    }

    pub fn from_keystore(
        keystore: &dyn UnshieldedKeystore,
        network_id: &NetworkId,
    ) -> Result<Self, AddressError> {
        Self::new(keystore.public_key(), keystore.address(), network_id)
    }
}
