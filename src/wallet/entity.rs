use crate::{primitives::*, utxo::*};

use super::{keys::PublicKeys, progress::*};

/// Immutable snapshot of one wallet. Mutators return a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreWallet {
    pub state: UtxoStore,
    pub public_keys: PublicKeys,
    pub protocol_version: ProtocolVersion,
    pub progress: SyncProgress,
    pub network_id: NetworkId,
}

impl CoreWallet {
    pub fn init(public_keys: PublicKeys, network_id: NetworkId) -> Self {
        Self {
            state: UtxoStore::empty(),
            public_keys,
            protocol_version: ProtocolVersion::MIN_SUPPORTED,
            progress: SyncProgress::default(),
            network_id,
        }
    }

    pub fn restore(
        state: UtxoStore,
        public_keys: PublicKeys,
        progress: SyncProgress,
        protocol_version: ProtocolVersion,
        network_id: NetworkId,
    ) -> Self {
        Self {
            state,
            public_keys,
            protocol_version,
            progress,
            network_id,
        }
    }

    pub fn address(&self) -> &UserAddress {
        &self.public_keys.address_hex
    }

    pub fn apply_update(&self, update: &TransactionUpdate) -> Result<Self, UtxoError> {
        Ok(self.with_state(self.state.apply_update(update)?))
    }

    pub fn apply_failed_update(&self, update: &TransactionUpdate) -> Result<Self, UtxoError> {
        Ok(self.with_state(self.state.apply_failed_update(update)?))
    }

    pub fn spend<'a>(
        &self,
        utxos: impl IntoIterator<Item = &'a Utxo>,
    ) -> Result<(Vec<UtxoWithMeta>, Self), UtxoError> {
        let (spent, state) = self.state.spend_many(utxos)?;
        Ok((spent, self.with_state(state)))
    }

    pub fn rollback_utxo(&self, utxo: &Utxo) -> Result<Self, UtxoError> {
        Ok(self.with_state(self.state.rollback_spend(utxo)?))
    }

    pub fn update_progress(&self, update: SyncProgressUpdate) -> Self {
        Self {
            progress: self.progress.update(update),
            ..self.clone()
        }
    }

    pub fn with_protocol_version(&self, protocol_version: ProtocolVersion) -> Self {
        Self {
            protocol_version,
            ..self.clone()
        }
    }

    fn with_state(&self, state: UtxoStore) -> Self {
        Self {
            state,
            public_keys: self.public_keys.clone(),
            protocol_version: self.protocol_version,
            progress: self.progress,
            network_id: self.network_id.clone(),
        }
    }
}
