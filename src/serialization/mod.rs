//! Snapshot encoding of a [`CoreWallet`].
//!
//! Only `appliedId` of the sync progress is persisted. A restored wallet is
//! disconnected and resumes the feed right after the last applied
//! transaction.

use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

use crate::{error::WalletError, primitives::*, utxo::*, wallet::*};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SnapshotState {
    available_utxos: Vec<UtxoWithMeta>,
    pending_utxos: Vec<UtxoWithMeta>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Snapshot {
    public_keys: PublicKeys,
    state: SnapshotState,
    protocol_version: ProtocolVersion,
    applied_id: TransactionId,
    network_id: NetworkId,
}

pub fn serialize(wallet: &CoreWallet) -> Result<String, WalletError> {
    let snapshot = Snapshot {
        public_keys: wallet.public_keys.clone(),
        state: SnapshotState {
            available_utxos: wallet.state.available_utxos().cloned().collect(),
            pending_utxos: wallet.state.pending_utxos().cloned().collect(),
        },
        protocol_version: wallet.protocol_version,
        applied_id: wallet.progress.applied_id,
        network_id: wallet.network_id.clone(),
    };
    Ok(serde_json::to_string(&snapshot)?)
}

pub fn deserialize(serialized: &str) -> Result<CoreWallet, WalletError> {
    let snapshot: Snapshot = serde_json::from_str(serialized)?;

    let decoded = UnshieldedAddress::decode(&snapshot.public_keys.address, &snapshot.network_id)
        .map_err(WalletError::other)?;
    if decoded.address != snapshot.public_keys.address_hex {
        return Err(WalletError::other_msg(format!(
            "address {} does not encode {}",
            snapshot.public_keys.address, snapshot.public_keys.address_hex
        )));
    }

    let pending: BTreeSet<UtxoKey> = snapshot
        .state
        .pending_utxos
        .iter()
        .map(UtxoWithMeta::key)
        .collect();
    if let Some(both) = snapshot
        .state
        .available_utxos
        .iter()
        .find(|coin| pending.contains(&coin.key()))
    {
        return Err(WalletError::other_msg(format!(
            "coin {} is listed as both available and pending",
            both.key()
        )));
    }

    Ok(CoreWallet::restore(
        UtxoStore::restore(
            snapshot.state.available_utxos,
            snapshot.state.pending_utxos,
        ),
        snapshot.public_keys,
        SyncProgress::new(snapshot.applied_id, snapshot.applied_id, false),
        snapshot.protocol_version,
        snapshot.network_id,
    ))
}
