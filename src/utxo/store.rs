use tracing::instrument;

use std::collections::BTreeMap;

use super::{entity::*, error::UtxoError};

/// Available and pending coins of one wallet.
///
/// Every operation returns a new store and leaves `self` untouched. A key is
/// held by at most one of the two collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoStore {
    available: BTreeMap<UtxoKey, UtxoWithMeta>,
    pending: BTreeMap<UtxoKey, UtxoWithMeta>,
}

impl UtxoStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuilds a store from trusted contents. A key listed as both
    /// available and pending is kept as pending.
    pub fn restore(
        available: impl IntoIterator<Item = UtxoWithMeta>,
        pending: impl IntoIterator<Item = UtxoWithMeta>,
    ) -> Self {
        let pending: BTreeMap<_, _> = pending.into_iter().map(|u| (u.key(), u)).collect();
        let available = available
            .into_iter()
            .map(|u| (u.key(), u))
            .filter(|(key, _)| !pending.contains_key(key))
            .collect();
        Self { available, pending }
    }

    pub fn available_utxos(&self) -> impl Iterator<Item = &UtxoWithMeta> {
        self.available.values()
    }

    pub fn pending_utxos(&self) -> impl Iterator<Item = &UtxoWithMeta> {
        self.pending.values()
    }

    pub fn get_available(&self, key: &UtxoKey) -> Option<&UtxoWithMeta> {
        self.available.get(key)
    }

    pub fn get_pending(&self, key: &UtxoKey) -> Option<&UtxoWithMeta> {
        self.pending.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.pending.is_empty()
    }

    /// Moves a coin from available to pending.
    pub fn spend(&self, utxo: &Utxo) -> Result<Self, UtxoError> {
        let mut next = self.clone();
        next.spend_in_place(&utxo.key())?;
        Ok(next)
    }

    /// Moves a coin from pending back to available.
    pub fn rollback_spend(&self, utxo: &Utxo) -> Result<Self, UtxoError> {
        let key = utxo.key();
        let mut next = self.clone();
        let stored = next
            .pending
            .remove(&key)
            .ok_or_else(|| UtxoError::UtxoNotFound(key.clone()))?;
        next.available.insert(key, stored);
        Ok(next)
    }

    /// Spends every coin or none of them. Returns the stored records that
    /// were moved to pending.
    pub fn spend_many<'a>(
        &self,
        utxos: impl IntoIterator<Item = &'a Utxo>,
    ) -> Result<(Vec<UtxoWithMeta>, Self), UtxoError> {
        let mut next = self.clone();
        let mut spent = Vec::new();
        for utxo in utxos {
            spent.push(next.spend_in_place(&utxo.key())?);
        }
        Ok((spent, next))
    }

    #[instrument(
        name = "utxo_store.apply_update",
        skip_all,
        fields(transaction_id = update.transaction_id, n_created, n_spent),
        err
    )]
    pub fn apply_update(&self, update: &TransactionUpdate) -> Result<Self, UtxoError> {
        if update.status != UpdateStatus::Success {
            return Err(UtxoError::InvalidUpdateStatus {
                expected: UpdateStatus::Success,
                actual: update.status,
            });
        }
        let mut next = self.clone();
        for created in update.created_utxos.iter() {
            let key = created.key();
            // Redelivery of a creation we already spent locally keeps it pending
            if let Some(pending) = next.pending.get_mut(&key) {
                *pending = created.clone();
            } else {
                next.available.insert(key, created.clone());
            }
        }
        for spent in update.spent_utxos.iter() {
            let key = spent.key();
            next.pending.remove(&key);
            next.available.remove(&key);
        }

        let span = tracing::Span::current();
        span.record("n_created", update.created_utxos.len());
        span.record("n_spent", update.spent_utxos.len());
        Ok(next)
    }

    #[instrument(
        name = "utxo_store.apply_failed_update",
        skip_all,
        fields(transaction_id = update.transaction_id, n_spent = update.spent_utxos.len()),
        err
    )]
    pub fn apply_failed_update(&self, update: &TransactionUpdate) -> Result<Self, UtxoError> {
        if update.status != UpdateStatus::Failure {
            return Err(UtxoError::InvalidUpdateStatus {
                expected: UpdateStatus::Failure,
                actual: update.status,
            });
        }
        let mut next = self.clone();
        for spent in update.spent_utxos.iter() {
            let key = spent.key();
            let restored = next.pending.remove(&key).unwrap_or_else(|| spent.clone());
            next.available.entry(key).or_insert(restored);
        }
        Ok(next)
    }

    fn spend_in_place(&mut self, key: &UtxoKey) -> Result<UtxoWithMeta, UtxoError> {
        let stored = self
            .available
            .remove(key)
            .ok_or_else(|| UtxoError::UtxoNotFound(key.clone()))?;
        self.pending.insert(key.clone(), stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::primitives::*;

    fn coin(hash: &str, index: u32, value: u64) -> UtxoWithMeta {
        UtxoWithMeta::new(
            Utxo::builder()
                .value(value)
                .owner(UserAddress::from_bytes([1; 32]))
                .token_type("T")
                .intent_hash(hash)
                .output_index(index)
                .build()
                .unwrap(),
            UtxoMeta {
                ctime: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
                registered_for_dust_generation: false,
            },
        )
    }

    fn update(
        status: UpdateStatus,
        created: Vec<UtxoWithMeta>,
        spent: Vec<UtxoWithMeta>,
    ) -> TransactionUpdate {
        TransactionUpdate::builder()
            .status(status)
            .created_utxos(created)
            .spent_utxos(spent)
            .transaction_id(1)
            .transaction_hash("tx")
            .build()
            .unwrap()
    }

    fn assert_disjoint(store: &UtxoStore) {
        for utxo in store.available_utxos() {
            assert!(store.get_pending(&utxo.key()).is_none());
        }
    }

    #[test]
    fn spend_and_rollback_are_inverse() {
        let a = coin("a", 0, 100);
        let store = UtxoStore::restore(vec![a.clone(), coin("b", 1, 5)], vec![]);

        let spent = store.spend(&a.utxo).unwrap();
        assert!(spent.get_available(&a.key()).is_none());
        assert_eq!(spent.get_pending(&a.key()), Some(&a));
        assert_disjoint(&spent);

        let rolled_back = spent.rollback_spend(&a.utxo).unwrap();
        assert_eq!(rolled_back, store);
    }

    #[test]
    fn spend_requires_available_coin() {
        let a = coin("a", 0, 100);
        let store = UtxoStore::empty();
        assert_eq!(
            store.spend(&a.utxo).unwrap_err(),
            UtxoError::UtxoNotFound(a.key())
        );
        let spent = UtxoStore::restore(vec![a.clone()], vec![])
            .spend(&a.utxo)
            .unwrap();
        assert!(spent.spend(&a.utxo).is_err());
        assert!(store.rollback_spend(&a.utxo).is_err());
    }

    #[test]
    fn spend_many_is_all_or_nothing() {
        let a = coin("a", 0, 100);
        let b = coin("b", 0, 100);
        let store = UtxoStore::restore(vec![a.clone()], vec![]);

        assert!(store.spend_many([&a.utxo, &b.utxo]).is_err());
        assert_eq!(store.get_available(&a.key()), Some(&a));

        let store = UtxoStore::restore(vec![a.clone(), b.clone()], vec![]);
        let (spent, next) = store.spend_many([&a.utxo, &b.utxo]).unwrap();
        assert_eq!(spent, vec![a, b]);
        assert_eq!(next.available_utxos().count(), 0);
        assert_eq!(next.pending_utxos().count(), 2);
    }

    #[test]
    fn apply_update_is_idempotent() {
        let a = coin("a", 0, 100);
        let b = coin("b", 0, 7);
        let store = UtxoStore::restore(vec![b.clone()], vec![]).spend(&b.utxo).unwrap();
        let update = update(UpdateStatus::Success, vec![a.clone()], vec![b.clone()]);

        let once = store.apply_update(&update).unwrap();
        let twice = once.apply_update(&update).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.available_utxos().collect::<Vec<_>>(), vec![&a]);
        assert_eq!(once.pending_utxos().count(), 0);
    }

    #[test]
    fn created_coin_overwrites_metadata_by_key() {
        let a = coin("a", 0, 100);
        let mut renewed = a.clone();
        renewed.meta.registered_for_dust_generation = true;
        let store = UtxoStore::restore(vec![a], vec![]);

        let next = store
            .apply_update(&update(UpdateStatus::Success, vec![renewed.clone()], vec![]))
            .unwrap();
        assert_eq!(next.get_available(&renewed.key()), Some(&renewed));
        assert_eq!(next.available_utxos().count(), 1);
    }

    #[test]
    fn redelivered_creation_of_pending_coin_stays_pending() {
        let a = coin("a", 0, 100);
        let store = UtxoStore::restore(vec![a.clone()], vec![]).spend(&a.utxo).unwrap();
        let next = store
            .apply_update(&update(UpdateStatus::Success, vec![a.clone()], vec![]))
            .unwrap();
        assert!(next.get_available(&a.key()).is_none());
        assert!(next.get_pending(&a.key()).is_some());
    }

    #[test]
    fn apply_update_rejects_failure_status() {
        let err = UtxoStore::empty()
            .apply_update(&update(UpdateStatus::Failure, vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, UtxoError::InvalidUpdateStatus { .. }));
        let err = UtxoStore::empty()
            .apply_failed_update(&update(UpdateStatus::Success, vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, UtxoError::InvalidUpdateStatus { .. }));
    }

    #[test]
    fn failed_update_restores_pre_spend_metadata() {
        let a = coin("a", 0, 100);
        let store = UtxoStore::restore(vec![a.clone()], vec![]).spend(&a.utxo).unwrap();

        let mut reported = a.clone();
        reported.meta.ctime = None;
        let next = store
            .apply_failed_update(&update(UpdateStatus::Failure, vec![], vec![reported]))
            .unwrap();
        assert_eq!(next.get_available(&a.key()), Some(&a));
        assert!(next.get_pending(&a.key()).is_none());
        assert_disjoint(&next);
    }

    #[test]
    fn restore_prefers_pending() {
        let a = coin("a", 0, 100);
        let store = UtxoStore::restore(vec![a.clone()], vec![a.clone()]);
        assert!(store.get_available(&a.key()).is_none());
        assert!(store.get_pending(&a.key()).is_some());
    }
}
