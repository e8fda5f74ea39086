use tokio::sync::watch;

use std::sync::Arc;

use super::entity::CoreWallet;

/// Single owner of the current wallet snapshot.
///
/// Writers go through [`WalletStateRef::modify`], which computes the next
/// snapshot while holding the cell's write lock and publishes it in one step.
/// Readers only ever see whole snapshots and subscribers are handed the
/// latest one on join.
#[derive(Clone)]
pub struct WalletStateRef {
    sender: Arc<watch::Sender<Arc<CoreWallet>>>,
}

impl WalletStateRef {
    pub fn new(wallet: CoreWallet) -> Self {
        let (sender, _) = watch::channel(Arc::new(wallet));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> Arc<CoreWallet> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CoreWallet>> {
        self.sender.subscribe()
    }

    /// Runs `f` against the current snapshot. `Ok((value, next))` publishes
    /// `next`; `Err` leaves the current snapshot untouched.
    ///
    /// `f` runs while the cell is write locked. It must not call back into
    /// this `WalletStateRef` (`get` or another `modify`) or it
    /// deadlocks.
    pub fn modify<T, E>(
        &self,
        f: impl FnOnce(&CoreWallet) -> Result<(T, CoreWallet), E>,
    ) -> Result<T, E> {
        let mut outcome = None;
        self.sender.send_if_modified(|current| match f(current) {
            Ok((value, next)) => {
                *current = Arc::new(next);
                outcome = Some(Ok(value));
                true
            }
            Err(e) => {
                outcome = Some(Err(e));
                false
            }
        });
        match outcome {
            Some(res) => res,
            None => unreachable!("send_if_modified always runs its closure"),
        }
    }

    pub fn replace_with(&self, f: impl FnOnce(&CoreWallet) -> CoreWallet) {
        self.sender
            .send_modify(|current| *current = Arc::new(f(current)));
    }

    pub fn update<E>(&self, f: impl FnOnce(&CoreWallet) -> Result<CoreWallet, E>) -> Result<(), E> {
        self.modify(|current| f(current).map(|next| ((), next)))
    }
}
