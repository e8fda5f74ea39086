mod config;
mod state_change;

use chrono::{DateTime, Utc};
use futures::{stream, Stream, StreamExt};
use tokio::{
    sync::{oneshot, watch, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, instrument};
use url::Url;

use std::sync::Arc;

use crate::{
    error::WalletError,
    history::*,
    primitives::*,
    serialization,
    sync::*,
    transacting::*,
    utxo::Utxo,
    wallet::*,
};

pub use config::*;
pub use state_change::*;

/// External collaborators a wallet runs against.
#[derive(Clone)]
pub struct WalletServices {
    pub feed: Arc<dyn TransactionFeed>,
    pub coin_selection: Arc<dyn CoinSelection>,
    pub history_storage: Arc<dyn TransactionHistoryStorage>,
}

struct RunningSync {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct UnshieldedWallet {
    config: WalletConfig,
    indexer_ws_url: Url,
    state: WalletStateRef,
    feed: Arc<dyn TransactionFeed>,
    history: TransactionHistory,
    transacting: Transacting,
    running: Mutex<Option<RunningSync>>,
}

impl UnshieldedWallet {
    pub fn start_with_public_keys(
        config: WalletConfig,
        public_keys: PublicKeys,
        services: WalletServices,
    ) -> Result<Self, WalletError> {
        let wallet = CoreWallet::init(public_keys, config.network_id.clone());
        Self::new(config, wallet, services)
    }

    pub fn restore(
        config: WalletConfig,
        serialized: &str,
        services: WalletServices,
    ) -> Result<Self, WalletError> {
        let wallet = serialization::deserialize(serialized)?;
        if wallet.network_id != config.network_id {
            return Err(WalletError::other_msg(format!(
                "serialized wallet belongs to network {}, expected {}",
                wallet.network_id, config.network_id
            )));
        }
        Self::new(config, wallet, services)
    }

    fn new(
        config: WalletConfig,
        wallet: CoreWallet,
        services: WalletServices,
    ) -> Result<Self, WalletError> {
        let indexer_ws_url = config.indexer_client_connection.ws_url()?;
        Ok(Self {
            config,
            indexer_ws_url,
            state: WalletStateRef::new(wallet),
            feed: services.feed,
            history: TransactionHistory::new(services.history_storage),
            transacting: Transacting::new(services.coin_selection),
            running: Mutex::new(None),
        })
    }

    /// Spawns the reconciliation loop. Does nothing if it is already running.
    #[instrument(name = "wallet.start", skip(self), fields(indexer_ws_url = %self.indexer_ws_url))]
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return;
        }
        let (shutdown, shutdown_rx) = oneshot::channel();
        let sync = WalletSync::new(
            self.state.clone(),
            Arc::clone(&self.feed),
            self.history.clone(),
            RetryPolicy::new(self.config.sync.retry.clone()),
        );
        let handle = tokio::spawn(sync.run(shutdown_rx));
        *running = Some(RunningSync { shutdown, handle });
        info!("wallet sync started");
    }

    /// Cancels the reconciliation loop and waits for it to wind down.
    #[instrument(name = "wallet.stop", skip(self), err)]
    pub async fn stop(&self) -> Result<(), WalletError> {
        let running = self.running.lock().await.take();
        if let Some(RunningSync { shutdown, handle }) = running {
            let _ = shutdown.send(());
            handle.await.map_err(WalletError::other)?;
        }
        Ok(())
    }

    pub fn indexer_ws_url(&self) -> &Url {
        &self.indexer_ws_url
    }

    /// Latest snapshot first, then every published one.
    pub fn state(&self) -> watch::Receiver<Arc<CoreWallet>> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> Arc<CoreWallet> {
        self.state.get()
    }

    pub fn state_changes(&self) -> impl Stream<Item = StateChange> + Send + 'static {
        WatchStream::new(self.state.subscribe())
            .scan(None::<Arc<CoreWallet>>, |previous, current| {
                let changes = StateChange::between(previous.as_deref(), &current);
                *previous = Some(current);
                futures::future::ready(Some(stream::iter(changes)))
            })
            .flatten()
    }

    pub fn balances(&self) -> Balances {
        WalletBalances::new(&self.state.get()).available_balances()
    }

    #[instrument(name = "wallet.balance_transaction", skip_all, err)]
    pub fn balance_transaction(
        &self,
        transaction: &UnprovenTransaction,
    ) -> Result<ProvingRecipe, WalletError> {
        Ok(self
            .state
            .modify(|wallet| self.transacting.balance_transaction(wallet, transaction))?)
    }

    #[instrument(name = "wallet.transfer_transaction", skip_all, err)]
    pub fn transfer_transaction(
        &self,
        outputs: &[TokenTransfer],
        ttl: DateTime<Utc>,
    ) -> Result<ProvingRecipe, WalletError> {
        Ok(self
            .state
            .modify(|wallet| self.transacting.transfer_transaction(wallet, outputs, ttl))?)
    }

    #[instrument(name = "wallet.init_swap", skip_all, err)]
    pub fn init_swap(
        &self,
        desired_inputs: &WantedAmounts,
        desired_outputs: &[TokenTransfer],
        ttl: DateTime<Utc>,
    ) -> Result<ProvingRecipe, WalletError> {
        Ok(self.state.modify(|wallet| {
            self.transacting
                .init_swap(wallet, desired_inputs, desired_outputs, ttl)
        })?)
    }

    pub fn sign_transaction<F, E>(
        &self,
        transaction: &UnprovenTransaction,
        sign: F,
    ) -> Result<UnprovenTransaction, WalletError>
    where
        F: Fn(&[u8]) -> Result<Signature, E>,
        E: std::fmt::Display,
    {
        Ok(Transacting::sign_transaction(transaction, sign)?)
    }

    /// Returns the spent coins of an abandoned transaction to available.
    #[instrument(name = "wallet.revert_transaction", skip_all, err)]
    pub fn revert_transaction(&self, transaction: &UnprovenTransaction) -> Result<(), WalletError> {
        let own_address = *self.state.get().address();
        Ok(self.state.update(|wallet| {
            transaction
                .offer
                .inputs
                .iter()
                .filter(|input| input.owner == own_address)
                .try_fold(wallet.clone(), |wallet, input| {
                    wallet.rollback_utxo(&Utxo::from(input))
                })
        })?)
    }

    pub fn serialize_state(&self) -> Result<String, WalletError> {
        serialization::serialize(&self.state.get())
    }

    /// Resolves once the wallet is connected and trails the feed by at most
    /// `allowed_gap` transactions, `sync.default_allowed_gap` if `None`.
    pub async fn wait_for_synced_state(
        &self,
        allowed_gap: Option<u64>,
    ) -> Result<Arc<CoreWallet>, WalletError> {
        let allowed_gap = allowed_gap.unwrap_or(self.config.sync.default_allowed_gap);
        let mut receiver = self.state.subscribe();
        let synced = receiver
            .wait_for(|wallet| wallet.progress.is_complete_within(allowed_gap))
            .await
            .map_err(WalletError::other)?;
        Ok(Arc::clone(&synced))
    }

    pub fn get_address(&self) -> String {
        self.state.get().public_keys.address.clone()
    }

    pub fn transaction_history(&self) -> &TransactionHistory {
        &self.history
    }
}
