mod config;
pub mod error;
mod feed;
mod message;
mod retry;

use futures::StreamExt;
use tokio::sync::oneshot;
use tracing::{error, info, instrument, warn};

use std::sync::Arc;

use crate::{history::TransactionHistory, primitives::*, utxo::*, wallet::*};

pub use config::*;
pub use error::SyncError;
pub use feed::*;
pub use message::*;
pub use retry::*;

/// Reconciliation loop of one wallet. The only writer of synced state.
///
/// Streams the feed from the last applied transaction, folds every message
/// into the shared snapshot in arrival order and reconnects with backoff
/// whenever the stream fails or ends.
pub struct WalletSync {
    state: WalletStateRef,
    feed: Arc<dyn TransactionFeed>,
    history: TransactionHistory,
    retry: RetryPolicy,
}

impl WalletSync {
    pub fn new(
        state: WalletStateRef,
        feed: Arc<dyn TransactionFeed>,
        history: TransactionHistory,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            state,
            feed,
            history,
            retry,
        }
    }

    /// Runs until `shutdown` fires or its sender is dropped.
    #[instrument(
        name = "sync.run",
        skip_all,
        fields(address = %self.state.get().address(), error, error.level, error.message)
    )]
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut attempt: u32 = 0;
        loop {
            let outcome = tokio::select! {
                outcome = self.stream_updates(&mut attempt) => outcome,
                _ = &mut shutdown => break,
            };
            self.state
                .replace_with(|wallet| wallet.update_progress(SyncProgressUpdate::disconnected()));

            let delay = self.retry.next_delay(attempt);
            match outcome {
                Ok(()) => warn!(attempt, ?delay, "transaction feed ended, reconnecting"),
                Err(e) => {
                    crate::tracing::insert_error_fields(tracing::Level::ERROR, &e);
                    error!(error = %e, attempt, ?delay, "sync attempt failed, reconnecting");
                }
            }
            attempt = attempt.saturating_add(1);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                _ = &mut shutdown => break,
            }
        }
        self.state
            .replace_with(|wallet| wallet.update_progress(SyncProgressUpdate::disconnected()));
        info!("wallet sync stopped");
    }

    async fn stream_updates(&self, attempt: &mut u32) -> Result<(), SyncError> {
        let wallet = self.state.get();
        let cursor = FeedCursor::after(wallet.progress.applied_id);
        let mut updates = self.feed.subscribe(wallet.address(), cursor).await?;
        while let Some(payload) = updates.next().await {
            self.process(WalletSyncUpdate::decode(payload?)?).await?;
            *attempt = 0;
        }
        Ok(())
    }

    /// Folds one feed message into the wallet. Progress only advances once
    /// the transaction's coins are committed.
    #[instrument(name = "sync.process", skip_all, fields(transaction_id, status), err)]
    pub async fn process(&self, update: WalletSyncUpdate) -> Result<(), SyncError> {
        match update {
            WalletSyncUpdate::Progress {
                highest_transaction_id,
            } => {
                self.state.replace_with(|wallet| {
                    wallet.update_progress(SyncProgressUpdate::connected_at(highest_transaction_id))
                });
            }
            WalletSyncUpdate::Transaction(message) => {
                let update = TransactionUpdate::try_from(&message)?;
                let span = tracing::Span::current();
                span.record("transaction_id", update.transaction_id);
                span.record("status", tracing::field::display(update.status));

                let version = ProtocolVersion::new(message.transaction.protocol_version);
                self.state.update(|wallet| {
                    let next = match update.status {
                        UpdateStatus::Success => wallet.apply_update(&update)?,
                        UpdateStatus::Failure => wallet.apply_failed_update(&update)?,
                    };
                    let next = if version > next.protocol_version {
                        next.with_protocol_version(version)
                    } else {
                        next
                    };
                    Ok::<_, SyncError>(
                        next.update_progress(SyncProgressUpdate::applied(update.transaction_id)),
                    )
                })?;

                if let Err(e) = self.history.create(&message.transaction).await {
                    warn!(
                        error = %e,
                        transaction_id = update.transaction_id,
                        "failed to record transaction history"
                    );
                }
            }
        }
        Ok(())
    }
}
