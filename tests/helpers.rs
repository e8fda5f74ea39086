#![allow(dead_code)]

use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::{json, Value};

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use unshielded_wallet::{
    app::*,
    history::*,
    primitives::*,
    sync::*,
    transacting::*,
    utxo::*,
    wallet::*,
};

pub const NETWORK: &str = "undeployed";

pub fn network() -> NetworkId {
    NetworkId::from(NETWORK)
}

pub struct TestKeystore {
    seed: u8,
}

impl TestKeystore {
    pub fn new(seed: u8) -> Self {
        Self { seed }
    }
}

impl UnshieldedKeystore for TestKeystore {
    fn public_key(&self) -> PublicKey {
        PublicKey::from(hex::encode([self.seed; 33]))
    }

    fn address(&self) -> UserAddress {
        UserAddress::from_bytes([self.seed; 32])
    }

    fn sign_data(&self, data: &[u8]) -> Result<Signature, SigningError> {
        Ok(Signature::from(format!(
            "{:02x}:{}",
            self.seed,
            hex::encode(&data[..data.len().min(16)])
        )))
    }
}

pub fn public_keys(seed: u8) -> PublicKeys {
    PublicKeys::from_keystore(&TestKeystore::new(seed), &network()).expect("valid keys")
}

pub fn address_of(seed: u8) -> String {
    public_keys(seed).address
}

pub struct LargestFirst;

impl CoinSelection for LargestFirst {
    fn select(
        &self,
        available: &[UtxoWithMeta],
        wanted: &WantedAmounts,
    ) -> Result<Vec<UtxoWithMeta>, InsufficientCoins> {
        let mut chosen = Vec::new();
        for (token_type, amount) in wanted {
            let mut candidates: Vec<_> = available
                .iter()
                .filter(|coin| &coin.utxo.token_type == token_type)
                .collect();
            candidates.sort_by(|a, b| b.utxo.value.cmp(&a.utxo.value));
            let mut covered = TokenAmount::ZERO;
            for coin in candidates {
                if covered >= *amount {
                    break;
                }
                covered += coin.utxo.value;
                chosen.push(coin.clone());
            }
            if covered < *amount {
                return Err(InsufficientCoins {
                    token_type: token_type.clone(),
                    amount: *amount,
                });
            }
        }
        Ok(chosen)
    }
}

pub fn coin(hash: &str, index: u32, token: &str, value: u64, owner_seed: u8) -> UtxoWithMeta {
    UtxoWithMeta::new(
        Utxo::builder()
            .value(value)
            .owner(UserAddress::from_bytes([owner_seed; 32]))
            .token_type(token)
            .intent_hash(hash)
            .output_index(index)
            .build()
            .expect("valid utxo"),
        UtxoMeta {
            ctime: chrono::DateTime::from_timestamp(1_700_000_000 + i64::from(index), 0),
            registered_for_dust_generation: false,
        },
    )
}

pub fn wallet_with_coins(seed: u8, coins: Vec<UtxoWithMeta>) -> CoreWallet {
    CoreWallet::restore(
        UtxoStore::restore(coins, Vec::new()),
        public_keys(seed),
        SyncProgress::default(),
        ProtocolVersion::MIN_SUPPORTED,
        network(),
    )
}

fn utxo_json(coin: &UtxoWithMeta) -> Value {
    json!({
        "value": coin.utxo.value.to_string(),
        "owner": coin.utxo.owner.to_hex(),
        "tokenType": coin.utxo.token_type.as_str(),
        "intentHash": coin.utxo.intent_hash.as_str(),
        "outputIndex": coin.utxo.output_index,
        "ctime": coin.meta.ctime.map(|t| t.timestamp()),
        "registeredForDustGeneration": coin.meta.registered_for_dust_generation,
    })
}

pub fn progress_message(highest_transaction_id: u64) -> Value {
    json!({
        "type": "UnshieldedTransactionsProgress",
        "highestTransactionId": highest_transaction_id,
    })
}

pub fn transaction_message(
    id: u64,
    hash: &str,
    status: &str,
    created: &[UtxoWithMeta],
    spent: &[UtxoWithMeta],
) -> Value {
    json!({
        "type": "UnshieldedTransaction",
        "transaction": {
            "id": id,
            "hash": hash,
            "type": "RegularTransaction",
            "protocolVersion": 1,
            "identifiers": [format!("{hash}-identifier")],
            "block": { "timestamp": 1_700_000_000_000i64 + id as i64 },
            "fees": { "paidFees": "1", "estimatedFees": "2" },
            "transactionResult": {
                "status": status,
                "segments": [{ "id": 0, "success": status != "FAILURE" }],
            },
        },
        "createdUtxos": created.iter().map(utxo_json).collect::<Vec<_>>(),
        "spentUtxos": spent.iter().map(utxo_json).collect::<Vec<_>>(),
    })
}

#[derive(Clone)]
pub enum FeedItem {
    Payload(Value),
    Fail(&'static str),
}

/// Feed replaying one scripted session per subscription. Once the scripts run
/// out a subscription stays open without delivering anything.
#[derive(Clone, Default)]
pub struct ScriptedFeed {
    sessions: Arc<Mutex<VecDeque<Vec<FeedItem>>>>,
    subscriptions: Arc<Mutex<Vec<(tokio::time::Instant, FeedCursor)>>>,
}

impl ScriptedFeed {
    pub fn new(sessions: Vec<Vec<FeedItem>>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(sessions.into())),
            subscriptions: Arc::default(),
        }
    }

    pub fn push_session(&self, session: Vec<FeedItem>) {
        self.sessions.lock().unwrap().push_back(session);
    }

    pub fn subscriptions(&self) -> Vec<(tokio::time::Instant, FeedCursor)> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionFeed for ScriptedFeed {
    async fn subscribe(
        &self,
        _address: &UserAddress,
        cursor: FeedCursor,
    ) -> Result<FeedStream, SyncError> {
        self.subscriptions
            .lock()
            .unwrap()
            .push((tokio::time::Instant::now(), cursor));
        let session = self.sessions.lock().unwrap().pop_front();
        Ok(match session {
            Some(items) => stream::iter(items.into_iter().map(|item| match item {
                FeedItem::Payload(payload) => Ok(payload),
                FeedItem::Fail(reason) => Err(SyncError::Connection(reason.to_string())),
            }))
            .chain(stream::pending())
            .boxed(),
            None => stream::pending().boxed(),
        })
    }
}

/// Storage whose writes always fail.
pub struct BrokenHistoryStorage;

#[async_trait]
impl TransactionHistoryStorage for BrokenHistoryStorage {
    async fn create(&self, _entry: TransactionHistoryEntry) -> Result<(), HistoryError> {
        Err(HistoryError::Storage("disk full".to_string()))
    }

    async fn get(
        &self,
        _hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        Ok(None)
    }

    fn get_all(&self) -> futures::stream::BoxStream<'_, TransactionHistoryEntry> {
        stream::empty().boxed()
    }

    async fn delete(
        &self,
        _hash: &TransactionHash,
    ) -> Result<Option<TransactionHistoryEntry>, HistoryError> {
        Ok(None)
    }
}

pub fn services(
    feed: ScriptedFeed,
    history_storage: Arc<dyn TransactionHistoryStorage>,
) -> WalletServices {
    WalletServices {
        feed: Arc::new(feed),
        coin_selection: Arc::new(LargestFirst),
        history_storage,
    }
}

pub fn wallet_config() -> WalletConfig {
    WalletConfig {
        network_id: network(),
        ..WalletConfig::default()
    }
}
