use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    primitives::NetworkId,
    sync::{SyncConfig, SyncError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_network_id")]
    pub network_id: NetworkId,
    #[serde(default)]
    pub indexer_client_connection: IndexerClientConnection,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
            indexer_client_connection: IndexerClientConnection::default(),
            sync: SyncConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerClientConnection {
    #[serde(default = "default_indexer_http_url")]
    pub indexer_http_url: String,
    #[serde(default)]
    pub indexer_ws_url: Option<String>,
}

impl Default for IndexerClientConnection {
    fn default() -> Self {
        Self {
            indexer_http_url: default_indexer_http_url(),
            indexer_ws_url: None,
        }
    }
}

impl IndexerClientConnection {
    /// Subscription endpoint. Derived from the HTTP url unless set explicitly.
    pub fn ws_url(&self) -> Result<Url, SyncError> {
        if let Some(ws_url) = &self.indexer_ws_url {
            let url = parse(ws_url)?;
            return match url.scheme() {
                "ws" | "wss" => Ok(url),
                scheme => Err(SyncError::InvalidIndexerUrl(format!(
                    "unsupported scheme '{scheme}' in {ws_url}"
                ))),
            };
        }

        let mut url = parse(&self.indexer_http_url)?;
        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            scheme => {
                return Err(SyncError::InvalidIndexerUrl(format!(
                    "unsupported scheme '{scheme}' in {}",
                    self.indexer_http_url
                )))
            }
        };
        url.set_scheme(scheme).map_err(|_| {
            SyncError::InvalidIndexerUrl(format!(
                "could not derive websocket url from {}",
                self.indexer_http_url
            ))
        })?;
        let path = format!("{}/ws", url.path().trim_end_matches('/'));
        url.set_path(&path);
        Ok(url)
    }
}

fn parse(raw: &str) -> Result<Url, SyncError> {
    Url::parse(raw).map_err(|e| SyncError::InvalidIndexerUrl(format!("{raw}: {e}")))
}

fn default_network_id() -> NetworkId {
    NetworkId::from("undeployed")
}

fn default_indexer_http_url() -> String {
    "http://localhost:8088/api/v3/graphql".to_string()
}
