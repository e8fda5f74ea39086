use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::wallet::DEFAULT_ALLOWED_GAP;

#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    #[serde(default = "default_base_delay")]
    pub base_delay: Duration,
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    #[serde(default = "default_max_delay")]
    pub max_delay: Duration,
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    #[serde(default = "default_max_jitter")]
    pub max_jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
            max_jitter: default_max_jitter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_allowed_gap")]
    pub default_allowed_gap: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            default_allowed_gap: default_allowed_gap(),
        }
    }
}

fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(120)
}

fn default_max_jitter() -> Duration {
    Duration::from_secs(1)
}

fn default_allowed_gap() -> u64 {
    DEFAULT_ALLOWED_GAP
}
