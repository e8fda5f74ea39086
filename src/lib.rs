#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

pub mod app;
pub mod config;
pub mod error;
pub mod history;
pub mod primitives;
pub mod serialization;
pub mod sync;
pub mod tracing;
pub mod transacting;
pub mod utxo;
pub mod wallet;

pub use app::{UnshieldedWallet, WalletConfig, WalletServices};
pub use error::WalletError;
