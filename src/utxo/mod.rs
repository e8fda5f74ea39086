mod entity;
pub mod error;
mod store;

pub use entity::*;
pub use error::UtxoError;
pub use store::*;
