mod balance;
mod entity;
pub mod error;
mod keys;
mod progress;
mod state_ref;

pub use balance::*;
pub use entity::*;
pub use error::SigningError;
pub use keys::*;
pub use progress::*;
pub use state_ref::*;
