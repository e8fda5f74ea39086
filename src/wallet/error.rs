use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("SigningError - KeystoreLocked")]
    KeystoreLocked,
    #[error("SigningError - RemoteCallFailure: {0}")]
    RemoteCallFailure(String),
}
