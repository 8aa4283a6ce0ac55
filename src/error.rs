//! Error taxonomy shared by the store, the remote client and the controllers.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeskError {
    #[error("a service must be selected")]
    MissingService,

    #[error("a file named \"{name}\" already exists for service \"{service}\"")]
    DuplicateFile { name: String, service: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("AI credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("AI credential is required to rewrite")]
    MissingCredential,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("config: {0}")]
    Config(String),
}

impl DeskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeskError::Timeout(_))
    }
}

pub type DeskResult<T> = std::result::Result<T, DeskError>;
