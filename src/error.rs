// certexport — Top-level error types
//
// Aggregates errors from the keychain module into a single error enum for
// the application boundary.

use thiserror::Error;

/// Top-level error type for all certexport operations.
#[derive(Debug, Error)]
pub enum CertexportError {
    #[error("Keychain error: {0}")]
    Keychain(#[from] crate::keychain::KeychainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CertexportError>;
