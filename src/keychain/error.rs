// certexport — Keychain error types

use std::path::PathBuf;

use thiserror::Error;

use super::api::{AttrKey, OsStatus, RawHandle, TypeTag};

/// Errors from the query and export engine. Raw status codes are kept
/// alongside the symbolic kind so operators can cross-reference the platform
/// documentation; none of these are retried.
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("no identity found in the keychain with label {label:?} — check that the certificate and its private key are installed")]
    NotFound { label: String },

    #[error("{count} identities in the keychain share the label {label:?} — remove the duplicates (a common cause is one copy in the login keychain and one in the System keychain)")]
    Ambiguous { label: String, count: usize },

    #[error("keychain call {op} failed (OSStatus {code})")]
    Store { op: &'static str, code: OsStatus },

    /// An identity record did not have the shape the store documents.
    /// Not user-actionable; treated the same as a store failure.
    #[error("unexpected identity record schema: {0}")]
    Attribute(#[from] AttrError),

    #[error("nothing to export — the identity list is empty")]
    EmptyExport,

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Typed-attribute-reader faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttrError {
    #[error("attribute '{key}' is missing from the record")]
    Missing { key: AttrKey },

    #[error("attribute '{key}' is not a string (found {found:?})")]
    WrongType { key: AttrKey, found: TypeTag },
}

/// Reported by `KeychainApi::release` when the store does not consider the
/// handle live. Always a programming error on our side; logged by the guard
/// layer and never propagated.
#[derive(Debug, Error)]
#[error("released a handle the store does not consider live ({handle:#x})")]
pub struct ReleaseError {
    pub handle: RawHandle,
}
