// certexport — Keychain Module
//
// The credential-store query and export engine. Resolves identity labels to
// store handles, manages the store's manual reference-counted lifetimes, and
// drives the signed PKCS#12 export. The platform store is reached through the
// `KeychainApi` trait so the engine can run against the Security framework in
// production and against a release-counting fake in tests.

mod api;
mod attrs;
mod batch;
mod error;
mod export;
mod handle;
mod resolver;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(test)]
pub(crate) mod memory;

pub use api::{AttrKey, ExportFormat, ExportParams, KeychainApi, OsStatus, RawHandle, TypeTag};
pub use batch::{export_batch, IDENTITIES_FILE_NAME};
pub use error::{AttrError, KeychainError, ReleaseError};
pub use export::export_identities;
pub use handle::{release_all, Borrowed, Owned};
pub use resolver::{find_identity, list_identity_labels};

#[cfg(target_os = "macos")]
pub use macos::SecurityFrameworkKeychain;
