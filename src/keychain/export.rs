// certexport — Archive Exporter
//
// Drives the store's signed-export primitive over a list of owned identity
// handles and writes the resulting PKCS#12 archive to disk. The exporter
// only borrows the identities — the caller keeps the release obligation —
// but owns the returned data buffer for exactly as long as it takes to copy
// the bytes out.

use std::path::Path;

use super::api::{ExportParams, KeychainApi, RawHandle};
use super::error::KeychainError;
use super::handle::Owned;

/// Export `handles` as PEM-armored PKCS#12 (empty passphrase) to `path`.
///
/// The write is not atomic: a failed export leaves no file, but a write that
/// fails mid-stream may leave a partial one. Callers that need atomicity
/// should write to a temporary path and rename.
pub fn export_identities(
    api: &dyn KeychainApi,
    handles: &[Owned<'_>],
    path: &Path,
) -> Result<(), KeychainError> {
    // The store's array-construction primitive cannot represent zero
    // elements meaningfully for this use.
    if handles.is_empty() {
        return Err(KeychainError::EmptyExport);
    }

    tracing::info!(
        identities = handles.len(),
        path = %path.display(),
        "exporting identities with empty passphrase"
    );

    let raws: Vec<RawHandle> = handles.iter().map(Owned::raw).collect();
    let data = match api.export_pkcs12(&raws, &ExportParams::pkcs12()) {
        Ok(raw) => Owned::from_copy(api, raw),
        // No data handle is produced on failure, so there is nothing to
        // release here.
        Err(code) => {
            return Err(KeychainError::Store {
                op: "SecItemExport",
                code,
            })
        }
    };

    let bytes = api.data_bytes(data.raw());
    drop(data);
    tracing::debug!(bytes = bytes.len(), "export buffer copied");

    std::fs::write(path, &bytes).map_err(|source| KeychainError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
