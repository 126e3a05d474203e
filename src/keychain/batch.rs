// certexport — Export Coordinator
//
// Composes the resolver and the exporter for one batch of required labels.
// The coordinator owns the accumulated identity handles: the resolver hands
// ownership over, the exporter only borrows, and everything is released here
// on success and on every abort path.

use std::path::{Path, PathBuf};

use super::api::KeychainApi;
use super::error::KeychainError;
use super::export::export_identities;
use super::handle::{release_all, Owned};
use super::resolver::find_identity;

/// File name of the exported archive inside the output directory.
pub const IDENTITIES_FILE_NAME: &str = "Identities.p12";

/// Resolve each label to exactly one identity and export them all into
/// `<out_dir>/Identities.p12`. Returns the path of the written archive.
pub fn export_batch(
    api: &dyn KeychainApi,
    labels: &[String],
    out_dir: &Path,
) -> Result<PathBuf, KeychainError> {
    std::fs::create_dir_all(out_dir).map_err(|source| KeychainError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut identities: Vec<Owned<'_>> = Vec::with_capacity(labels.len());
    for label in labels {
        tracing::info!(%label, "resolving identity");
        // On error the guards in `identities` release everything resolved
        // so far.
        identities.push(find_identity(api, label)?);
    }

    let out_path = out_dir.join(IDENTITIES_FILE_NAME);
    let result = export_identities(api, &identities, &out_path);
    release_all(identities);

    result.map(|()| out_path)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
