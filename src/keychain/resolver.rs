// certexport — Identity Resolver
//
// Resolves a human-readable identity label to exactly one owned store
// handle. The query asks for every identity with attributes and reference,
// then filters by exact label equality. The scan never stops at the first
// match: a label shared by more than one identity (typically one copy in the
// login keychain and one in the System keychain) is a configuration error
// the user must resolve, never a record we silently pick.

use super::api::{AttrKey, KeychainApi};
use super::attrs;
use super::error::KeychainError;
use super::handle::{Borrowed, Owned};

/// Find the single identity whose label equals `label`, retained for the
/// caller. Every handle acquired on the way is released before an error
/// returns; iteration order over the result set carries no meaning.
pub fn find_identity<'k>(
    api: &'k dyn KeychainApi,
    label: &str,
) -> Result<Owned<'k>, KeychainError> {
    let results = query_identities(api)?;
    let count = api.array_len(results.raw());
    tracing::debug!(count, "identity query returned");

    let mut matches: Vec<Owned<'k>> = Vec::new();
    for index in 0..count {
        let record = Borrowed::new(api.array_get(results.raw(), index));

        // A record we cannot read the label of means the store schema is not
        // what the platform documents; abort the whole resolution. The
        // guards drop any matches retained so far.
        let record_label = attrs::read_string(api, record, AttrKey::Label)?;
        if record_label != label {
            continue;
        }
        tracing::debug!(index, %record_label, "label matched");

        let reference = attrs::read_ref(api, record, AttrKey::Reference)?;
        matches.push(Owned::retained(api, reference));
    }

    if matches.len() > 1 {
        let count = matches.len();
        drop(matches);
        return Err(KeychainError::Ambiguous {
            label: label.to_string(),
            count,
        });
    }

    matches.pop().ok_or_else(|| KeychainError::NotFound {
        label: label.to_string(),
    })
}

/// Every readable identity label currently in the store. Records whose label
/// cannot be read are skipped — listing is a diagnostic aid, not resolution.
pub fn list_identity_labels(api: &dyn KeychainApi) -> Result<Vec<String>, KeychainError> {
    let results = query_identities(api)?;
    let count = api.array_len(results.raw());

    let mut labels = Vec::with_capacity(count);
    for index in 0..count {
        let record = Borrowed::new(api.array_get(results.raw(), index));
        match attrs::read_string(api, record, AttrKey::Label) {
            Ok(label) => labels.push(label),
            Err(err) => tracing::debug!(index, %err, "skipping unreadable identity record"),
        }
    }

    Ok(labels)
}

/// Run the store-wide identity query, wrapping the result array in a guard.
fn query_identities(api: &dyn KeychainApi) -> Result<Owned<'_>, KeychainError> {
    match api.copy_identities() {
        Ok(raw) => Ok(Owned::from_copy(api, raw)),
        Err(code) => Err(KeychainError::Store {
            op: "SecItemCopyMatching",
            code,
        }),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
