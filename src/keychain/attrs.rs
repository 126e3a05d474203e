// certexport — Typed Attribute Reader
//
// Identity records come back from the store as untyped key→value containers.
// This layer turns the raw accessors into typed reads: existence is checked
// before the value is touched, and the dynamic type tag is verified before
// any conversion, so a schema surprise is a reported error instead of a
// crash or a silent empty string.

use super::api::{AttrKey, KeychainApi, TypeTag};
use super::error::AttrError;
use super::handle::Borrowed;

/// Read the value for `key` as a borrowed handle. Absence — including a
/// present-but-null value — is `Missing`, never a null handle.
pub(crate) fn read_ref<'a>(
    api: &dyn KeychainApi,
    record: Borrowed<'a>,
    key: AttrKey,
) -> Result<Borrowed<'a>, AttrError> {
    match api.dict_get(record.raw(), key) {
        Some(raw) => Ok(Borrowed::new(raw)),
        None => Err(AttrError::Missing { key }),
    }
}

/// Read the value for `key` as a native string. The dynamic type must be a
/// text string; the bytes are copied out because the store-owned buffer is
/// only borrowed for the duration of the call. A null backing buffer (which
/// the store produces for some empty-string builds) maps to `Missing`, the
/// same as a true absence.
pub(crate) fn read_string(
    api: &dyn KeychainApi,
    record: Borrowed<'_>,
    key: AttrKey,
) -> Result<String, AttrError> {
    let value = read_ref(api, record, key)?;

    let found = api.type_of(value.raw());
    if found != TypeTag::String {
        return Err(AttrError::WrongType { key, found });
    }

    api.copy_string(value.raw())
        .ok_or(AttrError::Missing { key })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
