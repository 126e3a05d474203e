// certexport — In-Memory Fake Store
//
// A release-counting stand-in for the Security framework, used by the unit
// tests. It models the store as a reference-counted object graph and keeps a
// per-handle ledger of caller obligations, so tests can assert that every
// code path ends with zero outstanding acquisitions. Failure injection
// covers the query status, the export status, and identity records with
// missing, wrongly-typed, or null-backed labels.

use std::cell::RefCell;
use std::collections::HashMap;

use super::api::{AttrKey, ExportFormat, ExportParams, KeychainApi, OsStatus, RawHandle, TypeTag};
use super::error::ReleaseError;

/// Shape of one synthetic identity record.
enum IdentitySpec {
    Labeled(String),
    /// Record without a label key.
    MissingLabel,
    /// Label key present but pointing at a data object.
    NonStringLabel,
    /// Label key present, string object with a null backing buffer.
    NullLabel,
}

enum Obj {
    Array(Vec<RawHandle>),
    Dict(HashMap<AttrKey, RawHandle>),
    /// `None` models a string whose backing C buffer is null.
    Str(Option<String>),
    Data(Vec<u8>),
    Identity { label: Option<String> },
}

#[derive(Default)]
struct Inner {
    objects: HashMap<RawHandle, Obj>,
    /// Caller-held release obligations per handle. Store-internal references
    /// are not counted; the sum of this map is what must reach zero.
    owned: HashMap<RawHandle, usize>,
    next_handle: RawHandle,
    identities: Vec<IdentitySpec>,
    query_status: Option<OsStatus>,
    export_status: Option<OsStatus>,
    export_calls: usize,
    release_faults: usize,
    last_export_len: Option<usize>,
}

pub(crate) struct MemoryKeychain {
    inner: RefCell<Inner>,
}

impl MemoryKeychain {
    pub(crate) fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                next_handle: 1,
                ..Inner::default()
            }),
        }
    }

    pub(crate) fn with_identity(self, label: &str) -> Self {
        self.inner
            .borrow_mut()
            .identities
            .push(IdentitySpec::Labeled(label.to_string()));
        self
    }

    pub(crate) fn with_identity_missing_label(self) -> Self {
        self.inner
            .borrow_mut()
            .identities
            .push(IdentitySpec::MissingLabel);
        self
    }

    pub(crate) fn with_identity_nonstring_label(self) -> Self {
        self.inner
            .borrow_mut()
            .identities
            .push(IdentitySpec::NonStringLabel);
        self
    }

    pub(crate) fn with_identity_null_label(self) -> Self {
        self.inner
            .borrow_mut()
            .identities
            .push(IdentitySpec::NullLabel);
        self
    }

    pub(crate) fn with_query_failure(self, code: OsStatus) -> Self {
        self.inner.borrow_mut().query_status = Some(code);
        self
    }

    pub(crate) fn with_export_failure(self, code: OsStatus) -> Self {
        self.inner.borrow_mut().export_status = Some(code);
        self
    }

    /// Net caller-held acquisitions. Zero means no leaks.
    pub(crate) fn outstanding(&self) -> usize {
        self.inner.borrow().owned.values().sum()
    }

    pub(crate) fn export_calls(&self) -> usize {
        self.inner.borrow().export_calls
    }

    pub(crate) fn release_faults(&self) -> usize {
        self.inner.borrow().release_faults
    }

    pub(crate) fn last_export_len(&self) -> Option<usize> {
        self.inner.borrow().last_export_len
    }

    /// Label of an identity object, for asserting what a resolved handle
    /// actually points at.
    pub(crate) fn identity_label(&self, handle: RawHandle) -> Option<String> {
        match self.inner.borrow().objects.get(&handle) {
            Some(Obj::Identity { label }) => label.clone(),
            _ => None,
        }
    }
}

impl Inner {
    fn alloc(&mut self, obj: Obj) -> RawHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.objects.insert(handle, obj);
        handle
    }

    /// Materialize one record (identity object, label object, attribute
    /// dictionary) and return the dictionary handle.
    fn build_record(&mut self, index: usize) -> RawHandle {
        let (label, label_obj) = match &self.identities[index] {
            IdentitySpec::Labeled(label) => {
                (Some(label.clone()), Some(Obj::Str(Some(label.clone()))))
            }
            IdentitySpec::MissingLabel => (None, None),
            IdentitySpec::NonStringLabel => (None, Some(Obj::Data(b"not a string".to_vec()))),
            IdentitySpec::NullLabel => (None, Some(Obj::Str(None))),
        };

        let identity = self.alloc(Obj::Identity { label });
        let mut dict = HashMap::new();
        dict.insert(AttrKey::Reference, identity);
        if let Some(obj) = label_obj {
            let label_handle = self.alloc(obj);
            dict.insert(AttrKey::Label, label_handle);
        }
        self.alloc(Obj::Dict(dict))
    }
}

impl KeychainApi for MemoryKeychain {
    fn copy_identities(&self) -> Result<RawHandle, OsStatus> {
        let mut inner = self.inner.borrow_mut();
        if let Some(code) = inner.query_status {
            return Err(code);
        }

        let records: Vec<RawHandle> = (0..inner.identities.len())
            .map(|index| inner.build_record(index))
            .collect();
        let array = inner.alloc(Obj::Array(records));
        *inner.owned.entry(array).or_insert(0) += 1;
        Ok(array)
    }

    fn retain(&self, handle: RawHandle) -> RawHandle {
        let mut inner = self.inner.borrow_mut();
        assert!(
            inner.objects.contains_key(&handle),
            "retain of unknown handle {handle:#x}"
        );
        *inner.owned.entry(handle).or_insert(0) += 1;
        handle
    }

    fn release(&self, handle: RawHandle) -> Result<(), ReleaseError> {
        let mut inner = self.inner.borrow_mut();
        match inner.owned.get_mut(&handle) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(())
            }
            _ => {
                inner.release_faults += 1;
                Err(ReleaseError { handle })
            }
        }
    }

    fn array_len(&self, array: RawHandle) -> usize {
        match self.inner.borrow().objects.get(&array) {
            Some(Obj::Array(elements)) => elements.len(),
            _ => panic!("array_len on non-array handle {array:#x}"),
        }
    }

    fn array_get(&self, array: RawHandle, index: usize) -> RawHandle {
        match self.inner.borrow().objects.get(&array) {
            Some(Obj::Array(elements)) => elements[index],
            _ => panic!("array_get on non-array handle {array:#x}"),
        }
    }

    fn dict_get(&self, dict: RawHandle, key: AttrKey) -> Option<RawHandle> {
        match self.inner.borrow().objects.get(&dict) {
            Some(Obj::Dict(entries)) => entries.get(&key).copied(),
            _ => panic!("dict_get on non-dictionary handle {dict:#x}"),
        }
    }

    fn type_of(&self, handle: RawHandle) -> TypeTag {
        match self.inner.borrow().objects.get(&handle) {
            Some(Obj::Str(_)) => TypeTag::String,
            Some(Obj::Data(_)) => TypeTag::Data,
            Some(Obj::Dict(_)) => TypeTag::Dictionary,
            Some(Obj::Array(_)) => TypeTag::Array,
            Some(Obj::Identity { .. }) => TypeTag::Identity,
            None => TypeTag::Unknown,
        }
    }

    fn copy_string(&self, string: RawHandle) -> Option<String> {
        match self.inner.borrow().objects.get(&string) {
            Some(Obj::Str(value)) => value.clone(),
            _ => None,
        }
    }

    fn export_pkcs12(
        &self,
        identities: &[RawHandle],
        params: &ExportParams,
    ) -> Result<RawHandle, OsStatus> {
        let mut inner = self.inner.borrow_mut();
        inner.export_calls += 1;
        assert!(params.passphrase.is_empty(), "export expects an empty passphrase");

        if let Some(code) = inner.export_status {
            return Err(code);
        }

        let (header, footer): (&[u8], &[u8]) = match params.format {
            ExportFormat::Pkcs12 => (b"-----BEGIN PKCS12-----\n", b"-----END PKCS12-----\n"),
        };
        let mut payload = header.to_vec();
        for &handle in identities {
            match inner.objects.get(&handle) {
                Some(Obj::Identity { label }) => {
                    payload.extend_from_slice(label.as_deref().unwrap_or("<unlabeled>").as_bytes());
                    payload.push(b'\n');
                }
                _ => panic!("export of non-identity handle {handle:#x}"),
            }
        }
        payload.extend_from_slice(footer);

        inner.last_export_len = Some(payload.len());
        let data = inner.alloc(Obj::Data(payload));
        *inner.owned.entry(data).or_insert(0) += 1;
        Ok(data)
    }

    fn data_bytes(&self, data: RawHandle) -> Vec<u8> {
        match self.inner.borrow().objects.get(&data) {
            Some(Obj::Data(bytes)) => bytes.clone(),
            _ => panic!("data_bytes on non-data handle {data:#x}"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_release_is_detected() {
        let store = MemoryKeychain::new().with_identity("Test Cert");
        let array = store.copy_identities().unwrap();

        store.release(array).unwrap();
        assert!(store.release(array).is_err());
        assert_eq!(store.release_faults(), 1);
    }

    #[test]
    fn retain_and_release_balance_out() {
        let store = MemoryKeychain::new().with_identity("Test Cert");
        let array = store.copy_identities().unwrap();
        let record = store.array_get(array, 0);
        let identity = store.dict_get(record, AttrKey::Reference).unwrap();

        store.retain(identity);
        assert_eq!(store.outstanding(), 2);

        store.release(identity).unwrap();
        store.release(array).unwrap();
        assert_eq!(store.outstanding(), 0);
    }
}
