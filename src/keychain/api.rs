// certexport — Store Primitive Seam
//
// `KeychainApi` is the boundary between the export engine and the platform
// credential store. The methods mirror the store's own primitives one-to-one,
// so the ownership rule of each call site is visible in the signature:
// primitives that create a caller obligation (`copy_identities`, `retain`,
// `export_pkcs12`) hand back handles the caller must release exactly once,
// while accessors (`array_get`, `dict_get`) hand back borrowed references
// that must never be released and must not outlive their container.
//
// Concurrency contract: every method is a blocking call and none of the
// underlying primitives are guaranteed reentrant. At most one in-flight
// resolve-or-export call per process; `export_pkcs12` may suspend
// indefinitely on a platform authorization dialog.

use super::error::ReleaseError;

/// An opaque token identifying a store-managed object. On the Security
/// framework backend this is the CFTypeRef address; the fake backend hands
/// out synthetic ids. The token itself carries no ownership information —
/// that lives in the `Owned`/`Borrowed` guards wrapped around it.
pub type RawHandle = usize;

/// Platform status code space (OSStatus). Zero is success; every non-zero
/// value is surfaced verbatim so operators can cross-reference the platform
/// documentation.
pub type OsStatus = i32;

/// Attribute keys the engine reads from an identity record. Closed enum so
/// backends never see a key they do not know how to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// The human-readable identity label (`labl`).
    Label,
    /// The reference to the identity object itself (`v_Ref`).
    Reference,
}

impl AttrKey {
    /// The store's wire name for this key, as it appears in a returned
    /// attribute dictionary.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AttrKey::Label => "labl",
            AttrKey::Reference => "v_Ref",
        }
    }
}

impl std::fmt::Display for AttrKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Dynamic type tag of a store object, checked before any typed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    String,
    Data,
    Dictionary,
    Array,
    Identity,
    Unknown,
}

/// Archive encoding for the export primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pkcs12,
}

/// Parameters for one export call. Constructed fresh per call; no persisted
/// state.
#[derive(Debug, Clone)]
pub struct ExportParams {
    pub format: ExportFormat,
    pub pem_armour: bool,
    /// Empty by design of the calling tool: the archive is re-imported by a
    /// build system that expects a passphrase-less bundle.
    pub passphrase: String,
}

impl ExportParams {
    /// The one encoding this tool produces: PEM-armored PKCS#12 with an
    /// empty passphrase and no key-usage or attribute restriction.
    pub fn pkcs12() -> Self {
        Self {
            format: ExportFormat::Pkcs12,
            pem_armour: true,
            passphrase: String::new(),
        }
    }
}

/// The store primitives the engine needs, in the store's own vocabulary.
pub trait KeychainApi {
    /// Query every identity in the store, requesting both attributes and a
    /// reference per match. Success yields an OWNED array handle (possibly
    /// empty); failure yields the raw status code.
    fn copy_identities(&self) -> Result<RawHandle, OsStatus>;

    /// Increment the reference count of `handle`, converting a borrowed
    /// reference into one the caller owns. Returns the (same) handle, now
    /// carrying a release obligation.
    fn retain(&self, handle: RawHandle) -> RawHandle;

    /// Release one owned reference. Releasing a handle the store does not
    /// consider live is a programming error; backends that can detect it
    /// report it so the caller can log and continue.
    fn release(&self, handle: RawHandle) -> Result<(), ReleaseError>;

    /// Element count of an array handle.
    fn array_len(&self, array: RawHandle) -> usize;

    /// BORROWED element of an array handle. Must not outlive the array.
    fn array_get(&self, array: RawHandle, index: usize) -> RawHandle;

    /// BORROWED value for `key` in an attribute dictionary. `None` covers
    /// both a truly absent key and a present-but-null value — the store's
    /// accessor distinguishes the two, the engine treats them the same.
    fn dict_get(&self, dict: RawHandle, key: AttrKey) -> Option<RawHandle>;

    /// Dynamic type of any handle.
    fn type_of(&self, handle: RawHandle) -> TypeTag;

    /// Copy the contents of a string handle into a native string. `None`
    /// when the backing buffer is null, which some empty-string builds are.
    fn copy_string(&self, string: RawHandle) -> Option<String>;

    /// Run the signed-export primitive over a borrowed view of identity
    /// handles (the backend builds the native array; no ownership of the
    /// elements is transferred). Success yields an OWNED data handle;
    /// failure yields the raw status code and no handle.
    fn export_pkcs12(
        &self,
        identities: &[RawHandle],
        params: &ExportParams,
    ) -> Result<RawHandle, OsStatus>;

    /// Copy the bytes of a data handle, length taken from the buffer's own
    /// length accessor.
    fn data_bytes(&self, data: RawHandle) -> Vec<u8>;
}
