// certexport — Handle Lifetime Guard
//
// The store's objects are manually reference counted: a handle obtained via
// a copy/create/retain primitive is owned and must be released exactly once;
// a handle obtained via a get accessor is borrowed and must never be
// released. `Owned` and `Borrowed` make that distinction a compile-time
// category instead of a call-site convention — every early-return error path
// releases exactly what it acquired because release rides on `Drop`.

use std::marker::PhantomData;

use super::api::{KeychainApi, RawHandle};

/// A caller-owned store reference. Released exactly once when dropped.
/// Not `Clone`: moving the guard is the only way to transfer the release
/// obligation.
pub struct Owned<'k> {
    api: &'k dyn KeychainApi,
    raw: RawHandle,
}

impl<'k> Owned<'k> {
    /// Wrap a handle that a copy/create primitive already made us own.
    pub(crate) fn from_copy(api: &'k dyn KeychainApi, raw: RawHandle) -> Self {
        Self { api, raw }
    }

    /// Retain a borrowed reference, converting it into an owned one.
    pub(crate) fn retained(api: &'k dyn KeychainApi, borrowed: Borrowed<'_>) -> Self {
        let raw = api.retain(borrowed.raw());
        Self { api, raw }
    }

    /// The underlying handle, still owned by this guard.
    pub fn raw(&self) -> RawHandle {
        self.raw
    }

    /// A borrowed view of this handle, bounded by the guard's lifetime.
    pub fn as_borrowed(&self) -> Borrowed<'_> {
        Borrowed::new(self.raw)
    }
}

impl Drop for Owned<'_> {
    fn drop(&mut self) {
        // A failed release means the store no longer considered the handle
        // live. That is a bug on our side, not a recoverable runtime fault:
        // log it and keep going so sibling handles still get released.
        if let Err(fault) = self.api.release(self.raw) {
            tracing::error!(handle = self.raw, %fault, "handle release failed");
        }
    }
}

impl std::fmt::Debug for Owned<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Owned").field(&self.raw).finish()
    }
}

/// A borrowed store reference: no release obligation, lifetime bounded by
/// the container it was read from.
#[derive(Debug, Clone, Copy)]
pub struct Borrowed<'a> {
    raw: RawHandle,
    _owner: PhantomData<&'a ()>,
}

impl Borrowed<'_> {
    pub(crate) fn new(raw: RawHandle) -> Self {
        Self {
            raw,
            _owner: PhantomData,
        }
    }

    pub fn raw(&self) -> RawHandle {
        self.raw
    }
}

/// Release an ordered sequence of owned handles, each independently: a
/// release fault on one handle (logged by its guard) does not abort
/// releasing the rest. This is the bulk-release operation the orchestration
/// layer calls after an export batch.
pub fn release_all(handles: Vec<Owned<'_>>) {
    for handle in handles {
        drop(handle);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
