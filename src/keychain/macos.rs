// certexport — Security Framework Backend
//
// Maps the `KeychainApi` primitives one-to-one onto CoreFoundation and
// Security framework calls. This is the one module that touches raw
// CFTypeRefs; the CoreFoundation ownership rules (copy/create/retain = we
// release, get = we must not) surface at the trait boundary as owned vs
// borrowed handles and nowhere else.

use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;

use core_foundation_sys::array::{
    kCFTypeArrayCallBacks, CFArrayCreate, CFArrayGetCount, CFArrayGetTypeID,
    CFArrayGetValueAtIndex, CFArrayRef,
};
use core_foundation_sys::base::{
    kCFAllocatorDefault, CFGetTypeID, CFIndex, CFRelease, CFRetain, CFTypeRef,
};
use core_foundation_sys::data::{CFDataGetBytePtr, CFDataGetLength, CFDataGetTypeID, CFDataRef};
use core_foundation_sys::dictionary::{
    kCFTypeDictionaryKeyCallBacks, kCFTypeDictionaryValueCallBacks, CFDictionaryAddValue,
    CFDictionaryCreateMutable, CFDictionaryGetTypeID, CFDictionaryGetValueIfPresent,
    CFDictionaryRef,
};
use core_foundation_sys::number::kCFBooleanTrue;
use core_foundation_sys::string::{
    kCFStringEncodingUTF8, CFStringCreateWithBytes, CFStringGetCString, CFStringGetCStringPtr,
    CFStringGetLength, CFStringGetMaximumSizeForEncoding, CFStringGetTypeID, CFStringRef,
};
use security_framework_sys::base::{errSecItemNotFound, errSecSuccess};
use security_framework_sys::identity::SecIdentityGetTypeID;
use security_framework_sys::import_export::{
    kSecFormatPKCS12, SecItemExport, SecItemImportExportFlags, SecItemImportExportKeyParameters,
    SEC_KEY_IMPORT_EXPORT_PARAMS_VERSION,
};
use security_framework_sys::item::{
    kSecAttrLabel, kSecClass, kSecClassIdentity, kSecMatchLimit, kSecMatchLimitAll,
    kSecReturnAttributes, kSecReturnRef, kSecValueRef,
};
use security_framework_sys::keychain_item::SecItemCopyMatching;

use super::api::{AttrKey, ExportFormat, ExportParams, KeychainApi, OsStatus, RawHandle, TypeTag};
use super::error::ReleaseError;

// kSecItemPemArmour from SecImportExport.h; the -sys crate does not export
// the item flags.
const SEC_ITEM_PEM_ARMOUR: SecItemImportExportFlags = 1;

/// The production store: the user's keychains, reached through the Security
/// framework. Calls are blocking and may put up the platform authorization
/// dialog; `SecItemExport` in particular suspends until the user answers.
pub struct SecurityFrameworkKeychain;

impl SecurityFrameworkKeychain {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SecurityFrameworkKeychain {
    fn default() -> Self {
        Self::new()
    }
}

fn cf_string(s: &str) -> CFStringRef {
    unsafe {
        CFStringCreateWithBytes(
            kCFAllocatorDefault,
            s.as_ptr(),
            s.len() as CFIndex,
            kCFStringEncodingUTF8,
            0,
        )
    }
}

impl KeychainApi for SecurityFrameworkKeychain {
    fn copy_identities(&self) -> Result<RawHandle, OsStatus> {
        unsafe {
            let query = CFDictionaryCreateMutable(
                kCFAllocatorDefault,
                0,
                &kCFTypeDictionaryKeyCallBacks,
                &kCFTypeDictionaryValueCallBacks,
            );
            CFDictionaryAddValue(query, kSecClass as *const c_void, kSecClassIdentity as *const c_void);
            CFDictionaryAddValue(query, kSecMatchLimit as *const c_void, kSecMatchLimitAll as *const c_void);
            CFDictionaryAddValue(query, kSecReturnAttributes as *const c_void, kCFBooleanTrue as *const c_void);
            CFDictionaryAddValue(query, kSecReturnRef as *const c_void, kCFBooleanTrue as *const c_void);

            let mut results: CFTypeRef = ptr::null();
            let status = SecItemCopyMatching(query as CFDictionaryRef, &mut results);
            CFRelease(query as CFTypeRef);

            match status {
                s if s == errSecSuccess => Ok(results as RawHandle),
                // No identities at all: hand back an empty owned array so
                // the resolver's NotFound mapping holds on both backends.
                s if s == errSecItemNotFound => {
                    let empty =
                        CFArrayCreate(kCFAllocatorDefault, ptr::null(), 0, &kCFTypeArrayCallBacks);
                    Ok(empty as RawHandle)
                }
                s => Err(s),
            }
        }
    }

    fn retain(&self, handle: RawHandle) -> RawHandle {
        unsafe { CFRetain(handle as CFTypeRef) as RawHandle }
    }

    fn release(&self, handle: RawHandle) -> Result<(), ReleaseError> {
        // CFRelease cannot report misuse; an over-release aborts inside the
        // framework. The detectable variant lives in the test fake.
        unsafe { CFRelease(handle as CFTypeRef) };
        Ok(())
    }

    fn array_len(&self, array: RawHandle) -> usize {
        unsafe { CFArrayGetCount(array as CFArrayRef) as usize }
    }

    fn array_get(&self, array: RawHandle, index: usize) -> RawHandle {
        unsafe { CFArrayGetValueAtIndex(array as CFArrayRef, index as CFIndex) as RawHandle }
    }

    fn dict_get(&self, dict: RawHandle, key: AttrKey) -> Option<RawHandle> {
        unsafe {
            let key_ref = match key {
                AttrKey::Label => kSecAttrLabel,
                AttrKey::Reference => kSecValueRef,
            };
            let mut value: *const c_void = ptr::null();
            let present = CFDictionaryGetValueIfPresent(
                dict as CFDictionaryRef,
                key_ref as *const c_void,
                &mut value,
            );
            // Present-but-null is the same "missing" condition as absence.
            if present == 0 || value.is_null() {
                None
            } else {
                Some(value as RawHandle)
            }
        }
    }

    fn type_of(&self, handle: RawHandle) -> TypeTag {
        unsafe {
            let id = CFGetTypeID(handle as CFTypeRef);
            if id == CFStringGetTypeID() {
                TypeTag::String
            } else if id == CFDataGetTypeID() {
                TypeTag::Data
            } else if id == CFDictionaryGetTypeID() {
                TypeTag::Dictionary
            } else if id == CFArrayGetTypeID() {
                TypeTag::Array
            } else if id == SecIdentityGetTypeID() {
                TypeTag::Identity
            } else {
                TypeTag::Unknown
            }
        }
    }

    fn copy_string(&self, string: RawHandle) -> Option<String> {
        unsafe {
            let string = string as CFStringRef;
            let fast = CFStringGetCStringPtr(string, kCFStringEncodingUTF8);
            if !fast.is_null() {
                return Some(CStr::from_ptr(fast).to_string_lossy().into_owned());
            }

            // The fast path only covers contiguous ASCII-backed storage;
            // copy through a buffer before treating the value as missing.
            let length = CFStringGetLength(string);
            let capacity = CFStringGetMaximumSizeForEncoding(length, kCFStringEncodingUTF8) + 1;
            let mut buf = vec![0u8; capacity as usize];
            if CFStringGetCString(
                string,
                buf.as_mut_ptr() as *mut c_char,
                capacity,
                kCFStringEncodingUTF8,
            ) == 0
            {
                return None;
            }
            buf.truncate(buf.iter().position(|&b| b == 0).unwrap_or(buf.len()));
            String::from_utf8(buf).ok()
        }
    }

    fn export_pkcs12(
        &self,
        identities: &[RawHandle],
        params: &ExportParams,
    ) -> Result<RawHandle, OsStatus> {
        let format = match params.format {
            ExportFormat::Pkcs12 => kSecFormatPKCS12,
        };
        unsafe {
            // The array borrows the identities; releasing it afterwards does
            // not touch the caller's obligations.
            let array = CFArrayCreate(
                kCFAllocatorDefault,
                identities.as_ptr() as *const *const c_void,
                identities.len() as CFIndex,
                &kCFTypeArrayCallBacks,
            );
            let passphrase = cf_string(&params.passphrase);

            let mut key_params: SecItemImportExportKeyParameters = std::mem::zeroed();
            key_params.version = SEC_KEY_IMPORT_EXPORT_PARAMS_VERSION;
            key_params.passphrase = passphrase as CFTypeRef;

            let flags = if params.pem_armour { SEC_ITEM_PEM_ARMOUR } else { 0 };
            let mut exported: CFDataRef = ptr::null();
            let status = SecItemExport(
                array as CFTypeRef,
                format,
                flags,
                &key_params,
                &mut exported,
            );

            CFRelease(passphrase as CFTypeRef);
            CFRelease(array as CFTypeRef);

            if status != errSecSuccess {
                return Err(status);
            }
            Ok(exported as RawHandle)
        }
    }

    fn data_bytes(&self, data: RawHandle) -> Vec<u8> {
        unsafe {
            let len = CFDataGetLength(data as CFDataRef) as usize;
            if len == 0 {
                return Vec::new();
            }
            let ptr = CFDataGetBytePtr(data as CFDataRef);
            std::slice::from_raw_parts(ptr, len).to_vec()
        }
    }
}
