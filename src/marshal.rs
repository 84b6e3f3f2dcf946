//! String marshaling across the toolkit boundary.
//!
//! Values are bytes first. [`copy_foreign_bytes`] and [`object_bytes`] keep
//! exactly what the toolkit stored, and the `String` variants refuse input
//! that is not UTF-8 instead of rewriting it.
//!
//! Ownership rules:
//! - strings returned by toolkit getters are borrowed and copied
//!   ([`copy_foreign_str`], [`copy_foreign_bytes`]);
//! - strings the toolkit hands over with ownership are copied, then freed
//!   exactly once ([`take_foreign_string`]);
//! - strings we pass in live only for the duration of one call
//!   ([`with_c_str`]);
//! - strings we return from exported functions are allocated with the C
//!   allocator and owned by the receiver ([`into_foreign_string`]).

use std::ffi::{CStr, CString, c_char};

use crate::error::{MarshalError, XanteError};
use crate::toolkit::{RawHandle, Toolkit};

/// Copy a borrowed, null-terminated foreign string byte for byte.
///
/// # Safety
///
/// `ptr` must be null or point to a null-terminated string that stays valid
/// for the duration of this call.
pub unsafe fn copy_foreign_bytes(ptr: *const c_char) -> Result<CString, MarshalError> {
    if ptr.is_null() {
        return Err(MarshalError::NullString);
    }

    // SAFETY: non-null and null-terminated per the caller's contract.
    Ok(unsafe { CStr::from_ptr(ptr) }.to_owned())
}

/// Copy a borrowed, null-terminated foreign string as UTF-8.
///
/// # Safety
///
/// As for [`copy_foreign_bytes`].
pub unsafe fn copy_foreign_str(ptr: *const c_char) -> Result<String, MarshalError> {
    // SAFETY: forwarded from the caller.
    let bytes = unsafe { copy_foreign_bytes(ptr) }?;
    into_utf8(bytes)
}

/// Decode bytes copied from the toolkit.
pub fn into_utf8(bytes: CString) -> Result<String, MarshalError> {
    bytes.into_string().map_err(|e| MarshalError::InvalidUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

/// Copy a string the toolkit gave us ownership of, then release it.
///
/// # Safety
///
/// `ptr` must be null or a string allocated by the allocator behind
/// [`Toolkit::free_string`], and must not be used after this call.
pub unsafe fn take_foreign_string(
    toolkit: &dyn Toolkit,
    ptr: *mut c_char,
) -> Result<String, MarshalError> {
    // SAFETY: forwarded from the caller.
    let copied = unsafe { copy_foreign_str(ptr) }?;
    // SAFETY: non-null (checked above) and owned by us.
    unsafe { toolkit.free_string(ptr) };
    Ok(copied)
}

/// Build a null-terminated copy of `s`.
pub fn c_string(s: &str) -> Result<CString, MarshalError> {
    CString::new(s).map_err(|e| MarshalError::InteriorNul {
        position: e.nul_position(),
    })
}

/// Run `f` with a temporary null-terminated copy of `s`.
///
/// The copy is dropped as soon as `f` returns, on every path.
pub fn with_c_str<R>(s: &str, f: impl FnOnce(&CStr) -> R) -> Result<R, MarshalError> {
    let c = c_string(s)?;
    Ok(f(&c))
}

/// Allocate a copy of `s` for a receiver that will `free` it.
pub fn into_foreign_string(toolkit: &dyn Toolkit, s: &str) -> Result<*mut c_char, MarshalError> {
    let c = c_string(s)?;
    Ok(toolkit.alloc_string(&c))
}

/// Read a value object's bytes and drop our reference to it.
///
/// `object` must be a reference the caller owns (as returned by
/// [`Toolkit::item_value`] or [`Toolkit::cfg_get_value`]).
pub fn object_bytes(toolkit: &dyn Toolkit, object: RawHandle) -> Result<CString, XanteError> {
    let bytes = match toolkit.object_to_cstring(object) {
        Some(string) => {
            // SAFETY: the string object holds the bytes until we unref it.
            let copied = unsafe { copy_foreign_bytes(toolkit.string_valueof(string)) };
            toolkit.string_unref(string);
            copied.map_err(XanteError::from)
        }
        None => Err(XanteError::NoValue),
    };

    toolkit.object_unref(object);
    bytes
}

/// Read a value object as UTF-8 text and drop our reference to it.
pub fn object_string(toolkit: &dyn Toolkit, object: RawHandle) -> Result<String, XanteError> {
    Ok(into_utf8(object_bytes(toolkit, object)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeToolkit;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_is_an_error() {
        // SAFETY: null is accepted.
        let err = unsafe { copy_foreign_str(std::ptr::null()) }.unwrap_err();
        assert_eq!(err, MarshalError::NullString);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let latin1 = c"caf\xe9";
        // SAFETY: static null-terminated string.
        let err = unsafe { copy_foreign_str(latin1.as_ptr()) }.unwrap_err();
        assert_eq!(err, MarshalError::InvalidUtf8 { valid_up_to: 3 });
    }

    #[test]
    fn test_latin1_bytes_survive_a_copy() {
        let latin1 = c"c\xe7a";
        // SAFETY: static null-terminated string.
        let copied = unsafe { copy_foreign_bytes(latin1.as_ptr()) }.unwrap();
        assert_eq!(copied.as_bytes(), &[0x63, 0xE7, 0x61]);
        assert_eq!(copied.as_c_str(), latin1);
    }

    #[test]
    fn test_interior_nul_reports_position() {
        let err = with_c_str("ab\0cd", |_| ()).unwrap_err();
        assert_eq!(err, MarshalError::InteriorNul { position: 2 });
    }

    #[test]
    fn test_with_c_str_passes_exact_bytes() {
        let len = with_c_str("input_string", |c| c.to_bytes().len()).unwrap();
        assert_eq!(len, "input_string".len());
    }

    #[test]
    fn test_round_trip_preserves_bytes() {
        let toolkit = FakeToolkit::new();
        for original in ["", "input_string", "ação", "multi\nline\ttext"] {
            let foreign = toolkit.foreign_string(original);
            // SAFETY: allocated by the fake, freed once below.
            let copied = unsafe { take_foreign_string(&toolkit, foreign) }.unwrap();
            assert_eq!(copied, original);

            let back = into_foreign_string(&toolkit, &copied).unwrap();
            // SAFETY: freshly allocated above.
            let bytes = unsafe { CStr::from_ptr(back) }.to_bytes().to_vec();
            assert_eq!(bytes, original.as_bytes());
            // SAFETY: the receiver releases what it was given.
            unsafe { toolkit.free_string(back) };
        }

        let allocs = toolkit.allocations();
        assert_eq!(allocs.outstanding, 0);
        assert_eq!(allocs.invalid_frees, 0);
        assert_eq!(allocs.allocated, 8);
        assert_eq!(allocs.freed, 8);
    }

    #[test]
    fn test_object_string_releases_references() {
        let toolkit = FakeToolkit::new();
        let object = toolkit.add_value_object("42");
        assert_eq!(object_string(&toolkit, object).unwrap(), "42");
        assert_eq!(toolkit.live_objects(), 0);
    }

    #[test]
    fn test_object_string_rejects_latin1_but_releases() {
        let toolkit = FakeToolkit::new();
        let object = toolkit.add_value_object_bytes(b"ol\xe1");
        assert_eq!(
            object_string(&toolkit, object).unwrap_err(),
            XanteError::Marshal(MarshalError::InvalidUtf8 { valid_up_to: 2 })
        );
        assert_eq!(toolkit.live_objects(), 0);

        let object = toolkit.add_value_object_bytes(b"ol\xe1");
        assert_eq!(object_bytes(&toolkit, object).unwrap().as_bytes(), b"ol\xe1");
        assert_eq!(toolkit.live_objects(), 0);
    }
}
