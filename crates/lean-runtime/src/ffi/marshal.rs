//! Marshaling registry: raw FFI representations to owned safe values
//!
//! [`FromNative`] is the single place a native value kind is taught to the
//! binding. Primitive kinds are representation changes; strings are copied
//! out of native-owned memory and the native buffer released; handle-bearing
//! kinds acquire an owning [`Handle`](crate::ffi::Handle) with the
//! type-specific deleter. Adding a native value type means one impl here plus
//! its deleter symbol in [`NativeApi`](crate::ffi::NativeApi).

use crate::env::Environment;
use crate::ffi::raw::{lean_bool, RawEnv, RawIos, RawOptions};
use crate::ios::IoState;
use crate::options::Options;
use crate::runtime::Runtime;
use crate::{LeanError, LeanResult};
use std::ffi::CStr;
use std::os::raw::{c_char, c_double, c_int, c_uint};
use std::sync::Arc;

/// Conversion from a raw out-parameter representation to an owned value.
pub trait FromNative: Sized {
    /// The representation the native call writes through its out-slot.
    type Raw;

    /// Take ownership of `raw` and produce the safe value.
    ///
    /// # Safety
    ///
    /// `raw` must be exactly what a successful native call of the matching
    /// shape wrote: a valid value of the raw representation, with ownership
    /// transferred to this function (it frees native-owned memory where the
    /// type requires it).
    unsafe fn from_native(rt: &Arc<Runtime>, raw: Self::Raw) -> LeanResult<Self>;
}

impl FromNative for bool {
    type Raw = lean_bool;

    unsafe fn from_native(_rt: &Arc<Runtime>, raw: lean_bool) -> LeanResult<Self> {
        Ok(raw != 0)
    }
}

impl FromNative for i32 {
    type Raw = c_int;

    unsafe fn from_native(_rt: &Arc<Runtime>, raw: c_int) -> LeanResult<Self> {
        Ok(raw)
    }
}

impl FromNative for u32 {
    type Raw = c_uint;

    unsafe fn from_native(_rt: &Arc<Runtime>, raw: c_uint) -> LeanResult<Self> {
        Ok(raw)
    }
}

impl FromNative for f64 {
    type Raw = c_double;

    unsafe fn from_native(_rt: &Arc<Runtime>, raw: c_double) -> LeanResult<Self> {
        Ok(raw)
    }
}

impl FromNative for String {
    type Raw = *const c_char;

    /// Copies the native-owned C string, then releases it with `string_del`.
    unsafe fn from_native(rt: &Arc<Runtime>, raw: *const c_char) -> LeanResult<Self> {
        if raw.is_null() {
            return Err(LeanError::AllocationFailed("native string"));
        }
        // Copy before releasing; the native buffer is invalid afterwards.
        let bytes = CStr::from_ptr(raw).to_bytes().to_vec();
        (rt.api().string_del)(raw);
        let text = std::str::from_utf8(&bytes)?;
        Ok(text.to_owned())
    }
}

impl FromNative for Options {
    type Raw = *mut RawOptions;

    unsafe fn from_native(rt: &Arc<Runtime>, raw: *mut RawOptions) -> LeanResult<Self> {
        Options::from_raw(rt, raw)
    }
}

impl FromNative for Environment {
    type Raw = *mut RawEnv;

    unsafe fn from_native(rt: &Arc<Runtime>, raw: *mut RawEnv) -> LeanResult<Self> {
        Environment::from_raw(rt, raw)
    }
}

impl FromNative for IoState {
    type Raw = *mut RawIos;

    unsafe fn from_native(rt: &Arc<Runtime>, raw: *mut RawIos) -> LeanResult<Self> {
        IoState::from_raw(rt, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_primitive_marshaling_is_representation_change() {
        let rt = Runtime::hosted();
        unsafe {
            assert!(bool::from_native(&rt, 1).unwrap());
            assert!(!bool::from_native(&rt, 0).unwrap());
            assert!(bool::from_native(&rt, 255).unwrap()); // Non-zero is true
            assert_eq!(i32::from_native(&rt, -7).unwrap(), -7);
            assert_eq!(u32::from_native(&rt, 7).unwrap(), 7);
            assert_eq!(f64::from_native(&rt, 1.5).unwrap(), 1.5);
        }
    }

    #[test]
    fn test_string_marshaling_copies_and_releases() {
        let rt = Runtime::hosted();
        // Hand the marshaler a string allocated the way the hosted backend
        // allocates its out-strings, so string_del pairs up.
        let native = CString::new("pp.compact").unwrap().into_raw() as *const c_char;
        let owned = unsafe { String::from_native(&rt, native) }.unwrap();
        assert_eq!(owned, "pp.compact");
    }

    #[test]
    fn test_string_marshaling_null_is_allocation_failed() {
        let rt = Runtime::hosted();
        let result = unsafe { String::from_native(&rt, std::ptr::null()) };
        assert!(matches!(result, Err(LeanError::AllocationFailed(_))));
    }
}
