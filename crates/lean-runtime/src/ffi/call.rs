//! Partial-call protocol: adapters over the native calling convention
//!
//! Every fallible native call writes a success flag plus out-parameters; the
//! three adapters here translate the three shapes of that convention into
//! `Result` values:
//!
//! - [`try_call`] — action shape: success flag plus an exception slot.
//! - [`call`] — value-producing shape: adds a result out-slot, written only
//!   on success; the raw result goes through the [`FromNative`] registry.
//! - [`call_optional`] — soft-failure shape: a false flag with a *null*
//!   exception slot means "no value, no error" and becomes `Ok(None)`.
//!
//! Out-slots are stack-local to one invocation and never escape it. The
//! adapters never retry and never panic on native-reported failure; failures
//! are always returned as data. Higher binding layers (environments,
//! declarations, expressions) are expected to route their native calls
//! through these adapters rather than re-implement the convention.

use crate::exception::Exception;
use crate::ffi::handle::Handle;
use crate::ffi::marshal::FromNative;
use crate::ffi::raw::{lean_bool, RawException};
use crate::runtime::Runtime;
use crate::{LeanError, LeanResult};
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::Arc;

/// Wrap the exception written through an out-slot into a [`LeanError`].
///
/// Takes ownership of the native exception object immediately so it is
/// released even when the kind code turns out to be invalid.
fn take_exception(rt: &Arc<Runtime>, raw: *mut RawException) -> LeanError {
    let handle = match unsafe { Handle::acquire(raw, rt.api().exception_del, "exception slot") } {
        Ok(handle) => handle,
        Err(err) => return err,
    };
    match Exception::from_native_handle(rt, handle) {
        Ok(exception) => LeanError::Exception(exception),
        Err(err) => err,
    }
}

/// Run an action-shape native call.
///
/// `f` receives the exception out-slot and returns the native success flag.
/// On failure the slot is guaranteed non-null by the native contract; a null
/// slot is reported as [`LeanError::MissingException`], named by `what`.
pub fn try_call(
    rt: &Arc<Runtime>,
    what: &'static str,
    f: impl FnOnce(*mut *mut RawException) -> lean_bool,
) -> LeanResult<()> {
    let mut exception: *mut RawException = ptr::null_mut();
    let ok = f(&mut exception);
    if ok != 0 {
        Ok(())
    } else if exception.is_null() {
        Err(LeanError::MissingException(what))
    } else {
        Err(take_exception(rt, exception))
    }
}

/// Run a value-producing native call and marshal the result.
///
/// `f` receives the result out-slot and the exception out-slot. The result
/// slot is read only when the call reports success.
pub fn call<T: FromNative>(
    rt: &Arc<Runtime>,
    what: &'static str,
    f: impl FnOnce(*mut T::Raw, *mut *mut RawException) -> lean_bool,
) -> LeanResult<T> {
    let mut slot = MaybeUninit::<T::Raw>::uninit();
    let mut exception: *mut RawException = ptr::null_mut();
    let ok = f(slot.as_mut_ptr(), &mut exception);
    if ok != 0 {
        // Initialized by the native call per the value-producing contract.
        let raw = unsafe { slot.assume_init() };
        unsafe { T::from_native(rt, raw) }
    } else if exception.is_null() {
        Err(LeanError::MissingException(what))
    } else {
        Err(take_exception(rt, exception))
    }
}

/// Run a soft-failure native call (getter class).
///
/// A false flag with a null exception slot signals "no applicable value"
/// (for example, an unset option key) and yields `Ok(None)` rather than an
/// error. A non-null slot is a genuine failure and propagates.
pub fn call_optional<T: FromNative>(
    rt: &Arc<Runtime>,
    f: impl FnOnce(*mut T::Raw, *mut *mut RawException) -> lean_bool,
) -> LeanResult<Option<T>> {
    let mut slot = MaybeUninit::<T::Raw>::uninit();
    let mut exception: *mut RawException = ptr::null_mut();
    let ok = f(slot.as_mut_ptr(), &mut exception);
    if ok != 0 {
        let raw = unsafe { slot.assume_init() };
        unsafe { T::from_native(rt, raw) }.map(Some)
    } else if exception.is_null() {
        Ok(None)
    } else {
        Err(take_exception(rt, exception))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ExceptionKind;
    use crate::ffi::raw::kind_code;
    use crate::hosted;
    use std::os::raw::c_int;

    // Local C-ABI stubs covering each call shape.

    unsafe extern "C" fn stub_action_ok(_exception: *mut *mut RawException) -> lean_bool {
        1
    }

    unsafe extern "C" fn stub_value_ok(
        out: *mut c_int,
        _exception: *mut *mut RawException,
    ) -> lean_bool {
        *out = 37;
        1
    }

    unsafe extern "C" fn stub_fail_with_exception(
        exception: *mut *mut RawException,
    ) -> lean_bool {
        *exception = hosted::mk_exception(kind_code::KERNEL, "stubbed kernel failure");
        0
    }

    unsafe extern "C" fn stub_fail_silently(_exception: *mut *mut RawException) -> lean_bool {
        0
    }

    unsafe extern "C" fn stub_getter_unset(
        _out: *mut c_int,
        _exception: *mut *mut RawException,
    ) -> lean_bool {
        0
    }

    #[test]
    fn test_try_call_success() {
        let rt = Runtime::hosted();
        let result = try_call(&rt, "stub_action", |ex| unsafe { stub_action_ok(ex) });
        assert!(result.is_ok());
    }

    #[test]
    fn test_try_call_failure_carries_exception() {
        let rt = Runtime::hosted();
        let err = try_call(&rt, "stub_action", |ex| unsafe {
            stub_fail_with_exception(ex)
        })
        .unwrap_err();
        match err {
            LeanError::Exception(exception) => {
                assert_eq!(exception.kind(), ExceptionKind::Kernel);
                assert_eq!(exception.raw_message(), "stubbed kernel failure");
            }
            other => panic!("expected exception, got {other:?}"),
        }
    }

    #[test]
    fn test_try_call_null_slot_is_protocol_violation() {
        let rt = Runtime::hosted();
        let err = try_call(&rt, "stub_action", |ex| unsafe { stub_fail_silently(ex) })
            .unwrap_err();
        assert!(matches!(err, LeanError::MissingException("stub_action")));
    }

    #[test]
    fn test_call_reads_value_slot_on_success() {
        let rt = Runtime::hosted();
        let value: i32 = call(&rt, "stub_value", |out, ex| unsafe {
            stub_value_ok(out, ex)
        })
        .unwrap();
        assert_eq!(value, 37);
    }

    #[test]
    fn test_call_optional_unset_is_none_not_error() {
        let rt = Runtime::hosted();
        let value: Option<i32> =
            call_optional(&rt, |out, ex| unsafe { stub_getter_unset(out, ex) }).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_call_optional_propagates_genuine_failure() {
        let rt = Runtime::hosted();
        let result: LeanResult<Option<i32>> = call_optional(&rt, |_out, ex| unsafe {
            stub_fail_with_exception(ex)
        });
        assert!(matches!(result, Err(LeanError::Exception(_))));
    }
}
