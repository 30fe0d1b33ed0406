//! Opaque resource handles with exactly-once deallocation
//!
//! A `Handle<T>` owns one native heap object and the deleter that releases
//! it. Handles are move-only: the raw pointer is never duplicated at the
//! handle level, so the deleter runs exactly once, when the handle drops.
//! Safe types that need shared ownership wrap the handle in an `Arc`.

use crate::LeanError;
use std::ptr::NonNull;

/// Owning wrapper around a native heap object.
///
/// The handle pairs the raw pointer with the type-specific native deleter.
/// It is deliberately neither `Send` nor `Sync`: the native library makes no
/// thread-safety guarantees for its objects.
pub struct Handle<T> {
    ptr: NonNull<T>,
    deleter: unsafe extern "C" fn(*mut T),
}

impl<T> Handle<T> {
    /// Take ownership of `ptr`, to be released with `deleter` on drop.
    ///
    /// Fails with [`LeanError::AllocationFailed`] if `ptr` is null; `what`
    /// names the native call for the error message.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live object of the native type that `deleter` frees,
    /// and nothing else may free it afterwards.
    pub unsafe fn acquire(
        ptr: *mut T,
        deleter: unsafe extern "C" fn(*mut T),
        what: &'static str,
    ) -> Result<Self, LeanError> {
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self { ptr, deleter }),
            None => Err(LeanError::AllocationFailed(what)),
        }
    }

    /// Scoped access to the raw pointer.
    ///
    /// The borrow of `self` keeps the handle (and therefore the native
    /// object) alive for the duration of `f`. The pointer must not escape
    /// the closure.
    pub fn with_raw<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        f(self.ptr.as_ptr())
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        // Sole owner of the pointer; the native contract requires the
        // deleter to run exactly once.
        unsafe { (self.deleter)(self.ptr.as_ptr()) }
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").field("ptr", &self.ptr).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DROPS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn counting_deleter(ptr: *mut u32) {
        DROPS.fetch_add(1, Ordering::SeqCst);
        drop(Box::from_raw(ptr));
    }

    #[test]
    fn test_acquire_null_is_allocation_failed() {
        let result = unsafe { Handle::acquire(std::ptr::null_mut(), counting_deleter, "mk_thing") };
        assert!(matches!(result, Err(LeanError::AllocationFailed("mk_thing"))));
    }

    #[test]
    fn test_deleter_runs_exactly_once() {
        DROPS.store(0, Ordering::SeqCst);
        let ptr = Box::into_raw(Box::new(7u32));
        {
            let handle = unsafe { Handle::acquire(ptr, counting_deleter, "mk_thing") }.unwrap();
            assert_eq!(handle.with_raw(|p| unsafe { *p }), 7);
            assert_eq!(DROPS.load(Ordering::SeqCst), 0);
        }
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_with_raw_returns_closure_result() {
        unsafe extern "C" fn free_u32(ptr: *mut u32) {
            drop(Box::from_raw(ptr));
        }
        let ptr = Box::into_raw(Box::new(41u32));
        let handle = unsafe { Handle::acquire(ptr, free_u32, "mk_thing") }.unwrap();
        let n = handle.with_raw(|p| unsafe { *p } + 1);
        assert_eq!(n, 42);
    }
}
