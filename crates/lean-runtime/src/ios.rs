//! Buffered IO states
//!
//! An [`IoState`] pairs two in-memory output sinks (regular and diagnostic).
//! In this crate it exists as the rendering context the native pretty
//! printer requires; it is created on demand and dropped as soon as the
//! rendered text has been copied out.

use crate::ffi::call;
use crate::ffi::handle::Handle;
use crate::ffi::raw::RawIos;
use crate::options::Options;
use crate::runtime::Runtime;
use crate::LeanResult;
use std::sync::Arc;

/// A native IO state with buffered output sinks.
pub struct IoState {
    handle: Handle<RawIos>,
    rt: Arc<Runtime>,
}

impl IoState {
    /// Construct a buffered IO state configured by `options`.
    pub fn buffered(rt: &Arc<Runtime>, options: &Options) -> LeanResult<Self> {
        options.with_raw(|opts| {
            call::call::<IoState>(rt, "ios_mk_buffered", |out, ex| unsafe {
                (rt.api().ios_mk_buffered)(opts, out, ex)
            })
        })
    }

    pub(crate) unsafe fn from_raw(rt: &Arc<Runtime>, raw: *mut RawIos) -> LeanResult<Self> {
        let handle = Handle::acquire(raw, rt.api().ios_del, "io state")?;
        Ok(Self {
            handle,
            rt: Arc::clone(rt),
        })
    }

    pub(crate) fn with_raw<R>(&self, f: impl FnOnce(*mut RawIos) -> R) -> R {
        self.handle.with_raw(f)
    }

    /// Copy out everything written to the regular output sink.
    pub fn regular_output(&self) -> LeanResult<String> {
        let rt = &self.rt;
        self.with_raw(|raw| {
            call::call::<String>(rt, "ios_get_regular", |out, ex| unsafe {
                (rt.api().ios_get_regular)(raw, out, ex)
            })
        })
    }

    /// Copy out everything written to the diagnostic output sink.
    pub fn diagnostic_output(&self) -> LeanResult<String> {
        let rt = &self.rt;
        self.with_raw(|raw| {
            call::call::<String>(rt, "ios_get_diagnostic", |out, ex| unsafe {
                (rt.api().ios_get_diagnostic)(raw, out, ex)
            })
        })
    }
}

impl std::fmt::Debug for IoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoState").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_ios_starts_empty() {
        let rt = Runtime::hosted();
        let options = rt.empty_options().unwrap();
        let ios = IoState::buffered(&rt, &options).unwrap();
        assert_eq!(ios.regular_output().unwrap(), "");
        assert_eq!(ios.diagnostic_output().unwrap(), "");
    }
}
