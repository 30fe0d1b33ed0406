//! Environment handles
//!
//! Only the minimal surface the exception pretty-printer needs: construct a
//! standard environment and keep it alive while rendering. Declarations,
//! names, and the rest of the environment API are higher binding layers
//! built on the same call adapters.

use crate::ffi::call;
use crate::ffi::handle::Handle;
use crate::ffi::raw::RawEnv;
use crate::runtime::Runtime;
use crate::LeanResult;
use std::sync::Arc;

/// A native environment object.
pub struct Environment {
    handle: Arc<Handle<RawEnv>>,
    rt: Arc<Runtime>,
}

impl Clone for Environment {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            rt: Arc::clone(&self.rt),
        }
    }
}

impl Environment {
    /// Construct a standard environment at the given trust level.
    pub fn standard(rt: &Arc<Runtime>, trust_level: u32) -> LeanResult<Self> {
        call::call::<Environment>(rt, "env_mk_std", |out, ex| unsafe {
            (rt.api().env_mk_std)(trust_level, out, ex)
        })
    }

    pub(crate) unsafe fn from_raw(rt: &Arc<Runtime>, raw: *mut RawEnv) -> LeanResult<Self> {
        let handle = Handle::acquire(raw, rt.api().env_del, "environment")?;
        Ok(Self {
            handle: Arc::new(handle),
            rt: Arc::clone(rt),
        })
    }

    pub(crate) fn with_raw<R>(&self, f: impl FnOnce(*mut RawEnv) -> R) -> R {
        self.handle.with_raw(f)
    }

    /// The runtime this environment belongs to.
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.rt
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}
