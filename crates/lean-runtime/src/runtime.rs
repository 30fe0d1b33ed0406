//! Runtime: owner of the native function table
//!
//! A [`Runtime`] holds the [`NativeApi`] table plus, for dynamically loaded
//! runtimes, the mapped library that keeps those function pointers valid.
//! Every safe value in the crate carries an `Arc<Runtime>` so queries and
//! deleters remain callable for as long as any value is alive.

use crate::ffi::call;
use crate::ffi::handle::Handle;
use crate::ffi::loader::{self, LoadError};
use crate::ffi::raw::{NativeApi, RawOptions};
use crate::hosted;
use crate::options::Options;
use crate::LeanResult;
use libloading::Library;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// A loaded (or hosted) native theorem-prover runtime.
pub struct Runtime {
    api: NativeApi,
    /// Cached empty options. Declared before the library: fields drop in
    /// declaration order, and this handle's deleter is a function pointer
    /// into that library, so the handle must go first.
    empty_options: OnceLock<Arc<Handle<RawOptions>>>,
    /// Keeps the shared library mapped while any function pointer may run.
    _library: Option<Library>,
}

impl Runtime {
    /// Load the native runtime by library name (for example `"leanshared"`),
    /// searching the platform's library paths with the usual prefix and
    /// extension conventions.
    pub fn load(name: &str) -> Result<Arc<Self>, LoadError> {
        let path = loader::resolve_library_path(name)
            .ok_or_else(|| LoadError::LibraryNotFound(name.to_owned()))?;
        Self::load_from_path(&path)
    }

    /// Load the native runtime from an explicit shared-library path.
    pub fn load_from_path(path: &Path) -> Result<Arc<Self>, LoadError> {
        let library = unsafe { Library::new(path) }.map_err(|e| LoadError::LoadFailed {
            library: path.display().to_string(),
            message: e.to_string(),
        })?;
        let api = unsafe { loader::api_from_library(&library) }?;
        Ok(Arc::new(Self {
            api,
            empty_options: OnceLock::new(),
            _library: Some(library),
        }))
    }

    /// The in-process reference backend (see [`crate::hosted`]): same ABI
    /// contract, no external library. Useful for tests and for exercising
    /// the binding where the prover is not installed.
    pub fn hosted() -> Arc<Self> {
        Arc::new(Self {
            api: hosted::api(),
            empty_options: OnceLock::new(),
            _library: None,
        })
    }

    /// The native function table.
    ///
    /// Calls through the table should go via the `ffi::call` adapters, which
    /// enforce the out-parameter and exception-slot contract.
    pub fn api(&self) -> &NativeApi {
        &self.api
    }

    /// The empty options value: constructed once per runtime, then shared.
    pub fn empty_options(self: &Arc<Self>) -> LeanResult<Options> {
        if let Some(handle) = self.empty_options.get() {
            return Ok(Options::from_shared(self, Arc::clone(handle)));
        }
        let options = call::call::<Options>(self, "options_mk_empty", |out, ex| unsafe {
            (self.api.options_mk_empty)(out, ex)
        })?;
        let _ = self.empty_options.set(Arc::clone(options.shared_handle()));
        Ok(options)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("loaded", &self._library.is_some())
            .finish_non_exhaustive()
    }
}
