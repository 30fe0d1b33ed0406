//! lean-runtime - Memory-safe bindings over the Lean theorem prover's C ABI
//!
//! This library wraps the prover runtime's C calling convention — boolean
//! success flags plus value and exception out-parameters — in safe value
//! semantics:
//! - Owning resource handles with exactly-once deallocation (`ffi::handle`)
//! - The partial-call protocol adapters (`ffi::call`)
//! - Per-type raw-to-owned marshaling (`ffi::marshal`)
//! - Exceptions as data with lazy pretty-printing (`exception`)
//! - The immutable options store (`options`)
//!
//! A [`Runtime`] is obtained either by loading the prover's shared library
//! ([`Runtime::load`]) or from the in-process reference backend
//! ([`Runtime::hosted`]), which implements the same ABI contract without an
//! external dependency.
//!
//! # Example
//!
//! ```
//! use lean_runtime::Runtime;
//!
//! let rt = Runtime::hosted();
//! let options = rt.empty_options().unwrap();
//! let options = options.set_bool("pp.compact", true).unwrap();
//! assert_eq!(options.get_bool("pp.compact").unwrap(), Some(true));
//! assert_eq!(options.get_bool("pp.unset_key").unwrap(), None);
//! ```

/// Binding version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod env;
pub mod exception;
pub mod ffi;
pub mod hosted;
pub mod ios;
pub mod options;
pub mod runtime;

use thiserror::Error;

/// Errors reported by the binding.
///
/// Soft absence ("key not present") is never an error; it is modeled as
/// `Ok(None)` by the soft-failure call adapter. Native failures are not
/// transient and are never retried.
#[derive(Error, Debug)]
pub enum LeanError {
    /// A native call that must produce an object returned a null pointer.
    /// Fatal; not retried.
    #[error("native allocation failed: {0} returned a null pointer")]
    AllocationFailed(&'static str),

    /// A native call reported failure without writing an exception, which
    /// the strict call shapes forbid.
    #[error("native call '{0}' failed without reporting an exception")]
    MissingException(&'static str),

    /// The native library reported an exception kind code outside the
    /// documented set (including the null marker 0).
    #[error("unrecognized native exception kind code {0}")]
    UnknownExceptionKind(i32),

    /// A name or value contains an interior NUL byte and cannot cross the
    /// boundary.
    #[error("string cannot cross the native boundary (interior NUL): {0:?}")]
    InvalidString(String),

    /// Native text was not valid UTF-8.
    #[error("native string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A native exception, carried as a value.
    #[error(transparent)]
    Exception(exception::Exception),
}

/// Result type for binding operations
pub type LeanResult<T> = Result<T, LeanError>;

// Re-export commonly used types
pub use env::Environment;
pub use exception::{Exception, ExceptionKind};
pub use ffi::{FromNative, LoadError};
pub use ios::IoState;
pub use options::{OptionValue, Options};
pub use runtime::Runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke() {
        // Smoke test to verify the crate builds and tests run
        assert_eq!(VERSION, "0.1.0");
    }
}
