//! Dynamic resolution of the native runtime's exported symbols
//!
//! Uses `libloading` to map the prover's shared library and populate a
//! [`NativeApi`] table, with platform-specific library naming and search
//! paths. A missing symbol fails the whole load: a partially usable table
//! would push the failure to an arbitrary later call site.

use crate::ffi::raw::NativeApi;
use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Library loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("native runtime library not found: {0}")]
    LibraryNotFound(String),

    #[error("failed to load native runtime '{library}': {message}")]
    LoadFailed { library: String, message: String },

    #[error("symbol '{symbol}' not exported by the native runtime")]
    SymbolNotFound { symbol: String },
}

/// Platform library search paths, most specific first.
///
/// `LEAN_LIB_DIR` (if set) and the current working directory are searched
/// before the system paths.
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(dir) = std::env::var("LEAN_LIB_DIR") {
        paths.push(PathBuf::from(dir));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/lib"));
        if cfg!(target_pointer_width = "64") {
            paths.push(PathBuf::from("/usr/lib64"));
            paths.push(PathBuf::from("/lib64"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/opt/homebrew/lib"));
    }

    #[cfg(target_os = "windows")]
    {
        paths.push(PathBuf::from("C:\\Windows\\System32"));
        if let Ok(system_root) = std::env::var("SystemRoot") {
            paths.push(PathBuf::from(format!("{}\\System32", system_root)));
        }
    }

    paths
}

/// Resolve a library name to a full path using platform naming conventions
/// (`lib{name}.so`, `lib{name}.dylib`, `{name}.dll`). An absolute path that
/// exists is used as-is.
pub(crate) fn resolve_library_path(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() && direct.exists() {
        return Some(direct.to_path_buf());
    }

    let extensions: &[&str] = if cfg!(target_os = "windows") {
        &["dll"]
    } else if cfg!(target_os = "macos") {
        &["dylib", "so"]
    } else {
        &["so"]
    };
    let prefixes: &[&str] = if cfg!(target_os = "windows") {
        &["", "lib"]
    } else {
        &["lib", ""]
    };

    for search_path in default_search_paths() {
        for prefix in prefixes {
            for extension in extensions {
                let candidate = search_path.join(format!("{prefix}{name}.{extension}"));
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

/// Copy one typed function pointer out of the library.
///
/// # Safety
///
/// `T` must be the exact function-pointer type of the exported symbol.
unsafe fn resolve<T: Copy>(library: &Library, symbol: &str) -> Result<T, LoadError> {
    let resolved: Symbol<'_, T> =
        library
            .get(symbol.as_bytes())
            .map_err(|_| LoadError::SymbolNotFound {
                symbol: symbol.to_owned(),
            })?;
    Ok(*resolved)
}

/// Populate the full [`NativeApi`] table from a mapped library.
///
/// # Safety
///
/// The library must be the native prover runtime: each `lean_*` symbol must
/// have the signature declared in [`NativeApi`], and the library must stay
/// mapped for as long as the table is used.
pub(crate) unsafe fn api_from_library(library: &Library) -> Result<NativeApi, LoadError> {
    Ok(NativeApi {
        exception_del: resolve(library, "lean_exception_del")?,
        exception_get_kind: resolve(library, "lean_exception_get_kind")?,
        exception_get_message: resolve(library, "lean_exception_get_message")?,
        exception_to_pp_string: resolve(library, "lean_exception_to_pp_string")?,

        options_mk_empty: resolve(library, "lean_options_mk_empty")?,
        options_set_bool: resolve(library, "lean_options_set_bool")?,
        options_set_int: resolve(library, "lean_options_set_int")?,
        options_set_uint: resolve(library, "lean_options_set_unsigned")?,
        options_set_double: resolve(library, "lean_options_set_double")?,
        options_set_string: resolve(library, "lean_options_set_string")?,
        options_get_bool: resolve(library, "lean_options_get_bool")?,
        options_get_int: resolve(library, "lean_options_get_int")?,
        options_get_uint: resolve(library, "lean_options_get_unsigned")?,
        options_get_double: resolve(library, "lean_options_get_double")?,
        options_get_string: resolve(library, "lean_options_get_string")?,
        options_contains: resolve(library, "lean_options_contains")?,
        options_eq: resolve(library, "lean_options_eq")?,
        options_join: resolve(library, "lean_options_join")?,
        options_to_string: resolve(library, "lean_options_to_string")?,
        options_del: resolve(library, "lean_options_del")?,

        env_mk_std: resolve(library, "lean_env_mk_std")?,
        env_del: resolve(library, "lean_env_del")?,

        ios_mk_buffered: resolve(library, "lean_ios_mk_buffered")?,
        ios_get_regular: resolve(library, "lean_ios_get_regular")?,
        ios_get_diagnostic: resolve(library, "lean_ios_get_diagnostic")?,
        ios_del: resolve(library, "lean_ios_del")?,

        string_del: resolve(library, "lean_string_del")?,
    })
}
