//! Raw C ABI surface of the native Lean runtime
//!
//! Declares the opaque native object types, the exception kind codes, and the
//! `NativeApi` function-pointer table that everything above this module calls
//! through. No function here is ever invoked directly; the table is populated
//! either from a shared library (`ffi::loader`) or by the in-process hosted
//! backend (`crate::hosted`).
//!
//! # Calling convention
//!
//! Fallible native calls return a `lean_bool` (C `int`, nonzero = success) and
//! write their results through out-parameters. On failure an exception object
//! is written through the trailing `*mut *mut RawException` slot — except for
//! the soft-failure getters, which may leave the slot null to mean "no value,
//! no error". See `ffi::call` for the adapters that enforce this contract.

use std::os::raw::{c_char, c_double, c_int, c_uint};

/// Native boolean: a C `int`, nonzero meaning true.
#[allow(non_camel_case_types)]
pub type lean_bool = c_int;

/// Opaque native options object (persistent key/value store).
#[repr(C)]
pub struct RawOptions {
    _opaque: [u8; 0],
}

/// Opaque native exception object.
#[repr(C)]
pub struct RawException {
    _opaque: [u8; 0],
}

/// Opaque native environment object.
#[repr(C)]
pub struct RawEnv {
    _opaque: [u8; 0],
}

/// Opaque native IO state object (pair of buffered output sinks).
#[repr(C)]
pub struct RawIos {
    _opaque: [u8; 0],
}

/// Exception kind codes as reported by `exception_get_kind`.
///
/// Code 0 is the native library's "null exception" marker and is never a
/// valid kind for a reported exception; see `ExceptionKind::from_code`.
pub mod kind_code {
    use std::os::raw::c_int;

    pub const NULL: c_int = 0;
    pub const SYSTEM: c_int = 1;
    pub const OUT_OF_MEMORY: c_int = 2;
    pub const INTERRUPTED: c_int = 3;
    pub const KERNEL: c_int = 4;
    pub const PARSER: c_int = 5;
    pub const OTHER: c_int = 6;
}

/// Function-pointer table over the native runtime's exported symbols.
///
/// One field per symbol the binding consumes, grouped by object family. Each
/// signature follows one of the boundary shapes: constructor-class,
/// setter-class, getter-class (soft failure), pure predicate, deleter, or
/// to-string. Strings written through `*mut *const c_char` out-parameters are
/// owned by the native library and must be copied and then released with
/// `string_del`.
///
/// # Safety
///
/// Every pointer must reference a function with exactly the declared
/// signature and ABI. Populating the table is `unsafe`; all calls through it
/// go via the `ffi::call` adapters.
#[derive(Clone, Copy)]
pub struct NativeApi {
    // Exceptions
    pub exception_del: unsafe extern "C" fn(*mut RawException),
    /// Pure predicate class: reads the kind code, no side effects.
    pub exception_get_kind: unsafe extern "C" fn(*mut RawException) -> c_int,
    pub exception_get_message: unsafe extern "C" fn(
        *mut RawException,
        *mut *const c_char,
        *mut *mut RawException,
    ) -> lean_bool,
    /// Renders the exception through an IO state with an environment and
    /// options snapshot as pretty-printing context.
    pub exception_to_pp_string: unsafe extern "C" fn(
        *mut RawEnv,
        *mut RawIos,
        *mut RawOptions,
        *mut RawException,
        *mut *const c_char,
        *mut *mut RawException,
    ) -> lean_bool,

    // Options
    pub options_mk_empty:
        unsafe extern "C" fn(*mut *mut RawOptions, *mut *mut RawException) -> lean_bool,
    pub options_set_bool: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        lean_bool,
        *mut *mut RawOptions,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_set_int: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        c_int,
        *mut *mut RawOptions,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_set_uint: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        c_uint,
        *mut *mut RawOptions,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_set_double: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        c_double,
        *mut *mut RawOptions,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_set_string: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        *const c_char,
        *mut *mut RawOptions,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_get_bool: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        *mut lean_bool,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_get_int: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        *mut c_int,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_get_uint: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        *mut c_uint,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_get_double: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        *mut c_double,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_get_string: unsafe extern "C" fn(
        *mut RawOptions,
        *const c_char,
        *mut *const c_char,
        *mut *mut RawException,
    ) -> lean_bool,
    /// Pure predicate class: key membership, no side effects.
    pub options_contains: unsafe extern "C" fn(*mut RawOptions, *const c_char) -> lean_bool,
    /// Pure predicate class: structural key/value equality.
    pub options_eq: unsafe extern "C" fn(*mut RawOptions, *mut RawOptions) -> lean_bool,
    pub options_join: unsafe extern "C" fn(
        *mut RawOptions,
        *mut RawOptions,
        *mut *mut RawOptions,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_to_string: unsafe extern "C" fn(
        *mut RawOptions,
        *mut *const c_char,
        *mut *mut RawException,
    ) -> lean_bool,
    pub options_del: unsafe extern "C" fn(*mut RawOptions),

    // Environments
    pub env_mk_std:
        unsafe extern "C" fn(c_uint, *mut *mut RawEnv, *mut *mut RawException) -> lean_bool,
    pub env_del: unsafe extern "C" fn(*mut RawEnv),

    // IO states (buffered variant)
    pub ios_mk_buffered:
        unsafe extern "C" fn(*mut RawOptions, *mut *mut RawIos, *mut *mut RawException) -> lean_bool,
    pub ios_get_regular:
        unsafe extern "C" fn(*mut RawIos, *mut *const c_char, *mut *mut RawException) -> lean_bool,
    pub ios_get_diagnostic:
        unsafe extern "C" fn(*mut RawIos, *mut *const c_char, *mut *mut RawException) -> lean_bool,
    pub ios_del: unsafe extern "C" fn(*mut RawIos),

    // Native-owned strings returned through out-parameters
    pub string_del: unsafe extern "C" fn(*const c_char),
}
