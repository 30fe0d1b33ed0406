//! In-process reference backend
//!
//! Implements the complete native ABI contract in Rust: every symbol family
//! the binding consumes — constructors, setters, soft-failure getters, pure
//! predicates, deleters, to-string functions — with the same out-parameter
//! and exception-slot conventions as the real prover runtime. Object
//! lifecycles use `Box::into_raw`/`Box::from_raw`; out-strings use
//! `CString::into_raw`, paired with the backend's string deleter.
//!
//! [`Runtime::hosted`](crate::Runtime::hosted) exposes this backend, which
//! lets the whole binding (and its tests) run without the prover installed.
//! The options semantics match the native store where it matters to callers:
//! persistent copies on set, second argument wins on join, getters report
//! soft absence for unset (or differently-typed) keys, equality is
//! order-insensitive structural comparison.

use crate::ffi::raw::{
    kind_code, lean_bool, NativeApi, RawEnv, RawException, RawIos, RawOptions,
};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int, c_uint};
use std::ptr;

#[derive(Clone, PartialEq)]
enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Double(f64),
    Str(String),
}

impl Value {
    fn render(&self) -> String {
        match self {
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Str(v) => format!("{v:?}"),
        }
    }
}

/// Insertion-ordered key/value entries; keys are unique (set replaces in
/// place, preserving position, which keeps the display rendering stable
/// across no-op rebinds).
#[derive(Clone, Default)]
struct OptionsData {
    entries: Vec<(String, Value)>,
}

impl OptionsData {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    fn bind(&mut self, name: String, value: Value) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    fn render(&self) -> String {
        let body: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| format!("{} := {}", key, value.render()))
            .collect();
        format!("({})", body.join(", "))
    }
}

struct ExceptionData {
    kind: c_int,
    message: String,
}

struct EnvData {
    #[allow(dead_code)]
    trust_level: u32,
}

#[derive(Default)]
struct IosData {
    regular: String,
    diagnostic: String,
}

// Pointer plumbing between the opaque ABI types and the backing structs.

fn export_options(data: OptionsData) -> *mut RawOptions {
    Box::into_raw(Box::new(data)) as *mut RawOptions
}

unsafe fn options_data<'a>(raw: *mut RawOptions) -> &'a OptionsData {
    &*(raw as *const OptionsData)
}

fn export_string(text: &str) -> *const c_char {
    match CString::new(text) {
        Ok(owned) => owned.into_raw() as *const c_char,
        Err(_) => ptr::null(),
    }
}

/// Allocate a native exception object. Public so tests (and stubs for
/// higher layers) can produce failures through the real exception path.
pub fn mk_exception(kind: c_int, message: &str) -> *mut RawException {
    Box::into_raw(Box::new(ExceptionData {
        kind,
        message: message.to_owned(),
    })) as *mut RawException
}

/// Write an exception through an out-slot and report failure.
unsafe fn raise(slot: *mut *mut RawException, kind: c_int, message: &str) -> lean_bool {
    if !slot.is_null() {
        *slot = mk_exception(kind, message);
    }
    0
}

/// Read an option name; `None` means the key cannot exist in the store.
unsafe fn read_name(name: *const c_char) -> Option<String> {
    if name.is_null() {
        return None;
    }
    CStr::from_ptr(name).to_str().ok().map(str::to_owned)
}

fn kind_name(kind: c_int) -> &'static str {
    match kind {
        kind_code::SYSTEM => "system exception",
        kind_code::OUT_OF_MEMORY => "out of memory",
        kind_code::INTERRUPTED => "interrupted",
        kind_code::KERNEL => "kernel exception",
        kind_code::PARSER => "parser exception",
        _ => "exception",
    }
}

// Exceptions

unsafe extern "C" fn exception_del(raw: *mut RawException) {
    drop(Box::from_raw(raw as *mut ExceptionData));
}

unsafe extern "C" fn exception_get_kind(raw: *mut RawException) -> c_int {
    (*(raw as *const ExceptionData)).kind
}

unsafe extern "C" fn exception_get_message(
    raw: *mut RawException,
    out: *mut *const c_char,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = export_string(&(*(raw as *const ExceptionData)).message);
    1
}

unsafe extern "C" fn exception_to_pp_string(
    env: *mut RawEnv,
    ios: *mut RawIos,
    _options: *mut RawOptions,
    raw: *mut RawException,
    out: *mut *const c_char,
    exception: *mut *mut RawException,
) -> lean_bool {
    if env.is_null() || ios.is_null() {
        return raise(
            exception,
            kind_code::SYSTEM,
            "pretty printer requires an environment and io state",
        );
    }
    let data = &*(raw as *const ExceptionData);
    let rendered = format!("{}: {}", kind_name(data.kind), data.message);
    let sinks = &mut *(ios as *mut IosData);
    sinks.regular.push_str(&rendered);
    sinks.regular.push('\n');
    *out = export_string(&rendered);
    1
}

// Options

unsafe extern "C" fn options_mk_empty(
    out: *mut *mut RawOptions,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = export_options(OptionsData::default());
    1
}

unsafe fn options_bind(
    raw: *mut RawOptions,
    name: *const c_char,
    value: Value,
    out: *mut *mut RawOptions,
    exception: *mut *mut RawException,
) -> lean_bool {
    let Some(name) = read_name(name) else {
        return raise(exception, kind_code::OTHER, "invalid option name");
    };
    let mut data = options_data(raw).clone();
    data.bind(name, value);
    *out = export_options(data);
    1
}

unsafe extern "C" fn options_set_bool(
    raw: *mut RawOptions,
    name: *const c_char,
    value: lean_bool,
    out: *mut *mut RawOptions,
    exception: *mut *mut RawException,
) -> lean_bool {
    options_bind(raw, name, Value::Bool(value != 0), out, exception)
}

unsafe extern "C" fn options_set_int(
    raw: *mut RawOptions,
    name: *const c_char,
    value: c_int,
    out: *mut *mut RawOptions,
    exception: *mut *mut RawException,
) -> lean_bool {
    options_bind(raw, name, Value::Int(value), out, exception)
}

unsafe extern "C" fn options_set_uint(
    raw: *mut RawOptions,
    name: *const c_char,
    value: c_uint,
    out: *mut *mut RawOptions,
    exception: *mut *mut RawException,
) -> lean_bool {
    options_bind(raw, name, Value::UInt(value), out, exception)
}

unsafe extern "C" fn options_set_double(
    raw: *mut RawOptions,
    name: *const c_char,
    value: c_double,
    out: *mut *mut RawOptions,
    exception: *mut *mut RawException,
) -> lean_bool {
    options_bind(raw, name, Value::Double(value), out, exception)
}

unsafe extern "C" fn options_set_string(
    raw: *mut RawOptions,
    name: *const c_char,
    value: *const c_char,
    out: *mut *mut RawOptions,
    exception: *mut *mut RawException,
) -> lean_bool {
    let Some(value) = read_name(value) else {
        return raise(exception, kind_code::OTHER, "invalid option value");
    };
    options_bind(raw, name, Value::Str(value), out, exception)
}

/// Soft-failure lookup: absent keys and type mismatches report "no value,
/// no error" by returning false with the exception slot untouched.
unsafe fn lookup<'a>(raw: *mut RawOptions, name: *const c_char) -> Option<&'a Value> {
    let name = read_name(name)?;
    let data = options_data(raw);
    match data.lookup(&name) {
        Some(value) => {
            // Tie the borrow back to the raw object, not the local name.
            let value = value as *const Value;
            Some(&*value)
        }
        None => None,
    }
}

unsafe extern "C" fn options_get_bool(
    raw: *mut RawOptions,
    name: *const c_char,
    out: *mut lean_bool,
    _exception: *mut *mut RawException,
) -> lean_bool {
    match lookup(raw, name) {
        Some(Value::Bool(value)) => {
            *out = if *value { 1 } else { 0 };
            1
        }
        _ => 0,
    }
}

unsafe extern "C" fn options_get_int(
    raw: *mut RawOptions,
    name: *const c_char,
    out: *mut c_int,
    _exception: *mut *mut RawException,
) -> lean_bool {
    match lookup(raw, name) {
        Some(Value::Int(value)) => {
            *out = *value;
            1
        }
        _ => 0,
    }
}

unsafe extern "C" fn options_get_uint(
    raw: *mut RawOptions,
    name: *const c_char,
    out: *mut c_uint,
    _exception: *mut *mut RawException,
) -> lean_bool {
    match lookup(raw, name) {
        Some(Value::UInt(value)) => {
            *out = *value;
            1
        }
        _ => 0,
    }
}

unsafe extern "C" fn options_get_double(
    raw: *mut RawOptions,
    name: *const c_char,
    out: *mut c_double,
    _exception: *mut *mut RawException,
) -> lean_bool {
    match lookup(raw, name) {
        Some(Value::Double(value)) => {
            *out = *value;
            1
        }
        _ => 0,
    }
}

unsafe extern "C" fn options_get_string(
    raw: *mut RawOptions,
    name: *const c_char,
    out: *mut *const c_char,
    _exception: *mut *mut RawException,
) -> lean_bool {
    match lookup(raw, name) {
        Some(Value::Str(value)) => {
            *out = export_string(value);
            1
        }
        _ => 0,
    }
}

unsafe extern "C" fn options_contains(raw: *mut RawOptions, name: *const c_char) -> lean_bool {
    lookup(raw, name).is_some() as lean_bool
}

unsafe extern "C" fn options_eq(a: *mut RawOptions, b: *mut RawOptions) -> lean_bool {
    let a = options_data(a);
    let b = options_data(b);
    let equal = a.entries.len() == b.entries.len()
        && a.entries
            .iter()
            .all(|(key, value)| b.lookup(key) == Some(value));
    equal as lean_bool
}

unsafe extern "C" fn options_join(
    a: *mut RawOptions,
    b: *mut RawOptions,
    out: *mut *mut RawOptions,
    _exception: *mut *mut RawException,
) -> lean_bool {
    let mut merged = options_data(a).clone();
    for (key, value) in &options_data(b).entries {
        merged.bind(key.clone(), value.clone());
    }
    *out = export_options(merged);
    1
}

unsafe extern "C" fn options_to_string(
    raw: *mut RawOptions,
    out: *mut *const c_char,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = export_string(&options_data(raw).render());
    1
}

unsafe extern "C" fn options_del(raw: *mut RawOptions) {
    drop(Box::from_raw(raw as *mut OptionsData));
}

// Environments

unsafe extern "C" fn env_mk_std(
    trust_level: c_uint,
    out: *mut *mut RawEnv,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = Box::into_raw(Box::new(EnvData { trust_level })) as *mut RawEnv;
    1
}

unsafe extern "C" fn env_del(raw: *mut RawEnv) {
    drop(Box::from_raw(raw as *mut EnvData));
}

// IO states

unsafe extern "C" fn ios_mk_buffered(
    _options: *mut RawOptions,
    out: *mut *mut RawIos,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = Box::into_raw(Box::new(IosData::default())) as *mut RawIos;
    1
}

unsafe extern "C" fn ios_get_regular(
    raw: *mut RawIos,
    out: *mut *const c_char,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = export_string(&(*(raw as *const IosData)).regular);
    1
}

unsafe extern "C" fn ios_get_diagnostic(
    raw: *mut RawIos,
    out: *mut *const c_char,
    _exception: *mut *mut RawException,
) -> lean_bool {
    *out = export_string(&(*(raw as *const IosData)).diagnostic);
    1
}

unsafe extern "C" fn ios_del(raw: *mut RawIos) {
    drop(Box::from_raw(raw as *mut IosData));
}

// Strings

unsafe extern "C" fn string_del(raw: *const c_char) {
    if !raw.is_null() {
        drop(CString::from_raw(raw as *mut c_char));
    }
}

/// The backend's function table.
pub fn api() -> NativeApi {
    NativeApi {
        exception_del,
        exception_get_kind,
        exception_get_message,
        exception_to_pp_string,

        options_mk_empty,
        options_set_bool,
        options_set_int,
        options_set_uint,
        options_set_double,
        options_set_string,
        options_get_bool,
        options_get_int,
        options_get_uint,
        options_get_double,
        options_get_string,
        options_contains,
        options_eq,
        options_join,
        options_to_string,
        options_del,

        env_mk_std,
        env_del,

        ios_mk_buffered,
        ios_get_regular,
        ios_get_diagnostic,
        ios_del,

        string_del,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_set_get_roundtrip() {
        unsafe {
            let mut empty: *mut RawOptions = ptr::null_mut();
            let mut exception: *mut RawException = ptr::null_mut();
            assert_eq!(options_mk_empty(&mut empty, &mut exception), 1);

            let name = CString::new("pp.width").unwrap();
            let mut updated: *mut RawOptions = ptr::null_mut();
            assert_eq!(
                options_set_int(empty, name.as_ptr(), 120, &mut updated, &mut exception),
                1
            );

            let mut value: c_int = 0;
            assert_eq!(
                options_get_int(updated, name.as_ptr(), &mut value, &mut exception),
                1
            );
            assert_eq!(value, 120);

            // Original is untouched: soft absence.
            assert_eq!(
                options_get_int(empty, name.as_ptr(), &mut value, &mut exception),
                0
            );
            assert!(exception.is_null());

            options_del(empty);
            options_del(updated);
        }
    }

    #[test]
    fn test_type_mismatch_is_soft_absence() {
        unsafe {
            let mut empty: *mut RawOptions = ptr::null_mut();
            let mut exception: *mut RawException = ptr::null_mut();
            options_mk_empty(&mut empty, &mut exception);

            let name = CString::new("pp.compact").unwrap();
            let mut updated: *mut RawOptions = ptr::null_mut();
            options_set_bool(empty, name.as_ptr(), 1, &mut updated, &mut exception);

            let mut value: c_int = 0;
            assert_eq!(
                options_get_int(updated, name.as_ptr(), &mut value, &mut exception),
                0
            );
            assert!(exception.is_null());

            options_del(empty);
            options_del(updated);
        }
    }

    #[test]
    fn test_string_del_pairs_with_export() {
        unsafe {
            let exported = export_string("rendered text");
            assert!(!exported.is_null());
            assert_eq!(CStr::from_ptr(exported).to_str().unwrap(), "rendered text");
            string_del(exported);
        }
    }
}
