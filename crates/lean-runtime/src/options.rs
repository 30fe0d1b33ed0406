//! Immutable, structurally shared configuration options
//!
//! An [`Options`] value maps dotted names (`"pp.compact"`) to booleans,
//! 32-bit signed or unsigned integers, doubles, or strings. Every mutation
//! produces a new value; the input is never touched, because the native
//! store may share structure internally. `Clone` is cheap (shared handle),
//! which makes the persistent semantics practical to use.
//!
//! The typed accessors are a thin lens surface over one generic get/set pair
//! dispatched through [`OptionValue`], the closed set of supported value
//! kinds.

use crate::ffi::call;
use crate::ffi::handle::Handle;
use crate::ffi::raw::RawOptions;
use crate::runtime::Runtime;
use crate::{LeanError, LeanResult};
use std::ffi::{CStr, CString};
use std::sync::Arc;

fn option_name(name: &str) -> LeanResult<CString> {
    CString::new(name).map_err(|_| LeanError::InvalidString(name.to_owned()))
}

/// An immutable native options object.
pub struct Options {
    handle: Arc<Handle<RawOptions>>,
    rt: Arc<Runtime>,
}

impl Clone for Options {
    /// Cheap: shares the underlying handle, never the raw pointer ownership.
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            rt: Arc::clone(&self.rt),
        }
    }
}

impl Options {
    /// The empty options value (cached per runtime).
    pub fn empty(rt: &Arc<Runtime>) -> LeanResult<Self> {
        rt.empty_options()
    }

    pub(crate) unsafe fn from_raw(rt: &Arc<Runtime>, raw: *mut RawOptions) -> LeanResult<Self> {
        let handle = Handle::acquire(raw, rt.api().options_del, "options")?;
        Ok(Self {
            handle: Arc::new(handle),
            rt: Arc::clone(rt),
        })
    }

    pub(crate) fn from_shared(rt: &Arc<Runtime>, handle: Arc<Handle<RawOptions>>) -> Self {
        Self {
            handle,
            rt: Arc::clone(rt),
        }
    }

    pub(crate) fn shared_handle(&self) -> &Arc<Handle<RawOptions>> {
        &self.handle
    }

    pub(crate) fn with_raw<R>(&self, f: impl FnOnce(*mut RawOptions) -> R) -> R {
        self.handle.with_raw(f)
    }

    /// The runtime this value belongs to.
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.rt
    }

    /// Whether `name` is bound to any value. Pure; never fails. A name the
    /// native library cannot represent (interior NUL) is simply absent.
    pub fn contains(&self, name: &str) -> bool {
        let Ok(cname) = CString::new(name) else {
            return false;
        };
        let api = self.rt.api();
        self.with_raw(|raw| unsafe { (api.options_contains)(raw, cname.as_ptr()) }) != 0
    }

    /// Look up `name` as a `T`.
    ///
    /// Returns `Ok(None)` when `name` is unset for that value kind (the
    /// soft-failure shape). A genuine native error — corrupt internal state,
    /// out of memory — propagates and should be treated as fatal, not as a
    /// normal control path.
    pub fn get<T: OptionValue>(&self, name: &str) -> LeanResult<Option<T>> {
        let cname = option_name(name)?;
        T::read(self, &cname)
    }

    /// Bind `name` to `value`, returning a new `Options`.
    ///
    /// The receiver is left untouched. When `name` is already bound to
    /// exactly `value`, this may return a clone of the receiver instead of
    /// allocating — semantically still a plain replace.
    pub fn set<T: OptionValue>(&self, name: &str, value: T) -> LeanResult<Options> {
        let cname = option_name(name)?;
        if let Some(current) = T::read(self, &cname)? {
            if current == value {
                return Ok(self.clone());
            }
        }
        T::write(self, &cname, &value)
    }

    /// Merge two options values; `secondary`'s bindings win on collision.
    /// Neither input is mutated.
    pub fn join(&self, secondary: &Options) -> LeanResult<Options> {
        let rt = &self.rt;
        self.with_raw(|a| {
            secondary.with_raw(|b| {
                call::call::<Options>(rt, "options_join", |out, ex| unsafe {
                    (rt.api().options_join)(a, b, out, ex)
                })
            })
        })
    }

    /// Render the options for display.
    pub fn to_display_string(&self) -> LeanResult<String> {
        let rt = &self.rt;
        self.with_raw(|raw| {
            call::call::<String>(rt, "options_to_string", |out, ex| unsafe {
                (rt.api().options_to_string)(raw, out, ex)
            })
        })
    }

    // Typed lens surface; mechanical wrappers over the generic pair.

    pub fn get_bool(&self, name: &str) -> LeanResult<Option<bool>> {
        self.get(name)
    }

    pub fn set_bool(&self, name: &str, value: bool) -> LeanResult<Options> {
        self.set(name, value)
    }

    pub fn get_i32(&self, name: &str) -> LeanResult<Option<i32>> {
        self.get(name)
    }

    pub fn set_i32(&self, name: &str, value: i32) -> LeanResult<Options> {
        self.set(name, value)
    }

    pub fn get_u32(&self, name: &str) -> LeanResult<Option<u32>> {
        self.get(name)
    }

    pub fn set_u32(&self, name: &str, value: u32) -> LeanResult<Options> {
        self.set(name, value)
    }

    pub fn get_f64(&self, name: &str) -> LeanResult<Option<f64>> {
        self.get(name)
    }

    pub fn set_f64(&self, name: &str, value: f64) -> LeanResult<Options> {
        self.set(name, value)
    }

    pub fn get_string(&self, name: &str) -> LeanResult<Option<String>> {
        self.get(name)
    }

    pub fn set_str(&self, name: &str, value: &str) -> LeanResult<Options> {
        self.set(name, value.to_owned())
    }
}

impl PartialEq for Options {
    /// Structural key/value comparison via the native equality predicate.
    fn eq(&self, other: &Self) -> bool {
        let api = self.rt.api();
        self.with_raw(|a| other.with_raw(|b| unsafe { (api.options_eq)(a, b) })) != 0
    }
}

impl Eq for Options {}

impl std::fmt::Display for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self.to_display_string().map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_display_string() {
            Ok(text) => write!(f, "Options({text})"),
            Err(_) => f.write_str("Options(<unrenderable>)"),
        }
    }
}

/// A value kind the options store supports: `bool`, `i32`, `u32`, `f64`, or
/// `String`. This is a closed set mirroring the native setter/getter symbol
/// families; the methods are plumbing for [`Options::get`]/[`Options::set`].
pub trait OptionValue: Sized + Clone + PartialEq {
    #[doc(hidden)]
    fn read(options: &Options, name: &CStr) -> LeanResult<Option<Self>>;

    #[doc(hidden)]
    fn write(options: &Options, name: &CStr, value: &Self) -> LeanResult<Options>;
}

impl OptionValue for bool {
    fn read(options: &Options, name: &CStr) -> LeanResult<Option<Self>> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call_optional::<bool>(rt, |out, ex| unsafe {
                (rt.api().options_get_bool)(raw, name.as_ptr(), out, ex)
            })
        })
    }

    fn write(options: &Options, name: &CStr, value: &Self) -> LeanResult<Options> {
        let rt = options.runtime();
        let native = if *value { 1 } else { 0 };
        options.with_raw(|raw| {
            call::call::<Options>(rt, "options_set_bool", |out, ex| unsafe {
                (rt.api().options_set_bool)(raw, name.as_ptr(), native, out, ex)
            })
        })
    }
}

impl OptionValue for i32 {
    fn read(options: &Options, name: &CStr) -> LeanResult<Option<Self>> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call_optional::<i32>(rt, |out, ex| unsafe {
                (rt.api().options_get_int)(raw, name.as_ptr(), out, ex)
            })
        })
    }

    fn write(options: &Options, name: &CStr, value: &Self) -> LeanResult<Options> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call::<Options>(rt, "options_set_int", |out, ex| unsafe {
                (rt.api().options_set_int)(raw, name.as_ptr(), *value, out, ex)
            })
        })
    }
}

impl OptionValue for u32 {
    fn read(options: &Options, name: &CStr) -> LeanResult<Option<Self>> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call_optional::<u32>(rt, |out, ex| unsafe {
                (rt.api().options_get_uint)(raw, name.as_ptr(), out, ex)
            })
        })
    }

    fn write(options: &Options, name: &CStr, value: &Self) -> LeanResult<Options> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call::<Options>(rt, "options_set_uint", |out, ex| unsafe {
                (rt.api().options_set_uint)(raw, name.as_ptr(), *value, out, ex)
            })
        })
    }
}

impl OptionValue for f64 {
    fn read(options: &Options, name: &CStr) -> LeanResult<Option<Self>> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call_optional::<f64>(rt, |out, ex| unsafe {
                (rt.api().options_get_double)(raw, name.as_ptr(), out, ex)
            })
        })
    }

    fn write(options: &Options, name: &CStr, value: &Self) -> LeanResult<Options> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call::<Options>(rt, "options_set_double", |out, ex| unsafe {
                (rt.api().options_set_double)(raw, name.as_ptr(), *value, out, ex)
            })
        })
    }
}

impl OptionValue for String {
    fn read(options: &Options, name: &CStr) -> LeanResult<Option<Self>> {
        let rt = options.runtime();
        options.with_raw(|raw| {
            call::call_optional::<String>(rt, |out, ex| unsafe {
                (rt.api().options_get_string)(raw, name.as_ptr(), out, ex)
            })
        })
    }

    fn write(options: &Options, name: &CStr, value: &Self) -> LeanResult<Options> {
        let rt = options.runtime();
        let cvalue = CString::new(value.as_str())
            .map_err(|_| LeanError::InvalidString(value.clone()))?;
        options.with_raw(|raw| {
            call::call::<Options>(rt, "options_set_string", |out, ex| unsafe {
                (rt.api().options_set_string)(raw, name.as_ptr(), cvalue.as_ptr(), out, ex)
            })
        })
    }
}
