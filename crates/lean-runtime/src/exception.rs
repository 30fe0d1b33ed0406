//! Exception values: native failures as data
//!
//! An [`Exception`] captures either a binding-generated error (kind plus
//! message) or an owned native exception object. The kind code is validated
//! eagerly at construction, so [`Exception::kind`] never fails; message
//! rendering stays lazy. Pretty-printing requires an environment and options
//! snapshot and a freshly allocated buffered IO state, can itself fail, and
//! is therefore never attempted automatically — `Display` always shows the
//! raw message.

use crate::env::Environment;
use crate::ffi::call;
use crate::ffi::handle::Handle;
use crate::ffi::raw::{kind_code, RawException};
use crate::ios::IoState;
use crate::options::Options;
use crate::runtime::Runtime;
use crate::{LeanError, LeanResult};
use std::os::raw::c_int;
use std::sync::Arc;

/// Classification of a native exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    /// Generic runtime failure inside the native library.
    System,
    /// The native library ran out of memory.
    OutOfMemory,
    /// The native library's interrupt mechanism fired.
    Interrupted,
    /// The kernel rejected a declaration or term.
    Kernel,
    /// A parse error.
    Parser,
    /// Anything the native library does not classify further.
    Other,
}

impl ExceptionKind {
    /// Map a native kind code to a kind.
    ///
    /// Code 0 is the native "null exception" marker; it and any unrecognized
    /// code are reported as [`LeanError::UnknownExceptionKind`], never
    /// silently defaulted.
    pub fn from_code(code: c_int) -> LeanResult<Self> {
        match code {
            kind_code::SYSTEM => Ok(Self::System),
            kind_code::OUT_OF_MEMORY => Ok(Self::OutOfMemory),
            kind_code::INTERRUPTED => Ok(Self::Interrupted),
            kind_code::KERNEL => Ok(Self::Kernel),
            kind_code::PARSER => Ok(Self::Parser),
            kind_code::OTHER => Ok(Self::Other),
            _ => Err(LeanError::UnknownExceptionKind(code)),
        }
    }

    /// The native code for this kind.
    pub fn code(self) -> c_int {
        match self {
            Self::System => kind_code::SYSTEM,
            Self::OutOfMemory => kind_code::OUT_OF_MEMORY,
            Self::Interrupted => kind_code::INTERRUPTED,
            Self::Kernel => kind_code::KERNEL,
            Self::Parser => kind_code::PARSER,
            Self::Other => kind_code::OTHER,
        }
    }
}

impl std::fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::System => "system exception",
            Self::OutOfMemory => "out of memory",
            Self::Interrupted => "interrupted",
            Self::Kernel => "kernel exception",
            Self::Parser => "parser exception",
            Self::Other => "exception",
        };
        f.write_str(name)
    }
}

/// Optional pretty-printing context captured at construction time.
struct PrettyContext {
    env: Environment,
    options: Options,
}

enum Repr {
    /// Failure generated inside the binding itself.
    Binding { message: String },
    /// Owned native exception object.
    Native {
        handle: Handle<RawException>,
        rt: Arc<Runtime>,
        context: Option<PrettyContext>,
    },
}

/// A failure reported across the native boundary, held as a value.
pub struct Exception {
    kind: ExceptionKind,
    repr: Repr,
}

impl Exception {
    /// Construct a binding-internal exception.
    pub fn binding(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            repr: Repr::Binding {
                message: message.into(),
            },
        }
    }

    /// Take ownership of a native exception pointer.
    ///
    /// Validates the kind code immediately; an unrecognized code is an error
    /// (the object is still released).
    ///
    /// # Safety
    ///
    /// `raw` must be a live native exception written through an exception
    /// out-slot, with ownership transferred to this call.
    pub unsafe fn from_native(rt: &Arc<Runtime>, raw: *mut RawException) -> LeanResult<Self> {
        let handle = Handle::acquire(raw, rt.api().exception_del, "exception")?;
        Self::from_native_handle(rt, handle)
    }

    /// As [`Exception::from_native`], attaching an environment and options
    /// snapshot for later pretty-printing.
    ///
    /// # Safety
    ///
    /// Same contract as [`Exception::from_native`].
    pub unsafe fn from_native_with_context(
        rt: &Arc<Runtime>,
        raw: *mut RawException,
        env: Environment,
        options: Options,
    ) -> LeanResult<Self> {
        let mut exception = Self::from_native(rt, raw)?;
        if let Repr::Native { context, .. } = &mut exception.repr {
            *context = Some(PrettyContext { env, options });
        }
        Ok(exception)
    }

    pub(crate) fn from_native_handle(
        rt: &Arc<Runtime>,
        handle: Handle<RawException>,
    ) -> LeanResult<Self> {
        let code = handle.with_raw(|raw| unsafe { (rt.api().exception_get_kind)(raw) });
        let kind = ExceptionKind::from_code(code)?;
        Ok(Self {
            kind,
            repr: Repr::Native {
                handle,
                rt: rt.clone(),
                context: None,
            },
        })
    }

    /// The exception's kind. Never fails: the code was validated at
    /// construction.
    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    /// The captured pretty-printing context, if one was attached.
    pub fn context(&self) -> Option<(&Environment, &Options)> {
        match &self.repr {
            Repr::Native {
                context: Some(ctx), ..
            } => Some((&ctx.env, &ctx.options)),
            _ => None,
        }
    }

    /// The raw (un-pretty-printed) message. Cheap; never fails.
    pub fn raw_message(&self) -> String {
        match &self.repr {
            Repr::Binding { message } => message.clone(),
            Repr::Native { handle, rt, .. } => handle
                .with_raw(|raw| {
                    call::call::<String>(rt, "exception_get_message", |out, ex| unsafe {
                        (rt.api().exception_get_message)(raw, out, ex)
                    })
                })
                .unwrap_or_else(|_| format!("<{} with unrenderable message>", self.kind)),
        }
    }

    /// Render the message through the native pretty printer.
    ///
    /// Allocates a buffered IO state for the duration of the call. The
    /// native pretty printer may itself fail; that nested failure surfaces
    /// here as an error.
    pub fn try_pretty_message(&self, env: &Environment, options: &Options) -> LeanResult<String> {
        let (handle, rt) = match &self.repr {
            // Binding exceptions have no native object to render.
            Repr::Binding { message } => return Ok(message.clone()),
            Repr::Native { handle, rt, .. } => (handle, rt),
        };
        let ios = IoState::buffered(rt, options)?;
        handle.with_raw(|exc_raw| {
            env.with_raw(|env_raw| {
                ios.with_raw(|ios_raw| {
                    options.with_raw(|opts_raw| {
                        call::call::<String>(rt, "exception_to_pp_string", |out, ex| unsafe {
                            (rt.api().exception_to_pp_string)(
                                env_raw, ios_raw, opts_raw, exc_raw, out, ex,
                            )
                        })
                    })
                })
            })
        })
    }

    /// As [`Exception::try_pretty_message`], falling back to
    /// [`Exception::raw_message`] when pretty-printing fails.
    pub fn pretty_message(&self, env: &Environment, options: &Options) -> String {
        self.try_pretty_message(env, options)
            .unwrap_or_else(|_| self.raw_message())
    }
}

impl std::fmt::Display for Exception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.raw_message())
    }
}

impl std::fmt::Debug for Exception {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exception")
            .field("kind", &self.kind)
            .field("message", &self.raw_message())
            .finish()
    }
}

impl std::error::Error for Exception {}
