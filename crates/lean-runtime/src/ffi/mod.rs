//! Unsafe boundary with the native runtime
//!
//! Everything `unsafe` in the crate lives in this module family, behind safe
//! wrappers:
//! - Raw ABI declarations and the function-pointer table (`raw`)
//! - Dynamic symbol resolution (`loader`)
//! - Owning resource handles with exactly-once deallocation (`handle`)
//! - The partial-call protocol adapters (`call`)
//! - The raw-to-owned value marshaling registry (`marshal`)

pub mod call;
pub mod handle;
pub mod loader;
pub mod marshal;
pub mod raw;

pub use call::{call, call_optional, try_call};
pub use handle::Handle;
pub use loader::LoadError;
pub use marshal::FromNative;
pub use raw::{lean_bool, NativeApi, RawEnv, RawException, RawIos, RawOptions};
