//! Purpose: Define the public Rust API boundary for tranutil.
//! Exports: Notifier, delivery log, sample conversion, and error types.
//! Role: Public, additive-only surface used by the CLI and embedding callers.
//! Invariants: Callers reach core modules only through these re-exports.

mod delivery_log;
mod notifier;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::samples::{BYTES_PER_SAMPLE, convert, convert_strict, samples_to_bytes};
pub use delivery_log::{DeliveryLog, TracingLog, error_causes};
pub use notifier::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT, Delivery, JsonNotifier,
    NotifierConfig, post_json,
};
