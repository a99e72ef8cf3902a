//! Purpose: Library crate backing the `tranutil` CLI and embedding callers.
//! Exports: `api` (JSON notifier, sample conversion, errors).
//! Role: Transcription-side glue: deliver result documents, decode captured PCM.
//! Invariants: Both operations are stateless; nothing persists across calls.
pub mod api;
mod core;
