//! Crate-local error types for dynamic library loading.
//!
//! These cover the loader plumbing underneath device creation; once a device
//! exists, failures are reported through the common `InitError`/`FrameError`
//! enums.

use thiserror::Error;

/// Errors that can occur when loading libvdpau or libX11.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("shared library not found: {0}")]
    LibraryNotFound(String),

    #[error("required symbol not found: {0}")]
    SymbolNotFound(String),
}
