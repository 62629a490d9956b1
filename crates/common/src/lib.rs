//! `vf-common` — Shared types, errors, and configuration for the VDPAU
//! frame pipeline.
//!
//! This crate is the foundation the acceleration crates depend on:
//!
//! - **Types**: `Resolution` (newtype for safety)
//! - **Color**: `PixelFormat`, `ChromaType` (negotiated surface layouts)
//! - **Frame**: `VideoFrame` (host-memory planar frame with derived pitches)
//! - **Errors**: `FilterError`, `InitError`, `FrameError` (thiserror-based)
//! - **Config**: `PipelineConfig` (device-open inputs)

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod types;

// Re-export commonly used items at crate root
pub use color::{ChromaType, PixelFormat};
pub use config::PipelineConfig;
pub use error::{FilterError, FilterResult, FrameError, InitError};
pub use frame::VideoFrame;
pub use types::Resolution;
