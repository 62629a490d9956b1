//! `vf-vdpau` — VDPAU surface lifecycle and capability-negotiation core.
//!
//! Moves decoded video frames into and out of the VDPAU acceleration
//! subsystem for hardware-assisted processing before they continue through
//! the software graph. The library is loaded dynamically at runtime, so the
//! host can degrade gracefully when no driver is present.
//!
//! # Module Structure
//!
//! - [`ffi`] — Raw ABI surface: handles, status codes, wire constants,
//!   function-pointer aliases, and the `libloading` wrappers.
//! - [`caps`] — The fixed operation catalog and the per-device resolver
//!   producing a [`caps::CapabilityTable`].
//! - [`x11`] / [`device`] — Display connection and the owning
//!   [`device::DeviceContext`].
//! - [`format`] — Surface format negotiation.
//! - [`pool`] — The bounded frame lookahead window.
//! - [`surface`] / [`mixer`] — Owned GPU object guards.
//! - [`pipeline`] — The per-frame conversion driver and host-facing API.
//! - [`mock`] — In-process software device used by the test suite.
//!
//! # Architecture
//!
//! One stream runs through one [`pipeline::VdpauPipeline`]:
//!
//! 1. Open a device context (once per stream) — this loads the libraries,
//!    connects to the display, and resolves the full capability catalog.
//! 2. `configure` the stream geometry — negotiates the surface format,
//!    pre-fills the frame pool, creates the render target and mixer.
//! 3. `process` each frame — upload, mixer render, readback, recycle.
//! 4. `teardown` — surfaces, then mixer, then device, in that order.
//!
//! # Usage
//!
//! ```ignore
//! use vf_common::{PipelineConfig, Resolution};
//! use vf_vdpau::caps::ApiRevision;
//!
//! let mut pipeline = vf_vdpau::pipeline::open(&PipelineConfig::default(), ApiRevision::V1)?;
//! pipeline.configure(Resolution::HD)?;
//! for frame in decoded_frames {
//!     match pipeline.process(frame) {
//!         Ok(out) => downstream.push(out),
//!         Err(e) => tracing::warn!(error = %e, "frame skipped"),
//!     }
//! }
//! pipeline.teardown();
//! ```

pub mod caps;
pub mod device;
pub mod error;
pub mod ffi;
pub mod format;
pub mod mixer;
pub mod mock;
pub mod pipeline;
pub mod pool;
pub mod surface;
pub mod x11;

// Re-export primary public types
pub use caps::{ApiRevision, CapabilityTable, ProcSource, VdpFuncId};
pub use device::DeviceContext;
pub use error::LoadError;
pub use format::{FormatCandidate, DEFAULT_CANDIDATES};
pub use mixer::{Mixer, MixerFeature};
pub use pipeline::{VdpauPipeline, POOL_DEPTH};
pub use pool::FramePool;
pub use surface::{OutputSurface, Surface};
