//! Frame conversion driver — the per-frame entry point of the pipeline.
//!
//! Each incoming frame runs one cycle:
//!
//! ```text
//! Idle → SurfaceAllocated → Uploaded → Downloaded → Recycled
//! ```
//!
//! 1. A GPU surface is created for the frame's geometry (4:2:0, matching
//!    what upstream decode guarantees).
//! 2. The pool's current frame — the oldest in the lookahead window — is
//!    uploaded into the surface with the active format's per-plane pitches.
//! 3. The mixer renders the uploaded surface into the persistent render
//!    target.
//! 4. The surface contents are read back into a fresh host frame in the
//!    fixed semi-planar layout downstream consumers expect.
//! 5. Recycle: the window advances with the incoming frame (whose ownership
//!    `process` consumed), the discarded oldest frame is dropped, and the
//!    per-frame surface is destroyed exactly once.
//!
//! The pool is therefore a lag window over the last `POOL_DEPTH` inputs;
//! the first few outputs carry the blank frames the pool was pre-filled
//! with at configuration.
//!
//! One frame is in flight at a time (`&mut self`); a failed step aborts the
//! frame but never the stream — the surface is destroyed, the window still
//! advances, and the next frame proceeds against an intact pool.

use std::ffi::c_void;

use tracing::{debug, info};

use vf_common::{FilterError, FrameError, InitError, PixelFormat, Resolution, VideoFrame};

use crate::device::DeviceContext;
use crate::ffi::{VDP_STATUS_OK, VDP_YCBCR_FORMAT_NV12};
use crate::format::{negotiate, FormatCandidate, DEFAULT_CANDIDATES};
use crate::mixer::{Mixer, PIPELINE_FEATURES};
use crate::pool::FramePool;
use crate::surface::{OutputSurface, Surface};

/// Fixed depth of the frame lookahead window.
pub const POOL_DEPTH: usize = 3;

/// The single host pixel format the pipeline produces downstream.
///
/// Readback always uses the semi-planar layout regardless of which transfer
/// layout negotiation picked for uploads.
pub const OUTPUT_FORMATS: [PixelFormat; 1] = [PixelFormat::Nv12];

/// The complete acceleration pipeline: device context, negotiated format,
/// frame pool, mixer, and render target.
pub struct VdpauPipeline {
    ctx: DeviceContext,
    pool: FramePool,
    active: Option<FormatCandidate>,
    mixer: Option<Mixer>,
    render_target: Option<OutputSurface>,
    geometry: Option<Resolution>,
    frames_processed: u64,
}

impl std::fmt::Debug for VdpauPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VdpauPipeline")
            .field("geometry", &self.geometry)
            .field("active", &self.active)
            .field("pool_depth", &self.pool.depth())
            .field("frames_processed", &self.frames_processed)
            .finish()
    }
}

impl VdpauPipeline {
    /// Build a pipeline over an open device context.
    pub fn new(ctx: DeviceContext) -> Self {
        Self {
            ctx,
            pool: FramePool::new(),
            active: None,
            mixer: None,
            render_target: None,
            geometry: None,
            frames_processed: 0,
        }
    }

    /// The host pixel formats this pipeline can hand downstream — exactly
    /// one, reported to the enclosing graph during format negotiation.
    pub fn negotiate_formats(&self) -> &'static [PixelFormat] {
        &OUTPUT_FORMATS
    }

    /// The format triple negotiation selected, once configured.
    pub fn active_format(&self) -> Option<FormatCandidate> {
        self.active
    }

    /// Frames successfully processed since construction.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Configure the stream for the given input geometry.
    ///
    /// Runs format negotiation (once — the selection is immutable for the
    /// stream), sizes and pre-fills the frame pool, and creates the render
    /// target and mixer. A geometry change destroys and recreates the mixer
    /// and render target; there is no in-place resize.
    pub fn configure(&mut self, resolution: Resolution) -> Result<(), FilterError> {
        let active = match self.active {
            Some(active) => active,
            None => {
                let active = negotiate(&self.ctx, &DEFAULT_CANDIDATES)?;
                self.active = Some(active);
                active
            }
        };

        // Ordered replacement on reconfiguration: surfaces, then mixer.
        if let Some(target) = self.render_target.take() {
            target.destroy();
        }
        if let Some(mixer) = self.mixer.take() {
            mixer.destroy();
        }

        self.pool.resize(POOL_DEPTH, resolution, active.pixel)?;

        let target = self.ctx.create_output_surface(resolution)?;
        let mixer = Mixer::create(&self.ctx, &PIPELINE_FEATURES, resolution, active.chroma)?;

        self.render_target = Some(target);
        self.mixer = Some(mixer);
        self.geometry = Some(resolution);

        info!(%resolution, pool_depth = POOL_DEPTH, "Pipeline configured");
        Ok(())
    }

    /// Process one frame: consume the incoming host frame, produce one
    /// outgoing host frame of the same dimensions.
    ///
    /// A failure aborts only this frame. The window still advances and the
    /// per-frame surface is destroyed, so pool invariants hold for the next
    /// call.
    ///
    /// # Panics
    ///
    /// Panics if called before [`configure`](VdpauPipeline::configure).
    pub fn process(&mut self, frame: VideoFrame) -> Result<VideoFrame, FrameError> {
        let geometry = self.geometry.expect("pipeline not configured");
        let active = self.active.expect("pipeline not configured");

        // Invariant: every pooled frame has the configured geometry and
        // layout. An inadmissible frame never enters the window.
        self.validate(&frame, geometry, active)?;

        // Idle → SurfaceAllocated. A surface-creation failure still slides
        // the window so the pipeline never stalls.
        let surface = match self
            .pool
            .create_gpu_surface(&self.ctx, geometry, active.chroma)
        {
            Ok(surface) => surface,
            Err(e) => {
                drop(self.pool.advance(frame));
                return Err(e);
            }
        };

        let result = self.convert(&surface, geometry, active);

        // Downloaded → Recycled (also the failure path): the incoming frame
        // enters the window, the oldest frame leaves, the surface dies.
        drop(self.pool.advance(frame));
        surface.destroy();

        let out = result?;
        self.frames_processed += 1;
        debug!(
            frame = self.frames_processed,
            %geometry,
            "Frame cycle complete"
        );
        Ok(out)
    }

    fn validate(
        &self,
        frame: &VideoFrame,
        geometry: Resolution,
        active: FormatCandidate,
    ) -> Result<(), FrameError> {
        if frame.resolution() != geometry {
            return Err(FrameError::SurfaceCreate(format!(
                "frame geometry {} does not match configured {}",
                frame.resolution(),
                geometry
            )));
        }
        if frame.format() != active.pixel {
            return Err(FrameError::SurfaceCreate(format!(
                "frame format {:?} does not match negotiated {:?}",
                frame.format(),
                active.pixel
            )));
        }
        Ok(())
    }

    /// SurfaceAllocated → Uploaded → Downloaded.
    fn convert(
        &self,
        surface: &Surface,
        geometry: Resolution,
        active: FormatCandidate,
    ) -> Result<VideoFrame, FrameError> {
        // Upload the window's current frame with the active layout's
        // per-plane pitches.
        let (ptrs, pitches) = self.pool.current().source_planes();
        let ptrs: [*const c_void; 3] = ptrs.map(|p| p.cast());
        // SAFETY: resolved entry point; the plane pointers and pitches
        // describe buffers owned by the pool frame, alive across the call.
        let status = unsafe {
            (self.ctx.caps().video_surface_put_bits_ycbcr)(
                surface.handle(),
                active.ycbcr,
                ptrs.as_ptr(),
                pitches.as_ptr(),
            )
        };
        if status != VDP_STATUS_OK {
            return Err(FrameError::Upload(
                self.ctx.describe("VideoSurfacePutBitsYCbCr", status),
            ));
        }

        // Uploaded → Downloaded always passes through the mixer.
        let mixer = self.mixer.as_ref().expect("pipeline not configured");
        let target = self
            .render_target
            .as_ref()
            .expect("pipeline not configured");
        mixer.render(surface, target)?;

        // Read back in the fixed semi-planar layout.
        let mut out = VideoFrame::try_alloc(geometry, PixelFormat::Nv12)?;
        let (dptrs, dpitches) = out.dest_planes();
        let dptrs: [*mut c_void; 3] = dptrs.map(|p| p.cast());
        // SAFETY: destination pointers and pitches describe `out`'s planes,
        // valid for writes across the call.
        let status = unsafe {
            (self.ctx.caps().video_surface_get_bits_ycbcr)(
                surface.handle(),
                VDP_YCBCR_FORMAT_NV12,
                dptrs.as_ptr(),
                dpitches.as_ptr(),
            )
        };
        if status != VDP_STATUS_OK {
            return Err(FrameError::Download(
                self.ctx.describe("VideoSurfaceGetBitsYCbCr", status),
            ));
        }

        Ok(out)
    }

    /// Tear the stream down: outstanding surfaces first, then the mixer,
    /// then the device. Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if let Some(target) = self.render_target.take() {
            target.destroy();
        }
        if let Some(mixer) = self.mixer.take() {
            mixer.destroy();
        }
        self.pool.clear();
        self.ctx.close();
        self.geometry = None;
    }
}

impl Drop for VdpauPipeline {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Open the real hardware pipeline described by `config`.
///
/// Convenience for hosts: connect, create the device, resolve capabilities.
pub fn open(
    config: &vf_common::PipelineConfig,
    revision: crate::caps::ApiRevision,
) -> Result<VdpauPipeline, InitError> {
    let ctx = DeviceContext::open(config, revision)?;
    Ok(VdpauPipeline::new(ctx))
}
