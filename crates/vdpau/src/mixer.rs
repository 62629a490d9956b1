//! Mixer stage — the hardware video-mixing object.
//!
//! A mixer is configured once per input geometry with a declared feature
//! set and the surface width/height/chroma parameters. There is no in-place
//! resize: a geometry change destroys the mixer and creates a new one.
//! Declared features can be toggled at runtime; that is a secondary
//! capability, the basic path only declares them at creation.

use std::ffi::c_void;

use tracing::{debug, info, warn};

use vf_common::{ChromaType, FrameError, InitError, Resolution};

use crate::device::DeviceContext;
use crate::ffi::{
    check_status, VdpBool, VdpVideoMixer, VdpVideoMixerDestroy, VdpVideoMixerFeature,
    VdpVideoMixerRender, VdpVideoMixerSetFeatureEnables, VDP_FALSE, VDP_INVALID_HANDLE,
    VDP_STATUS_OK, VDP_TRUE, VDP_VIDEO_MIXER_FEATURE_NOISE_REDUCTION,
    VDP_VIDEO_MIXER_FEATURE_SHARPNESS, VDP_VIDEO_MIXER_PARAMETER_CHROMA_TYPE,
    VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_HEIGHT,
    VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_WIDTH, VDP_VIDEO_MIXER_PICTURE_STRUCTURE_FRAME,
};
use crate::format::chroma_to_vdp;
use crate::surface::{OutputSurface, Surface};

/// Processing features this pipeline declares on its mixers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MixerFeature {
    Sharpness,
    NoiseReduction,
}

impl MixerFeature {
    fn to_vdp(self) -> VdpVideoMixerFeature {
        match self {
            Self::Sharpness => VDP_VIDEO_MIXER_FEATURE_SHARPNESS,
            Self::NoiseReduction => VDP_VIDEO_MIXER_FEATURE_NOISE_REDUCTION,
        }
    }
}

/// The feature set declared for this pipeline's mixers.
pub const PIPELINE_FEATURES: [MixerFeature; 2] =
    [MixerFeature::Sharpness, MixerFeature::NoiseReduction];

/// An owned hardware mixing object, bound to one input geometry.
pub struct Mixer {
    handle: Option<VdpVideoMixer>,
    destroy_fn: VdpVideoMixerDestroy,
    render_fn: VdpVideoMixerRender,
    set_feature_enables_fn: VdpVideoMixerSetFeatureEnables,
    resolution: Resolution,
}

impl std::fmt::Debug for Mixer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mixer")
            .field("handle", &self.handle)
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl Mixer {
    /// Create a mixer for the given geometry with `features` declared as
    /// available.
    pub fn create(
        ctx: &DeviceContext,
        features: &[MixerFeature],
        resolution: Resolution,
        chroma: ChromaType,
    ) -> Result<Self, InitError> {
        let vdp_features: Vec<VdpVideoMixerFeature> =
            features.iter().map(|f| f.to_vdp()).collect();

        let parameters = [
            VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_WIDTH,
            VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_HEIGHT,
            VDP_VIDEO_MIXER_PARAMETER_CHROMA_TYPE,
        ];
        let width = resolution.width;
        let height = resolution.height;
        let vdp_chroma = chroma_to_vdp(chroma);
        let parameter_values: [*const c_void; 3] = [
            (&width as *const u32).cast(),
            (&height as *const u32).cast(),
            (&vdp_chroma as *const u32).cast(),
        ];

        let mut handle = VDP_INVALID_HANDLE;
        // SAFETY: resolved entry point; every array pointer is valid for
        // the declared count and lives across the call.
        let status = unsafe {
            (ctx.caps().video_mixer_create)(
                ctx.handle(),
                vdp_features.len() as u32,
                vdp_features.as_ptr(),
                parameters.len() as u32,
                parameters.as_ptr(),
                parameter_values.as_ptr(),
                &mut handle,
            )
        };
        if status != VDP_STATUS_OK {
            return Err(InitError::MixerCreate(
                ctx.describe("VideoMixerCreate", status),
            ));
        }

        info!(
            mixer = handle,
            %resolution,
            features = features.len(),
            "Video mixer configured"
        );

        Ok(Self {
            handle: Some(handle),
            destroy_fn: ctx.caps().video_mixer_destroy,
            render_fn: ctx.caps().video_mixer_render,
            set_feature_enables_fn: ctx.caps().video_mixer_set_feature_enables,
            resolution,
        })
    }

    /// The geometry this mixer was configured for.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn handle(&self) -> VdpVideoMixer {
        self.handle.expect("mixer already destroyed")
    }

    /// Toggle declared features at runtime (secondary capability).
    pub fn set_feature_enables(
        &self,
        enables: &[(MixerFeature, bool)],
    ) -> Result<(), InitError> {
        let features: Vec<VdpVideoMixerFeature> =
            enables.iter().map(|(f, _)| f.to_vdp()).collect();
        let values: Vec<VdpBool> = enables
            .iter()
            .map(|&(_, on)| if on { VDP_TRUE } else { VDP_FALSE })
            .collect();
        // SAFETY: resolved entry point; arrays are valid for the count.
        let status = unsafe {
            (self.set_feature_enables_fn)(
                self.handle(),
                features.len() as u32,
                features.as_ptr(),
                values.as_ptr(),
            )
        };
        if status != VDP_STATUS_OK {
            return Err(InitError::MixerCreate(format!(
                "VideoMixerSetFeatureEnables failed with status {status}"
            )));
        }
        debug!(mixer = self.handle(), count = enables.len(), "Mixer feature enables updated");
        Ok(())
    }

    /// Run the hardware pass: `input` video surface into the `target`
    /// render surface. Progressive frames only; no past/future references
    /// are supplied since each frame's surface lives for exactly one cycle.
    ///
    /// # Panics
    ///
    /// Panics on geometry mismatch between this mixer and `input` — the
    /// pipeline recreates the mixer whenever the input geometry changes, so
    /// a mismatch is an invariant violation, not a recoverable condition.
    pub fn render(&self, input: &Surface, target: &OutputSurface) -> Result<(), FrameError> {
        assert_eq!(
            input.resolution(),
            self.resolution,
            "mixer geometry does not match input surface"
        );

        // SAFETY: resolved entry point; all handles are live; null rects
        // mean full-surface; no background, no layers.
        let status = unsafe {
            (self.render_fn)(
                self.handle(),
                VDP_INVALID_HANDLE, // background surface
                std::ptr::null(),
                VDP_VIDEO_MIXER_PICTURE_STRUCTURE_FRAME,
                0,
                std::ptr::null(), // past
                input.handle(),
                0,
                std::ptr::null(), // future
                std::ptr::null(), // full source rect
                target.handle(),
                std::ptr::null(), // full destination rect
                std::ptr::null(),
                0,
                std::ptr::null(), // layers
            )
        };
        if status != VDP_STATUS_OK {
            return Err(FrameError::Download(format!(
                "VideoMixerRender failed with status {status}"
            )));
        }
        Ok(())
    }

    /// Explicitly destroy the mixer.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: live mixer handle, destroyed exactly once.
            let status = unsafe { (self.destroy_fn)(handle) };
            if let Err(reason) = check_status(status, "VideoMixerDestroy") {
                warn!(mixer = handle, %reason, "mixer destroy reported an error");
            }
        }
    }
}

impl Drop for Mixer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;

    const RES: Resolution = Resolution {
        width: 128,
        height: 96,
    };

    fn mixer_for(ctx: &DeviceContext) -> Mixer {
        Mixer::create(ctx, &PIPELINE_FEATURES, RES, ChromaType::Yuv420).unwrap()
    }

    #[test]
    fn create_records_geometry() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let mixer = mixer_for(&ctx);
        assert_eq!(mixer.resolution(), RES);
        assert_eq!(dev.live_mixer_count(), 1);
    }

    #[test]
    fn render_runs_against_matching_surfaces() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let mixer = mixer_for(&ctx);
        let input = ctx.create_video_surface(ChromaType::Yuv420, RES).unwrap();
        let target = ctx.create_output_surface(RES).unwrap();
        mixer.render(&input, &target).unwrap();
        assert_eq!(dev.render_count(), 1);
    }

    #[test]
    #[should_panic(expected = "mixer geometry")]
    fn render_rejects_geometry_mismatch() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let mixer = mixer_for(&ctx);
        let wrong = ctx
            .create_video_surface(ChromaType::Yuv420, Resolution::new(64, 48))
            .unwrap();
        let target = ctx.create_output_surface(RES).unwrap();
        let _ = mixer.render(&wrong, &target);
    }

    #[test]
    fn feature_enables_reach_the_device() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let mixer = mixer_for(&ctx);
        mixer
            .set_feature_enables(&[
                (MixerFeature::Sharpness, true),
                (MixerFeature::NoiseReduction, false),
            ])
            .unwrap();
        assert!(dev.mixer_feature_enabled(VDP_VIDEO_MIXER_FEATURE_SHARPNESS));
        assert!(!dev.mixer_feature_enabled(VDP_VIDEO_MIXER_FEATURE_NOISE_REDUCTION));
    }

    #[test]
    fn destroy_is_exactly_once() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let mixer = mixer_for(&ctx);
        mixer.destroy();
        assert_eq!(dev.live_mixer_count(), 0);
        assert_eq!(dev.mixer_destroy_count(), 1);
    }
}
