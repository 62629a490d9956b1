//! Format negotiation — fixes the active surface format for the stream.
//!
//! The device is queried for each (chroma type, packed layout) candidate in
//! preference order and the first supported one wins. The outcome depends
//! only on the device and the candidate list; nothing is cached across
//! streams.

use tracing::{debug, info};

use vf_common::{ChromaType, InitError, PixelFormat};

use crate::device::DeviceContext;
use crate::ffi::{
    VdpChromaType, VdpYCbCrFormat, VDP_CHROMA_TYPE_420, VDP_CHROMA_TYPE_422, VDP_CHROMA_TYPE_444,
    VDP_FALSE, VDP_STATUS_OK, VDP_YCBCR_FORMAT_NV12, VDP_YCBCR_FORMAT_YV12,
};

/// Wire value for a chroma class.
pub(crate) fn chroma_to_vdp(chroma: ChromaType) -> VdpChromaType {
    match chroma {
        // Mono surfaces use the 4:2:0 storage class on every known driver.
        ChromaType::Mono | ChromaType::Yuv420 => VDP_CHROMA_TYPE_420,
        ChromaType::Yuv422 => VDP_CHROMA_TYPE_422,
        ChromaType::Yuv444 => VDP_CHROMA_TYPE_444,
    }
}

/// Wire value for a host pixel layout.
pub(crate) fn pixel_to_ycbcr(format: PixelFormat) -> VdpYCbCrFormat {
    match format {
        PixelFormat::Nv12 => VDP_YCBCR_FORMAT_NV12,
        PixelFormat::Yv12 => VDP_YCBCR_FORMAT_YV12,
    }
}

/// One negotiable (chroma type, packed layout, host pixel format) triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatCandidate {
    pub chroma: ChromaType,
    pub ycbcr: VdpYCbCrFormat,
    pub pixel: PixelFormat,
}

impl FormatCandidate {
    pub const fn new(chroma: ChromaType, ycbcr: VdpYCbCrFormat, pixel: PixelFormat) -> Self {
        Self {
            chroma,
            ycbcr,
            pixel,
        }
    }
}

/// Default preference order. Chroma is pinned to 4:2:0, which is what
/// upstream decode produces; NV12 ranks first because it matches the fixed
/// semi-planar readback layout.
pub const DEFAULT_CANDIDATES: [FormatCandidate; 2] = [
    FormatCandidate::new(ChromaType::Yuv420, VDP_YCBCR_FORMAT_NV12, PixelFormat::Nv12),
    FormatCandidate::new(ChromaType::Yuv420, VDP_YCBCR_FORMAT_YV12, PixelFormat::Yv12),
];

/// Select the first device-supported candidate, in list order.
///
/// Fatal if nothing matches: there is no safe fallback format, so the
/// stream cannot start.
pub fn negotiate(
    ctx: &DeviceContext,
    candidates: &[FormatCandidate],
) -> Result<FormatCandidate, InitError> {
    for candidate in candidates {
        let mut supported = VDP_FALSE;
        // SAFETY: resolved entry point, live device, valid out-pointer.
        let status = unsafe {
            (ctx.caps().video_surface_query_get_put_bits_ycbcr_capabilities)(
                ctx.handle(),
                chroma_to_vdp(candidate.chroma),
                candidate.ycbcr,
                &mut supported,
            )
        };
        if status != VDP_STATUS_OK {
            debug!(
                candidate = ?candidate.pixel,
                status,
                "format support query failed, skipping candidate"
            );
            continue;
        }
        if supported != VDP_FALSE {
            info!(
                chroma = ?candidate.chroma,
                pixel = ?candidate.pixel,
                "Surface format negotiated"
            );
            return Ok(*candidate);
        }
    }
    Err(InitError::UnsupportedFormat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceContext;
    use crate::ffi::{VDP_YCBCR_FORMAT_UYVY, VDP_YCBCR_FORMAT_YUYV};
    use crate::mock::MockDevice;

    // A longer scan list than the default pair, for order-sensitivity tests.
    fn four_candidates() -> [FormatCandidate; 4] {
        [
            FormatCandidate::new(ChromaType::Yuv420, VDP_YCBCR_FORMAT_UYVY, PixelFormat::Nv12),
            FormatCandidate::new(ChromaType::Yuv420, VDP_YCBCR_FORMAT_YUYV, PixelFormat::Nv12),
            FormatCandidate::new(ChromaType::Yuv420, VDP_YCBCR_FORMAT_NV12, PixelFormat::Nv12),
            FormatCandidate::new(ChromaType::Yuv420, VDP_YCBCR_FORMAT_YV12, PixelFormat::Yv12),
        ]
    }

    #[test]
    fn picks_first_supported_candidate() {
        let dev = MockDevice::new(); // supports NV12 and YV12 at 4:2:0
        let ctx = DeviceContext::for_tests(&dev);
        let chosen = negotiate(&ctx, &DEFAULT_CANDIDATES).unwrap();
        assert_eq!(chosen.pixel, PixelFormat::Nv12);
    }

    #[test]
    fn selects_exactly_the_third_candidate_when_only_it_is_supported() {
        let dev = MockDevice::builder()
            .supports_only(ChromaType::Yuv420, VDP_YCBCR_FORMAT_NV12)
            .build();
        let ctx = DeviceContext::for_tests(&dev);
        let chosen = negotiate(&ctx, &four_candidates()).unwrap();
        assert_eq!(chosen, four_candidates()[2]);
    }

    #[test]
    fn negotiation_is_deterministic() {
        let dev = MockDevice::builder()
            .supports_only(ChromaType::Yuv420, VDP_YCBCR_FORMAT_NV12)
            .build();
        let ctx = DeviceContext::for_tests(&dev);
        let first = negotiate(&ctx, &four_candidates()).unwrap();
        for _ in 0..8 {
            assert_eq!(negotiate(&ctx, &four_candidates()).unwrap(), first);
        }
    }

    #[test]
    fn no_supported_candidate_is_fatal() {
        let dev = MockDevice::builder()
            .supports_only(ChromaType::Yuv420, VDP_YCBCR_FORMAT_UYVY)
            .build();
        let ctx = DeviceContext::for_tests(&dev);
        let err = negotiate(&ctx, &DEFAULT_CANDIDATES).unwrap_err();
        assert!(matches!(err, InitError::UnsupportedFormat));
    }
}
