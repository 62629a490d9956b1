//! Pixel format and chroma subsampling types.

use serde::{Deserialize, Serialize};

use crate::types::Resolution;

/// Host-memory pixel format for frames moving through the pipeline.
///
/// Only YCbCr 4:2:0 layouts appear here — that is what upstream decode
/// produces and what format negotiation selects among.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// NV12: full-resolution Y plane + interleaved CbCr plane at half
    /// vertical resolution (semi-planar; HW transfer native layout).
    Nv12,
    /// YV12: full-resolution Y plane + separate Cr and Cb planes at
    /// quarter resolution each (fully planar).
    Yv12,
}

impl PixelFormat {
    /// Number of pixel planes in this layout.
    pub fn plane_count(self) -> usize {
        match self {
            Self::Nv12 => 2,
            Self::Yv12 => 3,
        }
    }

    /// Row pitch in bytes of the given plane at the given resolution.
    pub fn plane_pitch(self, res: Resolution, plane: usize) -> u32 {
        match (self, plane) {
            (_, 0) => res.width,
            // NV12 chroma plane interleaves Cb and Cr, so it spans the full width.
            (Self::Nv12, 1) => res.width,
            (Self::Yv12, 1 | 2) => res.width.div_ceil(2),
            _ => 0,
        }
    }

    /// Number of rows in the given plane at the given resolution.
    pub fn plane_rows(self, res: Resolution, plane: usize) -> u32 {
        match (self, plane) {
            (_, 0) => res.height,
            (Self::Nv12, 1) => res.chroma_rows_420(),
            (Self::Yv12, 1 | 2) => res.chroma_rows_420(),
            _ => 0,
        }
    }

    /// Total byte size of a tightly packed frame in this layout.
    pub fn frame_byte_size(self, res: Resolution) -> usize {
        (0..self.plane_count())
            .map(|p| self.plane_pitch(res, p) as usize * self.plane_rows(res, p) as usize)
            .sum()
    }
}

/// Chroma subsampling class of a hardware video surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromaType {
    Mono,
    /// 4:2:0 — the only class this pipeline negotiates (matches upstream decode).
    Yuv420,
    Yuv422,
    Yuv444,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv12_layout() {
        let res = Resolution::HD;
        assert_eq!(PixelFormat::Nv12.plane_count(), 2);
        assert_eq!(PixelFormat::Nv12.plane_pitch(res, 0), 1920);
        assert_eq!(PixelFormat::Nv12.plane_pitch(res, 1), 1920);
        assert_eq!(PixelFormat::Nv12.plane_rows(res, 1), 540);
        assert_eq!(
            PixelFormat::Nv12.frame_byte_size(res),
            1920 * 1080 + 1920 * 540
        );
    }

    #[test]
    fn yv12_layout() {
        let res = Resolution::new(640, 480);
        assert_eq!(PixelFormat::Yv12.plane_count(), 3);
        assert_eq!(PixelFormat::Yv12.plane_pitch(res, 1), 320);
        assert_eq!(PixelFormat::Yv12.plane_rows(res, 2), 240);
        assert_eq!(
            PixelFormat::Yv12.frame_byte_size(res),
            640 * 480 + 2 * (320 * 240)
        );
    }

    #[test]
    fn out_of_range_plane_is_empty() {
        let res = Resolution::HD;
        assert_eq!(PixelFormat::Nv12.plane_pitch(res, 2), 0);
        assert_eq!(PixelFormat::Nv12.plane_rows(res, 2), 0);
    }
}
