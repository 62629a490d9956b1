//! Host-memory video frames — input and output of the acceleration core.

use crate::color::PixelFormat;
use crate::error::FrameError;
use crate::types::Resolution;

/// A decoded video frame in host memory.
///
/// Planes are stored tightly packed in one contiguous allocation, in plane
/// order (Y first). Pitches are derived from the format and resolution; the
/// pipeline never stores padded rows on the host side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    data: Vec<u8>,
    resolution: Resolution,
    format: PixelFormat,
}

impl VideoFrame {
    /// Allocate a zero-filled frame, reporting allocation failure instead of
    /// aborting. Pool sizing depends on this being fallible.
    pub fn try_alloc(resolution: Resolution, format: PixelFormat) -> Result<Self, FrameError> {
        let size = format.frame_byte_size(resolution);
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| FrameError::OutOfMemory(size))?;
        data.resize(size, 0);
        Ok(Self {
            data,
            resolution,
            format,
        })
    }

    /// Wrap existing pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `data` does not match the exact byte size of the layout.
    pub fn from_data(data: Vec<u8>, resolution: Resolution, format: PixelFormat) -> Self {
        assert_eq!(
            data.len(),
            format.frame_byte_size(resolution),
            "frame data size does not match {format:?} layout at {resolution}",
        );
        Self {
            data,
            resolution,
            format,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn plane_offset(&self, plane: usize) -> usize {
        (0..plane)
            .map(|p| {
                self.format.plane_pitch(self.resolution, p) as usize
                    * self.format.plane_rows(self.resolution, p) as usize
            })
            .sum()
    }

    fn plane_len(&self, plane: usize) -> usize {
        self.format.plane_pitch(self.resolution, plane) as usize
            * self.format.plane_rows(self.resolution, plane) as usize
    }

    /// Borrow one pixel plane.
    pub fn plane(&self, plane: usize) -> &[u8] {
        let off = self.plane_offset(plane);
        &self.data[off..off + self.plane_len(plane)]
    }

    /// Mutably borrow one pixel plane.
    pub fn plane_mut(&mut self, plane: usize) -> &mut [u8] {
        let off = self.plane_offset(plane);
        let len = self.plane_len(plane);
        &mut self.data[off..off + len]
    }

    /// Per-plane base pointers and pitches for a hardware upload.
    ///
    /// Unused trailing slots are null / zero; the hardware side only reads
    /// as many entries as the wire layout defines.
    pub fn source_planes(&self) -> ([*const u8; 3], [u32; 3]) {
        let mut ptrs = [std::ptr::null(); 3];
        let mut pitches = [0u32; 3];
        for p in 0..self.format.plane_count() {
            ptrs[p] = self.plane(p).as_ptr();
            pitches[p] = self.format.plane_pitch(self.resolution, p);
        }
        (ptrs, pitches)
    }

    /// Per-plane base pointers and pitches for a hardware readback.
    pub fn dest_planes(&mut self) -> ([*mut u8; 3], [u32; 3]) {
        let format = self.format;
        let resolution = self.resolution;
        let mut ptrs = [std::ptr::null_mut(); 3];
        let mut pitches = [0u32; 3];
        for p in 0..format.plane_count() {
            ptrs[p] = self.plane_mut(p).as_mut_ptr();
            pitches[p] = format.plane_pitch(resolution, p);
        }
        (ptrs, pitches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_is_zero_filled() {
        let frame = VideoFrame::try_alloc(Resolution::new(64, 48), PixelFormat::Nv12).unwrap();
        assert_eq!(frame.byte_size(), 64 * 48 + 64 * 24);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn plane_offsets_nv12() {
        let res = Resolution::new(64, 48);
        let mut frame = VideoFrame::try_alloc(res, PixelFormat::Nv12).unwrap();
        frame.plane_mut(1)[0] = 0xAB;
        // Chroma plane starts right after the 64x48 luma plane.
        assert_eq!(frame.data()[64 * 48], 0xAB);
        assert_eq!(frame.plane(0).len(), 64 * 48);
        assert_eq!(frame.plane(1).len(), 64 * 24);
    }

    #[test]
    fn plane_offsets_yv12() {
        let res = Resolution::new(64, 48);
        let frame = VideoFrame::try_alloc(res, PixelFormat::Yv12).unwrap();
        assert_eq!(frame.plane(0).len(), 64 * 48);
        assert_eq!(frame.plane(1).len(), 32 * 24);
        assert_eq!(frame.plane(2).len(), 32 * 24);
    }

    #[test]
    fn source_planes_pitches() {
        let res = Resolution::new(64, 48);
        let frame = VideoFrame::try_alloc(res, PixelFormat::Yv12).unwrap();
        let (ptrs, pitches) = frame.source_planes();
        assert!(!ptrs[0].is_null() && !ptrs[1].is_null() && !ptrs[2].is_null());
        assert_eq!(pitches, [64, 32, 32]);

        let nv12 = VideoFrame::try_alloc(res, PixelFormat::Nv12).unwrap();
        let (ptrs, pitches) = nv12.source_planes();
        assert!(ptrs[2].is_null());
        assert_eq!(pitches, [64, 64, 0]);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn from_data_size_mismatch_panics() {
        let _ = VideoFrame::from_data(vec![0; 10], Resolution::new(64, 48), PixelFormat::Nv12);
    }
}
