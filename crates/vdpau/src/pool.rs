//! Frame pool — the bounded lookahead window feeding the hardware pipeline.
//!
//! A fixed-depth FIFO of host frames. `resize` establishes the invariant
//! that the pool is full before frame processing starts, and `advance`
//! slides the window: the oldest frame leaves, everything shifts down one
//! position, the new frame joins at the tail. The pool also fronts GPU
//! surface allocation for the conversion driver.

use std::collections::VecDeque;

use tracing::{debug, info};

use vf_common::{ChromaType, FrameError, PixelFormat, Resolution, VideoFrame};

use crate::device::DeviceContext;
use crate::surface::Surface;

/// Bounded FIFO window of host frames.
#[derive(Debug, Default)]
pub struct FramePool {
    frames: VecDeque<VideoFrame>,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames currently held.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// (Re)build the pool with `depth` freshly allocated frames.
    ///
    /// Allocation is eager so the window is guaranteed full before the
    /// first `advance`. If any allocation fails, every frame already
    /// allocated in this call is released before the error propagates — a
    /// failed resize never leaves a partial pool behind.
    pub fn resize(
        &mut self,
        depth: usize,
        resolution: Resolution,
        format: PixelFormat,
    ) -> Result<(), FrameError> {
        self.resize_with(depth, || VideoFrame::try_alloc(resolution, format))?;
        info!(depth, %resolution, ?format, "Frame pool sized");
        Ok(())
    }

    /// `resize` with an injectable allocator, so allocation-failure cleanup
    /// is observable in tests.
    pub fn resize_with(
        &mut self,
        depth: usize,
        mut alloc: impl FnMut() -> Result<VideoFrame, FrameError>,
    ) -> Result<(), FrameError> {
        self.frames.clear();
        let mut fresh = VecDeque::with_capacity(depth);
        for _ in 0..depth {
            match alloc() {
                Ok(frame) => fresh.push_back(frame),
                Err(e) => {
                    // `fresh` owns everything allocated so far; dropping it
                    // here releases those frames before the error leaves.
                    drop(fresh);
                    return Err(e);
                }
            }
        }
        self.frames = fresh;
        Ok(())
    }

    /// Slide the window: discard the oldest frame, shift the rest down,
    /// append `new_frame` at the tail. Strictly FIFO.
    ///
    /// # Panics
    ///
    /// Panics if the pool has not been sized yet — `advance` is only legal
    /// once the full-pool invariant holds.
    pub fn advance(&mut self, new_frame: VideoFrame) -> VideoFrame {
        let discarded = self
            .frames
            .pop_front()
            .expect("frame pool used before resize");
        self.frames.push_back(new_frame);
        debug!(depth = self.frames.len(), "Pool window advanced");
        discarded
    }

    /// The window's current frame — the oldest one, next to leave.
    ///
    /// # Panics
    ///
    /// Panics if the pool has not been sized yet.
    pub fn current(&self) -> &VideoFrame {
        self.frames
            .front()
            .expect("frame pool used before resize")
    }

    /// Borrow the whole window, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &VideoFrame> {
        self.frames.iter()
    }

    /// Drop every pooled frame (teardown path).
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Allocate a GPU surface for one frame's worth of pixels.
    ///
    /// Thin delegation to the device context; the caller owns the returned
    /// surface and must destroy it exactly once (the guard enforces this).
    pub fn create_gpu_surface(
        &self,
        ctx: &DeviceContext,
        resolution: Resolution,
        chroma: ChromaType,
    ) -> Result<Surface, FrameError> {
        ctx.create_video_surface(chroma, resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const RES: Resolution = Resolution {
        width: 64,
        height: 48,
    };

    fn frame_with_tag(tag: u8) -> VideoFrame {
        let mut frame = VideoFrame::try_alloc(RES, PixelFormat::Nv12).unwrap();
        frame.plane_mut(0)[0] = tag;
        frame
    }

    fn tag_of(frame: &VideoFrame) -> u8 {
        frame.plane(0)[0]
    }

    // ── Resize ───────────────────────────────────────────────────

    #[test]
    fn resize_fills_the_pool_eagerly() {
        let mut pool = FramePool::new();
        pool.resize(3, RES, PixelFormat::Nv12).unwrap();
        assert_eq!(pool.depth(), 3);
        assert!(pool.frames().all(|f| f.resolution() == RES));
    }

    #[test]
    fn failed_resize_leaves_no_partial_pool() {
        let mut pool = FramePool::new();
        let allocated = Cell::new(0u32);
        let err = pool
            .resize_with(3, || {
                if allocated.get() == 2 {
                    // Third of three allocations fails.
                    return Err(FrameError::OutOfMemory(
                        PixelFormat::Nv12.frame_byte_size(RES),
                    ));
                }
                allocated.set(allocated.get() + 1);
                VideoFrame::try_alloc(RES, PixelFormat::Nv12)
            })
            .unwrap_err();
        assert!(matches!(err, FrameError::OutOfMemory(_)));
        // Two frames were live before the failure; the pool owns none of
        // them afterwards, so both were dropped (released) on the way out.
        assert_eq!(allocated.get(), 2);
        assert_eq!(pool.depth(), 0);
    }

    #[test]
    fn failed_resize_also_drops_the_previous_pool() {
        let mut pool = FramePool::new();
        pool.resize(3, RES, PixelFormat::Nv12).unwrap();
        let calls = Cell::new(0u32);
        let _ = pool.resize_with(3, || {
            calls.set(calls.get() + 1);
            Err::<VideoFrame, _>(FrameError::OutOfMemory(1))
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(pool.depth(), 0, "no stale frames survive a failed resize");
    }

    // ── Advance ──────────────────────────────────────────────────

    #[test]
    fn advance_is_fifo() {
        let mut pool = FramePool::new();
        let next = Cell::new(b'A');
        pool.resize_with(3, || {
            let tag = next.get();
            next.set(tag + 1);
            Ok(frame_with_tag(tag))
        })
        .unwrap();
        // Pool is [A, B, C]; advancing with D yields [B, C, D], returns A.
        let discarded = pool.advance(frame_with_tag(b'D'));
        assert_eq!(tag_of(&discarded), b'A');
        let tags: Vec<u8> = pool.frames().map(tag_of).collect();
        assert_eq!(tags, vec![b'B', b'C', b'D']);
    }

    #[test]
    fn advance_keeps_depth_constant_over_many_slides() {
        let mut pool = FramePool::new();
        pool.resize(3, RES, PixelFormat::Nv12).unwrap();
        for tag in 0..32u8 {
            let _ = pool.advance(frame_with_tag(tag));
            assert_eq!(pool.depth(), 3);
        }
        // After 32 slides the window holds the last three tags in order.
        let tags: Vec<u8> = pool.frames().map(tag_of).collect();
        assert_eq!(tags, vec![29, 30, 31]);
    }

    #[test]
    fn current_is_the_oldest_frame() {
        let mut pool = FramePool::new();
        pool.resize(2, RES, PixelFormat::Nv12).unwrap();
        pool.advance(frame_with_tag(1));
        pool.advance(frame_with_tag(2));
        assert_eq!(tag_of(pool.current()), 1);
    }

    #[test]
    #[should_panic(expected = "before resize")]
    fn advance_before_resize_panics() {
        let mut pool = FramePool::new();
        let _ = pool.advance(frame_with_tag(0));
    }
}
