//! Owned GPU surface handles.
//!
//! A surface is created through the device context, consumed by put/get
//! transfer operations, and destroyed explicitly — never garbage collected.
//! The guards below call the destroy operation exactly once: `destroy()` on
//! the normal path, `Drop` as the backstop on early-error paths, with the
//! `Option` handle preventing a double destroy. Each guard carries a copy of
//! its destroy function pointer so no borrow of the device context is held
//! across the surface's lifetime.
//!
//! Invariant (enforced by the pipeline's ordered teardown, not here): a
//! surface must be destroyed before the device it was created from.

use tracing::warn;

use vf_common::{ChromaType, Resolution};

use crate::ffi::{
    check_status, VdpOutputSurface, VdpOutputSurfaceDestroy, VdpVideoSurface,
    VdpVideoSurfaceDestroy,
};

/// An owned GPU-resident YCbCr video surface.
#[derive(Debug)]
pub struct Surface {
    handle: Option<VdpVideoSurface>,
    destroy_fn: VdpVideoSurfaceDestroy,
    resolution: Resolution,
    chroma: ChromaType,
}

impl Surface {
    pub(crate) fn new(
        handle: VdpVideoSurface,
        destroy_fn: VdpVideoSurfaceDestroy,
        resolution: Resolution,
        chroma: ChromaType,
    ) -> Self {
        Self {
            handle: Some(handle),
            destroy_fn,
            resolution,
            chroma,
        }
    }

    /// Raw handle for transfer and render calls.
    ///
    /// # Panics
    ///
    /// Panics if called after `destroy()` — the handle no longer exists.
    pub fn handle(&self) -> VdpVideoSurface {
        self.handle.expect("surface already destroyed")
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn chroma(&self) -> ChromaType {
        self.chroma
    }

    /// Explicitly destroy the surface.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: handle was produced by the matching create operation
            // and has not been destroyed yet (Option take above).
            let status = unsafe { (self.destroy_fn)(handle) };
            if let Err(reason) = check_status(status, "VideoSurfaceDestroy") {
                warn!(surface = handle, %reason, "video surface destroy reported an error");
            }
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.release();
    }
}

/// An owned GPU-resident RGBA output surface (the mixer's render target).
#[derive(Debug)]
pub struct OutputSurface {
    handle: Option<VdpOutputSurface>,
    destroy_fn: VdpOutputSurfaceDestroy,
    resolution: Resolution,
}

impl OutputSurface {
    pub(crate) fn new(
        handle: VdpOutputSurface,
        destroy_fn: VdpOutputSurfaceDestroy,
        resolution: Resolution,
    ) -> Self {
        Self {
            handle: Some(handle),
            destroy_fn,
            resolution,
        }
    }

    /// Raw handle for render calls.
    ///
    /// # Panics
    ///
    /// Panics if called after `destroy()`.
    pub fn handle(&self) -> VdpOutputSurface {
        self.handle.expect("output surface already destroyed")
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Explicitly destroy the surface.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: as for Surface::release.
            let status = unsafe { (self.destroy_fn)(handle) };
            if let Err(reason) = check_status(status, "OutputSurfaceDestroy") {
                warn!(surface = handle, %reason, "output surface destroy reported an error");
            }
        }
    }
}

impl Drop for OutputSurface {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceContext;
    use crate::mock::MockDevice;

    #[test]
    fn surface_destroyed_exactly_once_on_drop() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let surface = ctx
            .create_video_surface(ChromaType::Yuv420, Resolution::new(64, 48))
            .unwrap();
        assert_eq!(dev.live_surface_count(), 1);
        drop(surface);
        assert_eq!(dev.live_surface_count(), 0);
    }

    #[test]
    fn explicit_destroy_then_drop_does_not_double_free() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        let surface = ctx
            .create_video_surface(ChromaType::Yuv420, Resolution::new(64, 48))
            .unwrap();
        surface.destroy();
        // One destroy event recorded, not two.
        assert_eq!(dev.surface_destroy_count(), 1);
    }
}
