//! Device context — owns the hardware connection and the resolved
//! capability table.
//!
//! Single source of truth for hardware object creation. The context is
//! constructed once per stream and injected into every component that needs
//! it; there is no process-global connection state. The device handle and
//! capability table are immutable after construction.

use std::ffi::CStr;

use tracing::{info, warn};

use vf_common::{ChromaType, FrameError, InitError, PipelineConfig, Resolution};

use crate::caps::{ApiRevision, CapabilityTable, ProcSource, RawProc, VdpFuncId};
use crate::ffi::{
    status_name, VdpDevice, VdpGetProcAddress, VdpStatus, VDP_INVALID_HANDLE,
    VDP_RGBA_FORMAT_B8G8R8A8, VDP_STATUS_OK,
};
use crate::format::chroma_to_vdp;
use crate::surface::{OutputSurface, Surface};
use crate::x11::X11Connection;

/// Adapter making the driver's `get_proc_address` callback a [`ProcSource`].
struct DriverProcSource(VdpGetProcAddress);

impl ProcSource for DriverProcSource {
    fn get_proc(&self, device: VdpDevice, func: VdpFuncId) -> Option<RawProc> {
        let mut ptr: *mut std::ffi::c_void = std::ptr::null_mut();
        // SAFETY: the resolver came from device creation on this device;
        // the out-pointer is valid for the write.
        let status = unsafe { (self.0)(device, func.id(), &mut ptr) };
        (status == VDP_STATUS_OK && !ptr.is_null()).then_some(ptr as RawProc)
    }
}

/// An open hardware device with its resolved capability table.
///
/// Owns the device handle exclusively. All surfaces and mixers derived from
/// this context become invalid once the device is destroyed; the pipeline
/// enforces that they are destroyed first (the underlying API does not).
pub struct DeviceContext {
    device: Option<VdpDevice>,
    caps: CapabilityTable,
    api_version: u32,
    /// Keeps the loaded libraries (and therefore every resolved function
    /// pointer) alive. `None` when the context was built over a mock.
    _conn: Option<X11Connection>,
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("device", &self.device)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl DeviceContext {
    /// Open a device on the real hardware path: connect to X11, create the
    /// device on `screen`, resolve the capability catalog.
    pub fn open(
        config: &PipelineConfig,
        revision: ApiRevision,
    ) -> Result<Self, InitError> {
        let conn = X11Connection::open(config)?;
        let (device, get_proc) = conn.create_device(config.screen)?;
        Self::build(device, &DriverProcSource(get_proc), revision, Some(conn))
    }

    /// Construct a context from an explicit entry-point source.
    ///
    /// This is the seam the test suite uses with the mock device; the
    /// resulting context behaves identically to one built by [`open`].
    ///
    /// [`open`]: DeviceContext::open
    pub fn with_proc_source(
        device: VdpDevice,
        source: &dyn ProcSource,
        revision: ApiRevision,
    ) -> Result<Self, InitError> {
        Self::build(device, source, revision, None)
    }

    fn build(
        device: VdpDevice,
        source: &dyn ProcSource,
        revision: ApiRevision,
        conn: Option<X11Connection>,
    ) -> Result<Self, InitError> {
        let caps = CapabilityTable::resolve(source, device, revision)?;

        let mut api_version: u32 = 0;
        // SAFETY: resolved entry point, valid out-pointer.
        let status = unsafe { (caps.get_api_version)(&mut api_version) };
        if status != VDP_STATUS_OK {
            warn!(status = status_name(status), "GetApiVersion failed");
        }

        let mut info_ptr: *const std::ffi::c_char = std::ptr::null();
        // SAFETY: resolved entry point; on success the driver hands back a
        // static string it owns.
        let status = unsafe { (caps.get_information_string)(&mut info_ptr) };
        let information = if status == VDP_STATUS_OK && !info_ptr.is_null() {
            // SAFETY: non-null driver-owned NUL-terminated string.
            unsafe { CStr::from_ptr(info_ptr) }
                .to_string_lossy()
                .into_owned()
        } else {
            String::from("unknown")
        };

        info!(
            device,
            api_version,
            driver = %information,
            "Device context ready"
        );

        Ok(Self {
            device: Some(device),
            caps,
            api_version,
            _conn: conn,
        })
    }

    /// The live device handle.
    ///
    /// # Panics
    ///
    /// Panics if the device has already been closed.
    pub fn handle(&self) -> VdpDevice {
        self.device.expect("device already closed")
    }

    /// The resolved capability table.
    pub fn caps(&self) -> &CapabilityTable {
        &self.caps
    }

    /// API version reported by the driver.
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Driver-side error text for a status code.
    pub fn error_string(&self, status: VdpStatus) -> String {
        // SAFETY: resolved entry point; returns a static driver-owned string.
        let ptr = unsafe { (self.caps.get_error_string)(status) };
        if ptr.is_null() {
            status_name(status).to_string()
        } else {
            // SAFETY: non-null NUL-terminated driver string.
            unsafe { CStr::from_ptr(ptr) }
                .to_string_lossy()
                .into_owned()
        }
    }

    pub(crate) fn describe(&self, operation: &str, status: VdpStatus) -> String {
        format!("{operation}: {} (status {status})", self.error_string(status))
    }

    /// Allocate a GPU video surface on this device.
    pub fn create_video_surface(
        &self,
        chroma: ChromaType,
        resolution: Resolution,
    ) -> Result<Surface, FrameError> {
        let mut handle = VDP_INVALID_HANDLE;
        // SAFETY: resolved entry point, live device, valid out-pointer.
        let status = unsafe {
            (self.caps.video_surface_create)(
                self.handle(),
                chroma_to_vdp(chroma),
                resolution.width,
                resolution.height,
                &mut handle,
            )
        };
        if status != VDP_STATUS_OK {
            return Err(FrameError::SurfaceCreate(
                self.describe("VideoSurfaceCreate", status),
            ));
        }
        Ok(Surface::new(
            handle,
            self.caps.video_surface_destroy,
            resolution,
            chroma,
        ))
    }

    /// Allocate the RGBA render-target surface the mixer writes into.
    pub fn create_output_surface(
        &self,
        resolution: Resolution,
    ) -> Result<OutputSurface, FrameError> {
        let mut handle = VDP_INVALID_HANDLE;
        // SAFETY: as for create_video_surface.
        let status = unsafe {
            (self.caps.output_surface_create)(
                self.handle(),
                VDP_RGBA_FORMAT_B8G8R8A8,
                resolution.width,
                resolution.height,
                &mut handle,
            )
        };
        if status != VDP_STATUS_OK {
            return Err(FrameError::SurfaceCreate(
                self.describe("OutputSurfaceCreate", status),
            ));
        }
        Ok(OutputSurface::new(
            handle,
            self.caps.output_surface_destroy,
            resolution,
        ))
    }

    /// Destroy the device handle.
    ///
    /// Precondition: every surface and mixer created from this context has
    /// already been destroyed. The pipeline's teardown guarantees the order;
    /// the driver does not.
    pub fn close(&mut self) {
        if let Some(device) = self.device.take() {
            // SAFETY: live device handle, destroyed exactly once.
            let status = unsafe { (self.caps.device_destroy)(device) };
            if status != VDP_STATUS_OK {
                warn!(
                    device,
                    status = status_name(status),
                    "device destroy reported an error"
                );
            } else {
                info!(device, "Device closed");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(mock: &crate::mock::MockDevice) -> Self {
        Self::with_proc_source(mock.handle(), mock, ApiRevision::V1)
            .expect("mock device must resolve the full catalog")
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;

    #[test]
    fn context_reports_api_version_from_device() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        assert_eq!(ctx.api_version(), 1);
    }

    #[test]
    fn error_string_comes_from_the_device() {
        let dev = MockDevice::new();
        let ctx = DeviceContext::for_tests(&dev);
        assert_eq!(ctx.error_string(VDP_STATUS_OK), "VDP_STATUS_OK");
    }

    #[test]
    fn close_destroys_the_device_once() {
        let dev = MockDevice::new();
        let mut ctx = DeviceContext::for_tests(&dev);
        ctx.close();
        assert!(dev.is_destroyed());
        // Second close (and the Drop that follows) must be a no-op.
        ctx.close();
        assert_eq!(dev.device_destroy_count(), 1);
    }

    #[test]
    fn surface_creation_failure_is_frame_scoped() {
        let dev = MockDevice::builder().fail_surface_create(true).build();
        let ctx = DeviceContext::for_tests(&dev);
        let err = ctx
            .create_video_surface(ChromaType::Yuv420, Resolution::new(64, 48))
            .unwrap_err();
        assert!(matches!(err, FrameError::SurfaceCreate(_)));
    }
}
