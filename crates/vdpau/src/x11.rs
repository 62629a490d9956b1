//! X11 display connection and device creation — the real hardware path.
//!
//! Owns the two dynamically loaded libraries and the Xlib display pointer.
//! Everything here is untestable without a driver; the rest of the crate is
//! reached through [`crate::caps::ProcSource`] and works against the mock.

use std::ffi::{c_void, CStr, CString};
use std::mem::MaybeUninit;

use tracing::info;

use vf_common::{InitError, PipelineConfig};

use crate::error::LoadError;
use crate::ffi::{
    status_name, VdpDevice, VdpGetProcAddress, VdpauLibrary, X11Library, VDP_INVALID_HANDLE,
    VDP_STATUS_OK,
};

/// An open X11 display connection with the loaded VDPAU dispatch library.
///
/// The loaded libraries must outlive every function pointer resolved from
/// them, so the connection is owned by the device context for the lifetime
/// of the stream. The display is closed on drop.
pub struct X11Connection {
    vdpau: VdpauLibrary,
    x11: X11Library,
    display: *mut c_void,
    display_name: String,
}

impl std::fmt::Debug for X11Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Connection")
            .field("display", &self.display_name)
            .finish()
    }
}

impl X11Connection {
    /// Open the display named in `config` (or the `DISPLAY` environment
    /// default) and load the VDPAU dispatch library.
    ///
    /// Failure is fatal for the stream and reports the display identity
    /// along with the platform error text.
    pub fn open(config: &PipelineConfig) -> Result<Self, InitError> {
        let requested = config
            .display
            .clone()
            .unwrap_or_else(|| "$DISPLAY".to_string());
        let load_err = |e: LoadError| InitError::DeviceOpen {
            display: requested.clone(),
            reason: e.to_string(),
        };

        let x11 = X11Library::load().map_err(load_err)?;
        let vdpau = VdpauLibrary::load().map_err(load_err)?;

        let name_cstr = match &config.display {
            Some(name) => Some(CString::new(name.as_str()).map_err(|_| {
                InitError::DeviceOpen {
                    display: requested.clone(),
                    reason: "display name contains an interior NUL".to_string(),
                }
            })?),
            None => None,
        };
        let name_ptr = name_cstr
            .as_deref()
            .map_or(std::ptr::null(), CStr::as_ptr);

        // SAFETY: name_ptr is either null (Xlib then reads $DISPLAY) or a
        // valid NUL-terminated string alive for the duration of the call.
        let display = unsafe { (x11.open_display)(name_ptr) };
        if display.is_null() {
            return Err(InitError::DeviceOpen {
                display: requested,
                reason: "XOpenDisplay returned no connection".to_string(),
            });
        }

        // SAFETY: display is a live connection; XDisplayString returns a
        // string owned by Xlib, valid while the display stays open.
        let display_name = unsafe { CStr::from_ptr((x11.display_string)(display)) }
            .to_string_lossy()
            .into_owned();

        info!(display = %display_name, "X11 display opened");

        Ok(Self {
            vdpau,
            x11,
            display,
            display_name,
        })
    }

    /// Human-readable identity of the connected display.
    pub fn display_string(&self) -> &str {
        &self.display_name
    }

    /// Create the hardware device on `screen` and hand back its entry-point
    /// resolver.
    pub(crate) fn create_device(
        &self,
        screen: u32,
    ) -> Result<(VdpDevice, VdpGetProcAddress), InitError> {
        let mut device: VdpDevice = VDP_INVALID_HANDLE;
        let mut get_proc = MaybeUninit::<VdpGetProcAddress>::uninit();

        // SAFETY: display is live, out-pointers are valid for writes. On a
        // non-OK status neither out value is read.
        let status = unsafe {
            (self.vdpau.device_create_x11)(
                self.display,
                screen as i32,
                &mut device,
                get_proc.as_mut_ptr(),
            )
        };
        if status != VDP_STATUS_OK {
            return Err(InitError::DeviceOpen {
                display: self.display_name.clone(),
                reason: format!("vdp_device_create_x11: {}", status_name(status)),
            });
        }

        info!(device, screen, "VDPAU device created");

        // SAFETY: the driver wrote a valid resolver on VDP_STATUS_OK.
        Ok((device, unsafe { get_proc.assume_init() }))
    }
}

impl Drop for X11Connection {
    fn drop(&mut self) {
        // SAFETY: display was opened by this connection and is closed once.
        unsafe {
            (self.x11.close_display)(self.display);
        }
    }
}
