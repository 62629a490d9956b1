//! Raw ABI surface for the VDPAU library.
//!
//! Handle and status types, wire-format constants, and typed function-pointer
//! aliases for every operation in the capability catalog. The shared
//! libraries (libvdpau and libX11) are loaded dynamically at runtime via
//! `libloading`; only the device-creation entry points are bound here — the
//! rest of the API is resolved per-device through `vdp_get_proc_address`
//! (see [`crate::caps`]).
//!
//! Reference: `vdpau/vdpau.h` and `vdpau/vdpau_x11.h`.

use std::ffi::{c_char, c_void};

use libloading::Library;
use tracing::info;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Handle types
// ---------------------------------------------------------------------------

/// Opaque handle to an open hardware device.
pub type VdpDevice = u32;

/// Opaque handle to a GPU-resident YCbCr video surface.
pub type VdpVideoSurface = u32;

/// Opaque handle to a GPU-resident RGBA output surface.
pub type VdpOutputSurface = u32;

/// Opaque handle to a video mixing object.
pub type VdpVideoMixer = u32;

/// Opaque handle to a presentation queue.
pub type VdpPresentationQueue = u32;

/// Opaque handle to a presentation queue target.
pub type VdpPresentationQueueTarget = u32;

/// Sentinel for "no handle".
pub const VDP_INVALID_HANDLE: u32 = 0xffff_ffff;

/// VDPAU boolean (u32 on the wire).
pub type VdpBool = u32;

pub const VDP_FALSE: VdpBool = 0;
pub const VDP_TRUE: VdpBool = 1;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// VDPAU API return type.
pub type VdpStatus = u32;

pub const VDP_STATUS_OK: VdpStatus = 0;
pub const VDP_STATUS_NO_IMPLEMENTATION: VdpStatus = 1;
pub const VDP_STATUS_DISPLAY_PREEMPTED: VdpStatus = 2;
pub const VDP_STATUS_INVALID_HANDLE: VdpStatus = 3;
pub const VDP_STATUS_INVALID_POINTER: VdpStatus = 4;
pub const VDP_STATUS_INVALID_CHROMA_TYPE: VdpStatus = 5;
pub const VDP_STATUS_INVALID_Y_CB_CR_FORMAT: VdpStatus = 6;
pub const VDP_STATUS_INVALID_RGBA_FORMAT: VdpStatus = 7;
pub const VDP_STATUS_INVALID_VIDEO_MIXER_FEATURE: VdpStatus = 15;
pub const VDP_STATUS_INVALID_VIDEO_MIXER_PARAMETER: VdpStatus = 16;
pub const VDP_STATUS_INVALID_FUNC_ID: VdpStatus = 19;
pub const VDP_STATUS_INVALID_SIZE: VdpStatus = 20;
pub const VDP_STATUS_INVALID_VALUE: VdpStatus = 21;
pub const VDP_STATUS_RESOURCES: VdpStatus = 23;
pub const VDP_STATUS_HANDLE_DEVICE_MISMATCH: VdpStatus = 24;
pub const VDP_STATUS_ERROR: VdpStatus = 25;

/// Get a human-readable name for a VDPAU status code.
pub fn status_name(status: VdpStatus) -> &'static str {
    match status {
        0 => "VDP_STATUS_OK",
        1 => "VDP_STATUS_NO_IMPLEMENTATION",
        2 => "VDP_STATUS_DISPLAY_PREEMPTED",
        3 => "VDP_STATUS_INVALID_HANDLE",
        4 => "VDP_STATUS_INVALID_POINTER",
        5 => "VDP_STATUS_INVALID_CHROMA_TYPE",
        6 => "VDP_STATUS_INVALID_Y_CB_CR_FORMAT",
        7 => "VDP_STATUS_INVALID_RGBA_FORMAT",
        15 => "VDP_STATUS_INVALID_VIDEO_MIXER_FEATURE",
        16 => "VDP_STATUS_INVALID_VIDEO_MIXER_PARAMETER",
        19 => "VDP_STATUS_INVALID_FUNC_ID",
        20 => "VDP_STATUS_INVALID_SIZE",
        21 => "VDP_STATUS_INVALID_VALUE",
        23 => "VDP_STATUS_RESOURCES",
        24 => "VDP_STATUS_HANDLE_DEVICE_MISMATCH",
        25 => "VDP_STATUS_ERROR",
        _ => "VDP_STATUS_UNKNOWN",
    }
}

/// Convert a `VdpStatus` to a Result, mapping non-OK values to an error string.
pub fn check_status(status: VdpStatus, operation: &str) -> Result<(), String> {
    if status == VDP_STATUS_OK {
        Ok(())
    } else {
        Err(format!(
            "{operation} failed with VDPAU status {status} ({})",
            status_name(status)
        ))
    }
}

// ---------------------------------------------------------------------------
// Wire-format constants
// ---------------------------------------------------------------------------

/// Chroma subsampling class of a video surface.
pub type VdpChromaType = u32;

pub const VDP_CHROMA_TYPE_420: VdpChromaType = 0;
pub const VDP_CHROMA_TYPE_422: VdpChromaType = 1;
pub const VDP_CHROMA_TYPE_444: VdpChromaType = 2;

/// Packed YCbCr transfer layout for get/put pixel operations.
pub type VdpYCbCrFormat = u32;

pub const VDP_YCBCR_FORMAT_NV12: VdpYCbCrFormat = 0;
pub const VDP_YCBCR_FORMAT_YV12: VdpYCbCrFormat = 1;
pub const VDP_YCBCR_FORMAT_UYVY: VdpYCbCrFormat = 2;
pub const VDP_YCBCR_FORMAT_YUYV: VdpYCbCrFormat = 3;

/// RGBA layout of an output surface.
pub type VdpRGBAFormat = u32;

pub const VDP_RGBA_FORMAT_B8G8R8A8: VdpRGBAFormat = 0;
pub const VDP_RGBA_FORMAT_R8G8B8A8: VdpRGBAFormat = 1;
pub const VDP_RGBA_FORMAT_A8: VdpRGBAFormat = 4;

/// Video mixer feature identifiers.
pub type VdpVideoMixerFeature = u32;

pub const VDP_VIDEO_MIXER_FEATURE_DEINTERLACE_TEMPORAL: VdpVideoMixerFeature = 0;
pub const VDP_VIDEO_MIXER_FEATURE_DEINTERLACE_TEMPORAL_SPATIAL: VdpVideoMixerFeature = 1;
pub const VDP_VIDEO_MIXER_FEATURE_INVERSE_TELECINE: VdpVideoMixerFeature = 2;
pub const VDP_VIDEO_MIXER_FEATURE_NOISE_REDUCTION: VdpVideoMixerFeature = 3;
pub const VDP_VIDEO_MIXER_FEATURE_SHARPNESS: VdpVideoMixerFeature = 4;

/// Video mixer creation parameter identifiers.
pub type VdpVideoMixerParameter = u32;

pub const VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_WIDTH: VdpVideoMixerParameter = 0;
pub const VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_HEIGHT: VdpVideoMixerParameter = 1;
pub const VDP_VIDEO_MIXER_PARAMETER_CHROMA_TYPE: VdpVideoMixerParameter = 2;
pub const VDP_VIDEO_MIXER_PARAMETER_LAYERS: VdpVideoMixerParameter = 3;

/// Video mixer attribute identifiers (value-bearing knobs for declared features).
pub type VdpVideoMixerAttribute = u32;

pub const VDP_VIDEO_MIXER_ATTRIBUTE_NOISE_REDUCTION_LEVEL: VdpVideoMixerAttribute = 1;
pub const VDP_VIDEO_MIXER_ATTRIBUTE_SHARPNESS_LEVEL: VdpVideoMixerAttribute = 2;

/// Picture structure passed to mixer render.
pub type VdpVideoMixerPictureStructure = u32;

pub const VDP_VIDEO_MIXER_PICTURE_STRUCTURE_TOP_FIELD: VdpVideoMixerPictureStructure = 0;
pub const VDP_VIDEO_MIXER_PICTURE_STRUCTURE_BOTTOM_FIELD: VdpVideoMixerPictureStructure = 1;
pub const VDP_VIDEO_MIXER_PICTURE_STRUCTURE_FRAME: VdpVideoMixerPictureStructure = 2;

/// Axis-aligned rectangle, inclusive-exclusive.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VdpRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

// ---------------------------------------------------------------------------
// Function-pointer aliases (the capability catalog's callable types)
// ---------------------------------------------------------------------------

pub type VdpGetErrorString = unsafe extern "C" fn(status: VdpStatus) -> *const c_char;

pub type VdpGetApiVersion = unsafe extern "C" fn(api_version: *mut u32) -> VdpStatus;

pub type VdpGetInformationString =
    unsafe extern "C" fn(information_string: *mut *const c_char) -> VdpStatus;

pub type VdpDeviceDestroy = unsafe extern "C" fn(device: VdpDevice) -> VdpStatus;

pub type VdpGenerateCscMatrix = unsafe extern "C" fn(
    procamp: *mut c_void,
    standard: u32,
    csc_matrix: *mut [[f32; 4]; 3],
) -> VdpStatus;

pub type VdpVideoSurfaceQueryCapabilities = unsafe extern "C" fn(
    device: VdpDevice,
    surface_chroma_type: VdpChromaType,
    is_supported: *mut VdpBool,
    max_width: *mut u32,
    max_height: *mut u32,
) -> VdpStatus;

pub type VdpVideoSurfaceQueryGetPutBitsYCbCrCapabilities = unsafe extern "C" fn(
    device: VdpDevice,
    surface_chroma_type: VdpChromaType,
    bits_ycbcr_format: VdpYCbCrFormat,
    is_supported: *mut VdpBool,
) -> VdpStatus;

pub type VdpVideoSurfaceCreate = unsafe extern "C" fn(
    device: VdpDevice,
    chroma_type: VdpChromaType,
    width: u32,
    height: u32,
    surface: *mut VdpVideoSurface,
) -> VdpStatus;

pub type VdpVideoSurfaceDestroy = unsafe extern "C" fn(surface: VdpVideoSurface) -> VdpStatus;

pub type VdpVideoSurfaceGetParameters = unsafe extern "C" fn(
    surface: VdpVideoSurface,
    chroma_type: *mut VdpChromaType,
    width: *mut u32,
    height: *mut u32,
) -> VdpStatus;

pub type VdpVideoSurfaceGetBitsYCbCr = unsafe extern "C" fn(
    surface: VdpVideoSurface,
    destination_ycbcr_format: VdpYCbCrFormat,
    destination_data: *const *mut c_void,
    destination_pitches: *const u32,
) -> VdpStatus;

pub type VdpVideoSurfacePutBitsYCbCr = unsafe extern "C" fn(
    surface: VdpVideoSurface,
    source_ycbcr_format: VdpYCbCrFormat,
    source_data: *const *const c_void,
    source_pitches: *const u32,
) -> VdpStatus;

pub type VdpOutputSurfaceQueryCapabilities = unsafe extern "C" fn(
    device: VdpDevice,
    surface_rgba_format: VdpRGBAFormat,
    is_supported: *mut VdpBool,
    max_width: *mut u32,
    max_height: *mut u32,
) -> VdpStatus;

pub type VdpOutputSurfaceQueryGetPutBitsNativeCapabilities = unsafe extern "C" fn(
    device: VdpDevice,
    surface_rgba_format: VdpRGBAFormat,
    is_supported: *mut VdpBool,
) -> VdpStatus;

pub type VdpOutputSurfaceQueryPutBitsYCbCrCapabilities = unsafe extern "C" fn(
    device: VdpDevice,
    surface_rgba_format: VdpRGBAFormat,
    bits_ycbcr_format: VdpYCbCrFormat,
    is_supported: *mut VdpBool,
) -> VdpStatus;

pub type VdpOutputSurfaceCreate = unsafe extern "C" fn(
    device: VdpDevice,
    rgba_format: VdpRGBAFormat,
    width: u32,
    height: u32,
    surface: *mut VdpOutputSurface,
) -> VdpStatus;

pub type VdpOutputSurfaceDestroy = unsafe extern "C" fn(surface: VdpOutputSurface) -> VdpStatus;

pub type VdpOutputSurfaceGetParameters = unsafe extern "C" fn(
    surface: VdpOutputSurface,
    rgba_format: *mut VdpRGBAFormat,
    width: *mut u32,
    height: *mut u32,
) -> VdpStatus;

pub type VdpOutputSurfaceGetBitsNative = unsafe extern "C" fn(
    surface: VdpOutputSurface,
    source_rect: *const VdpRect,
    destination_data: *const *mut c_void,
    destination_pitches: *const u32,
) -> VdpStatus;

pub type VdpOutputSurfacePutBitsNative = unsafe extern "C" fn(
    surface: VdpOutputSurface,
    source_data: *const *const c_void,
    source_pitches: *const u32,
    destination_rect: *const VdpRect,
) -> VdpStatus;

pub type VdpOutputSurfacePutBitsYCbCr = unsafe extern "C" fn(
    surface: VdpOutputSurface,
    source_ycbcr_format: VdpYCbCrFormat,
    source_data: *const *const c_void,
    source_pitches: *const u32,
    destination_rect: *const VdpRect,
    csc_matrix: *const [[f32; 4]; 3],
) -> VdpStatus;

pub type VdpOutputSurfaceRenderOutputSurface = unsafe extern "C" fn(
    destination_surface: VdpOutputSurface,
    destination_rect: *const VdpRect,
    source_surface: VdpOutputSurface,
    source_rect: *const VdpRect,
    colors: *const c_void,
    blend_state: *const c_void,
    flags: u32,
) -> VdpStatus;

pub type VdpVideoMixerQueryFeatureSupport = unsafe extern "C" fn(
    device: VdpDevice,
    feature: VdpVideoMixerFeature,
    is_supported: *mut VdpBool,
) -> VdpStatus;

pub type VdpVideoMixerQueryParameterSupport = unsafe extern "C" fn(
    device: VdpDevice,
    parameter: VdpVideoMixerParameter,
    is_supported: *mut VdpBool,
) -> VdpStatus;

pub type VdpVideoMixerQueryAttributeSupport = unsafe extern "C" fn(
    device: VdpDevice,
    attribute: VdpVideoMixerAttribute,
    is_supported: *mut VdpBool,
) -> VdpStatus;

pub type VdpVideoMixerQueryParameterValueRange = unsafe extern "C" fn(
    device: VdpDevice,
    parameter: VdpVideoMixerParameter,
    min_value: *mut c_void,
    max_value: *mut c_void,
) -> VdpStatus;

pub type VdpVideoMixerQueryAttributeValueRange = unsafe extern "C" fn(
    device: VdpDevice,
    attribute: VdpVideoMixerAttribute,
    min_value: *mut c_void,
    max_value: *mut c_void,
) -> VdpStatus;

pub type VdpVideoMixerCreate = unsafe extern "C" fn(
    device: VdpDevice,
    feature_count: u32,
    features: *const VdpVideoMixerFeature,
    parameter_count: u32,
    parameters: *const VdpVideoMixerParameter,
    parameter_values: *const *const c_void,
    mixer: *mut VdpVideoMixer,
) -> VdpStatus;

pub type VdpVideoMixerSetFeatureEnables = unsafe extern "C" fn(
    mixer: VdpVideoMixer,
    feature_count: u32,
    features: *const VdpVideoMixerFeature,
    feature_enables: *const VdpBool,
) -> VdpStatus;

pub type VdpVideoMixerSetAttributeValues = unsafe extern "C" fn(
    mixer: VdpVideoMixer,
    attribute_count: u32,
    attributes: *const VdpVideoMixerAttribute,
    attribute_values: *const *const c_void,
) -> VdpStatus;

pub type VdpVideoMixerGetFeatureSupport = unsafe extern "C" fn(
    mixer: VdpVideoMixer,
    feature_count: u32,
    features: *const VdpVideoMixerFeature,
    feature_supports: *mut VdpBool,
) -> VdpStatus;

pub type VdpVideoMixerGetFeatureEnables = unsafe extern "C" fn(
    mixer: VdpVideoMixer,
    feature_count: u32,
    features: *const VdpVideoMixerFeature,
    feature_enables: *mut VdpBool,
) -> VdpStatus;

pub type VdpVideoMixerDestroy = unsafe extern "C" fn(mixer: VdpVideoMixer) -> VdpStatus;

pub type VdpVideoMixerRender = unsafe extern "C" fn(
    mixer: VdpVideoMixer,
    background_surface: VdpOutputSurface,
    background_source_rect: *const VdpRect,
    current_picture_structure: VdpVideoMixerPictureStructure,
    video_surface_past_count: u32,
    video_surface_past: *const VdpVideoSurface,
    video_surface_current: VdpVideoSurface,
    video_surface_future_count: u32,
    video_surface_future: *const VdpVideoSurface,
    video_source_rect: *const VdpRect,
    destination_surface: VdpOutputSurface,
    destination_rect: *const VdpRect,
    destination_video_rect: *const VdpRect,
    layer_count: u32,
    layers: *const c_void,
) -> VdpStatus;

pub type VdpPresentationQueueTargetDestroy =
    unsafe extern "C" fn(presentation_queue_target: VdpPresentationQueueTarget) -> VdpStatus;

pub type VdpPresentationQueueCreate = unsafe extern "C" fn(
    device: VdpDevice,
    presentation_queue_target: VdpPresentationQueueTarget,
    presentation_queue: *mut VdpPresentationQueue,
) -> VdpStatus;

pub type VdpPresentationQueueDestroy =
    unsafe extern "C" fn(presentation_queue: VdpPresentationQueue) -> VdpStatus;

pub type VdpPresentationQueueGetTime = unsafe extern "C" fn(
    presentation_queue: VdpPresentationQueue,
    current_time: *mut u64,
) -> VdpStatus;

pub type VdpPresentationQueueDisplay = unsafe extern "C" fn(
    presentation_queue: VdpPresentationQueue,
    surface: VdpOutputSurface,
    clip_width: u32,
    clip_height: u32,
    earliest_presentation_time: u64,
) -> VdpStatus;

pub type VdpPresentationQueueBlockUntilSurfaceIdle = unsafe extern "C" fn(
    presentation_queue: VdpPresentationQueue,
    surface: VdpOutputSurface,
    first_presentation_time: *mut u64,
) -> VdpStatus;

pub type VdpPresentationQueueQuerySurfaceStatus = unsafe extern "C" fn(
    presentation_queue: VdpPresentationQueue,
    surface: VdpOutputSurface,
    status: *mut u32,
    first_presentation_time: *mut u64,
) -> VdpStatus;

pub type VdpPreemptionCallback =
    unsafe extern "C" fn(device: VdpDevice, context: *mut c_void);

pub type VdpPreemptionCallbackRegister = unsafe extern "C" fn(
    device: VdpDevice,
    callback: Option<VdpPreemptionCallback>,
    context: *mut c_void,
) -> VdpStatus;

/// The per-device entry-point resolver handed back by device creation.
pub type VdpGetProcAddress = unsafe extern "C" fn(
    device: VdpDevice,
    function_id: u32,
    function_pointer: *mut *mut c_void,
) -> VdpStatus;

/// The single X11 entry point exported by libvdpau itself.
pub type VdpDeviceCreateX11 = unsafe extern "C" fn(
    display: *mut c_void,
    screen: i32,
    device: *mut VdpDevice,
    get_proc_address: *mut VdpGetProcAddress,
) -> VdpStatus;

// ---------------------------------------------------------------------------
// Dynamic library wrappers
// ---------------------------------------------------------------------------

/// Dynamically loaded libvdpau with its device-creation entry point.
///
/// Everything else in the API is resolved per-device through the
/// `get_proc_address` callback returned by [`VdpDeviceCreateX11`].
pub struct VdpauLibrary {
    /// The loaded library handle — must live as long as we use any symbols.
    _lib: Library,
    /// X11 device-creation entry point.
    pub device_create_x11: VdpDeviceCreateX11,
}

// SAFETY: VdpauLibrary contains an opaque Library handle and a function
// pointer into the loaded driver. The Library keeps the shared object
// mapped, and VDPAU entry points are thread-safe driver functions.
unsafe impl Send for VdpauLibrary {}
unsafe impl Sync for VdpauLibrary {}

impl std::fmt::Debug for VdpauLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VdpauLibrary")
            .field("loaded", &true)
            .finish()
    }
}

impl VdpauLibrary {
    /// Load libvdpau from the default system path.
    pub fn load() -> Result<Self, LoadError> {
        let lib_name = "libvdpau.so.1";
        info!(library = lib_name, "Loading VDPAU library");

        // SAFETY: We are loading the well-known system VDPAU dispatch
        // library. Loading it only registers driver entry points.
        let lib = unsafe { Library::new(lib_name) }.map_err(|e| {
            LoadError::LibraryNotFound(format!(
                "Failed to load {lib_name}: {e}. Is a VDPAU driver installed?"
            ))
        })?;

        // SAFETY: vdp_device_create_x11 is the documented entry point of
        // libvdpau; the signature matches the official header.
        let device_create_x11 = unsafe {
            lib.get::<VdpDeviceCreateX11>(b"vdp_device_create_x11\0")
                .map(|sym| *sym)
        }
        .map_err(|e| LoadError::SymbolNotFound(format!("vdp_device_create_x11: {e}")))?;

        Ok(Self {
            _lib: lib,
            device_create_x11,
        })
    }
}

pub type XOpenDisplayFn = unsafe extern "C" fn(display_name: *const c_char) -> *mut c_void;
pub type XCloseDisplayFn = unsafe extern "C" fn(display: *mut c_void) -> i32;
pub type XDisplayStringFn = unsafe extern "C" fn(display: *mut c_void) -> *const c_char;

/// Dynamically loaded libX11 with the three calls the pipeline needs:
/// open a display connection, close it, and fetch its identity string for
/// diagnostics.
pub struct X11Library {
    _lib: Library,
    pub open_display: XOpenDisplayFn,
    pub close_display: XCloseDisplayFn,
    pub display_string: XDisplayStringFn,
}

// SAFETY: see VdpauLibrary — same reasoning, Xlib display calls are used
// from the single pipeline thread only.
unsafe impl Send for X11Library {}

impl std::fmt::Debug for X11Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Library").field("loaded", &true).finish()
    }
}

impl X11Library {
    /// Load libX11 from the default system path.
    pub fn load() -> Result<Self, LoadError> {
        let lib_name = "libX11.so.6";
        info!(library = lib_name, "Loading X11 library");

        // SAFETY: loading the well-known system Xlib.
        let lib = unsafe { Library::new(lib_name) }
            .map_err(|e| LoadError::LibraryNotFound(format!("Failed to load {lib_name}: {e}")))?;

        // SAFETY: all three are standard Xlib exports with signatures
        // matching Xlib.h.
        unsafe {
            let open_display = *lib
                .get::<XOpenDisplayFn>(b"XOpenDisplay\0")
                .map_err(|e| LoadError::SymbolNotFound(format!("XOpenDisplay: {e}")))?;
            let close_display = *lib
                .get::<XCloseDisplayFn>(b"XCloseDisplay\0")
                .map_err(|e| LoadError::SymbolNotFound(format!("XCloseDisplay: {e}")))?;
            let display_string = *lib
                .get::<XDisplayStringFn>(b"XDisplayString\0")
                .map_err(|e| LoadError::SymbolNotFound(format!("XDisplayString: {e}")))?;

            Ok(Self {
                _lib: lib,
                open_display,
                close_display,
                display_string,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(status_name(VDP_STATUS_OK), "VDP_STATUS_OK");
        assert_eq!(status_name(VDP_STATUS_RESOURCES), "VDP_STATUS_RESOURCES");
        assert_eq!(status_name(999), "VDP_STATUS_UNKNOWN");
    }

    #[test]
    fn check_status_success() {
        assert!(check_status(VDP_STATUS_OK, "test").is_ok());
    }

    #[test]
    fn check_status_failure_names_operation() {
        let err = check_status(VDP_STATUS_INVALID_HANDLE, "VdpVideoSurfaceDestroy").unwrap_err();
        assert!(err.contains("VdpVideoSurfaceDestroy"));
        assert!(err.contains("INVALID_HANDLE"));
    }

    #[test]
    fn chroma_and_format_values() {
        assert_eq!(VDP_CHROMA_TYPE_420, 0);
        assert_eq!(VDP_YCBCR_FORMAT_NV12, 0);
        assert_eq!(VDP_YCBCR_FORMAT_YV12, 1);
    }

    #[test]
    fn invalid_handle_sentinel() {
        assert_eq!(VDP_INVALID_HANDLE, u32::MAX);
    }
}
