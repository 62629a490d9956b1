//! In-process software implementation of the operation catalog.
//!
//! `MockDevice` registers a fake device in a global registry and hands out
//! `extern "C"` entry points for every catalog operation, so the resolver,
//! the device context, and the full frame pipeline run unmodified without
//! hardware. The registry also keeps the books the test suite needs:
//! live-object counts, a destruction-order journal, and failure-injection
//! switches for surface creation and pixel transfers.
//!
//! Surfaces store their pixels in canonical planar Y/Cb/Cr, converted on
//! the way in and out according to the wire layout, so upload/readback
//! content actually round-trips.

use std::collections::HashMap;
use std::ffi::{c_char, c_void};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use parking_lot::Mutex;

use vf_common::ChromaType;

use crate::caps::{ProcSource, RawProc, VdpFuncId};
use crate::ffi::*;
use crate::format::chroma_to_vdp;

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

fn next_handle() -> u32 {
    NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)
}

/// One recorded destruction, in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DestroyEvent {
    Surface(VdpVideoSurface),
    OutputSurface(VdpOutputSurface),
    Mixer(VdpVideoMixer),
    Device,
}

#[derive(Default)]
struct DeviceState {
    supported: Vec<(VdpChromaType, VdpYCbCrFormat)>,
    withheld: Vec<VdpFuncId>,
    fail_surface_create: bool,
    fail_upload: bool,
    fail_download: bool,
    live_surfaces: usize,
    live_mixers: usize,
    destroy_events: Vec<DestroyEvent>,
    device_destroy_calls: u32,
    destroyed: bool,
    render_count: u32,
}

struct SurfaceState {
    device: VdpDevice,
    chroma: VdpChromaType,
    width: u32,
    height: u32,
    y: Vec<u8>,
    cb: Vec<u8>,
    cr: Vec<u8>,
}

struct OutputSurfaceState {
    device: VdpDevice,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

struct MixerState {
    device: VdpDevice,
    width: u32,
    height: u32,
    enables: HashMap<VdpVideoMixerFeature, bool>,
}

#[derive(Default)]
struct Registry {
    devices: HashMap<VdpDevice, DeviceState>,
    surfaces: HashMap<VdpVideoSurface, SurfaceState>,
    output_surfaces: HashMap<VdpOutputSurface, OutputSurfaceState>,
    mixers: HashMap<VdpVideoMixer, MixerState>,
}

static REGISTRY: LazyLock<Mutex<Registry>> = LazyLock::new(|| Mutex::new(Registry::default()));

// ---------------------------------------------------------------------------
// MockDevice
// ---------------------------------------------------------------------------

/// Builder for a mock device with non-default behavior.
pub struct MockDeviceBuilder {
    supported: Vec<(VdpChromaType, VdpYCbCrFormat)>,
    withheld: Vec<VdpFuncId>,
    fail_surface_create: bool,
    fail_upload: bool,
    fail_download: bool,
}

impl MockDeviceBuilder {
    /// Add a supported (chroma, transfer layout) pair.
    pub fn supports(mut self, chroma: ChromaType, format: VdpYCbCrFormat) -> Self {
        self.supported.push((chroma_to_vdp(chroma), format));
        self
    }

    /// Replace the support table with a single pair.
    pub fn supports_only(mut self, chroma: ChromaType, format: VdpYCbCrFormat) -> Self {
        self.supported = vec![(chroma_to_vdp(chroma), format)];
        self
    }

    /// Withhold one operation from `get_proc_address`.
    pub fn without_op(mut self, op: VdpFuncId) -> Self {
        self.withheld.push(op);
        self
    }

    pub fn fail_surface_create(mut self, fail: bool) -> Self {
        self.fail_surface_create = fail;
        self
    }

    pub fn fail_upload(mut self, fail: bool) -> Self {
        self.fail_upload = fail;
        self
    }

    pub fn fail_download(mut self, fail: bool) -> Self {
        self.fail_download = fail;
        self
    }

    pub fn build(self) -> MockDevice {
        let device = next_handle();
        REGISTRY.lock().devices.insert(
            device,
            DeviceState {
                supported: self.supported,
                withheld: self.withheld,
                fail_surface_create: self.fail_surface_create,
                fail_upload: self.fail_upload,
                fail_download: self.fail_download,
                ..DeviceState::default()
            },
        );
        MockDevice { device }
    }
}

/// A registered fake device. Dropping it purges every object it still owns
/// from the registry.
pub struct MockDevice {
    device: VdpDevice,
}

impl MockDevice {
    /// A device supporting NV12 and YV12 transfers on 4:2:0 surfaces.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MockDeviceBuilder {
        MockDeviceBuilder {
            supported: vec![
                (VDP_CHROMA_TYPE_420, VDP_YCBCR_FORMAT_NV12),
                (VDP_CHROMA_TYPE_420, VDP_YCBCR_FORMAT_YV12),
            ],
            withheld: Vec::new(),
            fail_surface_create: false,
            fail_upload: false,
            fail_download: false,
        }
    }

    pub fn handle(&self) -> VdpDevice {
        self.device
    }

    fn with_state<R>(&self, f: impl FnOnce(&DeviceState) -> R) -> R {
        let reg = REGISTRY.lock();
        f(reg.devices.get(&self.device).expect("mock device registered"))
    }

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        let mut reg = REGISTRY.lock();
        f(reg
            .devices
            .get_mut(&self.device)
            .expect("mock device registered"))
    }

    /// Toggle upload failure at runtime (between frames).
    pub fn set_fail_upload(&self, fail: bool) {
        self.with_state_mut(|d| d.fail_upload = fail);
    }

    /// Toggle readback failure at runtime.
    pub fn set_fail_download(&self, fail: bool) {
        self.with_state_mut(|d| d.fail_download = fail);
    }

    /// Toggle surface-creation failure at runtime.
    pub fn set_fail_surface_create(&self, fail: bool) {
        self.with_state_mut(|d| d.fail_surface_create = fail);
    }

    /// The destruction journal, in call order.
    pub fn destroy_events(&self) -> Vec<DestroyEvent> {
        self.with_state(|d| d.destroy_events.clone())
    }

    pub fn live_surface_count(&self) -> usize {
        self.with_state(|d| d.live_surfaces)
    }

    pub fn live_mixer_count(&self) -> usize {
        self.with_state(|d| d.live_mixers)
    }

    pub fn surface_destroy_count(&self) -> usize {
        self.with_state(|d| {
            d.destroy_events
                .iter()
                .filter(|e| matches!(e, DestroyEvent::Surface(_)))
                .count()
        })
    }

    pub fn mixer_destroy_count(&self) -> usize {
        self.with_state(|d| {
            d.destroy_events
                .iter()
                .filter(|e| matches!(e, DestroyEvent::Mixer(_)))
                .count()
        })
    }

    pub fn device_destroy_count(&self) -> u32 {
        self.with_state(|d| d.device_destroy_calls)
    }

    pub fn render_count(&self) -> u32 {
        self.with_state(|d| d.render_count)
    }

    pub fn is_destroyed(&self) -> bool {
        self.with_state(|d| d.destroyed)
    }

    /// Whether any live mixer of this device has `feature` enabled.
    pub fn mixer_feature_enabled(&self, feature: VdpVideoMixerFeature) -> bool {
        let reg = REGISTRY.lock();
        reg.mixers
            .values()
            .filter(|m| m.device == self.device)
            .any(|m| m.enables.get(&feature).copied().unwrap_or(false))
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcSource for MockDevice {
    fn get_proc(&self, device: VdpDevice, func: VdpFuncId) -> Option<RawProc> {
        let reg = REGISTRY.lock();
        let state = reg.devices.get(&device)?;
        if state.withheld.contains(&func) {
            return None;
        }
        Some(shim_for(func))
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        let mut reg = REGISTRY.lock();
        reg.devices.remove(&self.device);
        reg.surfaces.retain(|_, s| s.device != self.device);
        reg.output_surfaces.retain(|_, s| s.device != self.device);
        reg.mixers.retain(|_, m| m.device != self.device);
    }
}

// ---------------------------------------------------------------------------
// Entry-point table
// ---------------------------------------------------------------------------

macro_rules! shim {
    ($f:expr => $t:ty) => {{
        let f: $t = $f;
        f as RawProc
    }};
}

fn shim_for(func: VdpFuncId) -> RawProc {
    use VdpFuncId as F;
    match func {
        F::GetErrorString => shim!(shims::get_error_string => VdpGetErrorString),
        F::GetApiVersion => shim!(shims::get_api_version => VdpGetApiVersion),
        F::GetInformationString => {
            shim!(shims::get_information_string => VdpGetInformationString)
        }
        F::DeviceDestroy => shim!(shims::device_destroy => VdpDeviceDestroy),
        F::GenerateCscMatrix => shim!(shims::generate_csc_matrix => VdpGenerateCscMatrix),
        F::VideoSurfaceQueryCapabilities => {
            shim!(shims::video_surface_query_capabilities => VdpVideoSurfaceQueryCapabilities)
        }
        F::VideoSurfaceQueryGetPutBitsYCbCrCapabilities => {
            shim!(shims::video_surface_query_get_put_bits_ycbcr_capabilities
                => VdpVideoSurfaceQueryGetPutBitsYCbCrCapabilities)
        }
        F::VideoSurfaceCreate => shim!(shims::video_surface_create => VdpVideoSurfaceCreate),
        F::VideoSurfaceDestroy => shim!(shims::video_surface_destroy => VdpVideoSurfaceDestroy),
        F::VideoSurfaceGetParameters => {
            shim!(shims::video_surface_get_parameters => VdpVideoSurfaceGetParameters)
        }
        F::VideoSurfaceGetBitsYCbCr => {
            shim!(shims::video_surface_get_bits_ycbcr => VdpVideoSurfaceGetBitsYCbCr)
        }
        F::VideoSurfacePutBitsYCbCr => {
            shim!(shims::video_surface_put_bits_ycbcr => VdpVideoSurfacePutBitsYCbCr)
        }
        F::OutputSurfaceQueryCapabilities => {
            shim!(shims::output_surface_query_capabilities => VdpOutputSurfaceQueryCapabilities)
        }
        F::OutputSurfaceQueryGetPutBitsNativeCapabilities => {
            shim!(shims::output_surface_query_get_put_bits_native_capabilities
                => VdpOutputSurfaceQueryGetPutBitsNativeCapabilities)
        }
        F::OutputSurfaceQueryPutBitsYCbCrCapabilities => {
            shim!(shims::output_surface_query_put_bits_ycbcr_capabilities
                => VdpOutputSurfaceQueryPutBitsYCbCrCapabilities)
        }
        F::OutputSurfaceCreate => shim!(shims::output_surface_create => VdpOutputSurfaceCreate),
        F::OutputSurfaceDestroy => {
            shim!(shims::output_surface_destroy => VdpOutputSurfaceDestroy)
        }
        F::OutputSurfaceGetParameters => {
            shim!(shims::output_surface_get_parameters => VdpOutputSurfaceGetParameters)
        }
        F::OutputSurfaceGetBitsNative => {
            shim!(shims::output_surface_get_bits_native => VdpOutputSurfaceGetBitsNative)
        }
        F::OutputSurfacePutBitsNative => {
            shim!(shims::output_surface_put_bits_native => VdpOutputSurfacePutBitsNative)
        }
        F::OutputSurfacePutBitsYCbCr => {
            shim!(shims::output_surface_put_bits_ycbcr => VdpOutputSurfacePutBitsYCbCr)
        }
        F::OutputSurfaceRenderOutputSurface => {
            shim!(shims::output_surface_render_output_surface
                => VdpOutputSurfaceRenderOutputSurface)
        }
        F::VideoMixerQueryFeatureSupport => {
            shim!(shims::video_mixer_query_feature_support => VdpVideoMixerQueryFeatureSupport)
        }
        F::VideoMixerQueryParameterSupport => {
            shim!(shims::video_mixer_query_parameter_support => VdpVideoMixerQueryParameterSupport)
        }
        F::VideoMixerQueryAttributeSupport => {
            shim!(shims::video_mixer_query_attribute_support => VdpVideoMixerQueryAttributeSupport)
        }
        F::VideoMixerQueryParameterValueRange => {
            shim!(shims::video_mixer_query_value_range => VdpVideoMixerQueryParameterValueRange)
        }
        F::VideoMixerQueryAttributeValueRange => {
            shim!(shims::video_mixer_query_value_range => VdpVideoMixerQueryAttributeValueRange)
        }
        F::VideoMixerCreate => shim!(shims::video_mixer_create => VdpVideoMixerCreate),
        F::VideoMixerSetFeatureEnables => {
            shim!(shims::video_mixer_set_feature_enables => VdpVideoMixerSetFeatureEnables)
        }
        F::VideoMixerSetAttributeValues => {
            shim!(shims::video_mixer_set_attribute_values => VdpVideoMixerSetAttributeValues)
        }
        F::VideoMixerGetFeatureSupport => {
            shim!(shims::video_mixer_get_feature_support => VdpVideoMixerGetFeatureSupport)
        }
        F::VideoMixerGetFeatureEnables => {
            shim!(shims::video_mixer_get_feature_enables => VdpVideoMixerGetFeatureEnables)
        }
        F::VideoMixerDestroy => shim!(shims::video_mixer_destroy => VdpVideoMixerDestroy),
        F::VideoMixerRender => shim!(shims::video_mixer_render => VdpVideoMixerRender),
        F::PresentationQueueTargetDestroy => {
            shim!(shims::presentation_queue_target_destroy => VdpPresentationQueueTargetDestroy)
        }
        F::PresentationQueueCreate => {
            shim!(shims::presentation_queue_create => VdpPresentationQueueCreate)
        }
        F::PresentationQueueDestroy => {
            shim!(shims::presentation_queue_destroy => VdpPresentationQueueDestroy)
        }
        F::PresentationQueueGetTime => {
            shim!(shims::presentation_queue_get_time => VdpPresentationQueueGetTime)
        }
        F::PresentationQueueDisplay => {
            shim!(shims::presentation_queue_display => VdpPresentationQueueDisplay)
        }
        F::PresentationQueueBlockUntilSurfaceIdle => {
            shim!(shims::presentation_queue_block_until_surface_idle
                => VdpPresentationQueueBlockUntilSurfaceIdle)
        }
        F::PresentationQueueQuerySurfaceStatus => {
            shim!(shims::presentation_queue_query_surface_status
                => VdpPresentationQueueQuerySurfaceStatus)
        }
        F::PreemptionCallbackRegister => {
            shim!(shims::preemption_callback_register => VdpPreemptionCallbackRegister)
        }
    }
}

// ---------------------------------------------------------------------------
// extern "C" shims
// ---------------------------------------------------------------------------

mod shims {
    use super::*;

    pub(super) unsafe extern "C" fn get_error_string(status: VdpStatus) -> *const c_char {
        let s: &'static [u8] = match status {
            VDP_STATUS_OK => b"VDP_STATUS_OK\0",
            VDP_STATUS_INVALID_HANDLE => b"VDP_STATUS_INVALID_HANDLE\0",
            VDP_STATUS_INVALID_SIZE => b"VDP_STATUS_INVALID_SIZE\0",
            VDP_STATUS_RESOURCES => b"VDP_STATUS_RESOURCES\0",
            VDP_STATUS_ERROR => b"VDP_STATUS_ERROR\0",
            _ => b"VDP_STATUS_UNKNOWN\0",
        };
        s.as_ptr().cast()
    }

    pub(super) unsafe extern "C" fn get_api_version(api_version: *mut u32) -> VdpStatus {
        unsafe { *api_version = 1 };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn get_information_string(
        information_string: *mut *const c_char,
    ) -> VdpStatus {
        const INFO: &[u8] = b"vf-vdpau mock backend\0";
        unsafe { *information_string = INFO.as_ptr().cast() };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn device_destroy(device: VdpDevice) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.devices.get_mut(&device) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        state.device_destroy_calls += 1;
        if state.live_surfaces > 0 || state.live_mixers > 0 {
            // Derived handles must be destroyed first.
            return VDP_STATUS_ERROR;
        }
        state.destroyed = true;
        state.destroy_events.push(DestroyEvent::Device);
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn generate_csc_matrix(
        _procamp: *mut c_void,
        _standard: u32,
        csc_matrix: *mut [[f32; 4]; 3],
    ) -> VdpStatus {
        if csc_matrix.is_null() {
            return VDP_STATUS_INVALID_POINTER;
        }
        let mut m = [[0.0f32; 4]; 3];
        m[0][0] = 1.0;
        m[1][1] = 1.0;
        m[2][2] = 1.0;
        unsafe { *csc_matrix = m };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_query_capabilities(
        device: VdpDevice,
        chroma: VdpChromaType,
        is_supported: *mut VdpBool,
        max_width: *mut u32,
        max_height: *mut u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        unsafe {
            *is_supported = if chroma == VDP_CHROMA_TYPE_420 {
                VDP_TRUE
            } else {
                VDP_FALSE
            };
            *max_width = 8192;
            *max_height = 8192;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_query_get_put_bits_ycbcr_capabilities(
        device: VdpDevice,
        chroma: VdpChromaType,
        format: VdpYCbCrFormat,
        is_supported: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        let Some(state) = reg.devices.get(&device) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        let supported = state.supported.contains(&(chroma, format));
        unsafe { *is_supported = if supported { VDP_TRUE } else { VDP_FALSE } };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_create(
        device: VdpDevice,
        chroma: VdpChromaType,
        width: u32,
        height: u32,
        surface: *mut VdpVideoSurface,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.devices.get_mut(&device) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if state.fail_surface_create {
            return VDP_STATUS_RESOURCES;
        }
        state.live_surfaces += 1;
        let handle = next_handle();
        let cw = width.div_ceil(2) as usize;
        let ch = height.div_ceil(2) as usize;
        reg.surfaces.insert(
            handle,
            SurfaceState {
                device,
                chroma,
                width,
                height,
                y: vec![0; width as usize * height as usize],
                cb: vec![0; cw * ch],
                cr: vec![0; cw * ch],
            },
        );
        unsafe { *surface = handle };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_destroy(
        surface: VdpVideoSurface,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.surfaces.remove(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if let Some(dev) = reg.devices.get_mut(&state.device) {
            dev.live_surfaces -= 1;
            dev.destroy_events.push(DestroyEvent::Surface(surface));
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_get_parameters(
        surface: VdpVideoSurface,
        chroma: *mut VdpChromaType,
        width: *mut u32,
        height: *mut u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        let Some(state) = reg.surfaces.get(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        unsafe {
            *chroma = state.chroma;
            *width = state.width;
            *height = state.height;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_get_bits_ycbcr(
        surface: VdpVideoSurface,
        format: VdpYCbCrFormat,
        destination_data: *const *mut c_void,
        destination_pitches: *const u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        let Some(state) = reg.surfaces.get(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if reg
            .devices
            .get(&state.device)
            .is_some_and(|d| d.fail_download)
        {
            return VDP_STATUS_ERROR;
        }

        let w = state.width as usize;
        let h = state.height as usize;
        let cw = state.width.div_ceil(2) as usize;
        let ch = state.height.div_ceil(2) as usize;

        unsafe {
            let pitches = std::slice::from_raw_parts(destination_pitches, 3);
            match format {
                VDP_YCBCR_FORMAT_NV12 => {
                    let data = std::slice::from_raw_parts(destination_data, 2);
                    for row in 0..h {
                        let dst = std::slice::from_raw_parts_mut(
                            data[0].cast::<u8>().add(row * pitches[0] as usize),
                            w,
                        );
                        dst.copy_from_slice(&state.y[row * w..row * w + w]);
                    }
                    for row in 0..ch {
                        let dst = std::slice::from_raw_parts_mut(
                            data[1].cast::<u8>().add(row * pitches[1] as usize),
                            cw * 2,
                        );
                        for i in 0..cw {
                            dst[2 * i] = state.cb[row * cw + i];
                            dst[2 * i + 1] = state.cr[row * cw + i];
                        }
                    }
                }
                VDP_YCBCR_FORMAT_YV12 => {
                    let data = std::slice::from_raw_parts(destination_data, 3);
                    for row in 0..h {
                        let dst = std::slice::from_raw_parts_mut(
                            data[0].cast::<u8>().add(row * pitches[0] as usize),
                            w,
                        );
                        dst.copy_from_slice(&state.y[row * w..row * w + w]);
                    }
                    // YV12 plane order: Y, then Cr, then Cb.
                    for row in 0..ch {
                        let dst = std::slice::from_raw_parts_mut(
                            data[1].cast::<u8>().add(row * pitches[1] as usize),
                            cw,
                        );
                        dst.copy_from_slice(&state.cr[row * cw..row * cw + cw]);
                    }
                    for row in 0..ch {
                        let dst = std::slice::from_raw_parts_mut(
                            data[2].cast::<u8>().add(row * pitches[2] as usize),
                            cw,
                        );
                        dst.copy_from_slice(&state.cb[row * cw..row * cw + cw]);
                    }
                }
                _ => return VDP_STATUS_INVALID_Y_CB_CR_FORMAT,
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_surface_put_bits_ycbcr(
        surface: VdpVideoSurface,
        format: VdpYCbCrFormat,
        source_data: *const *const c_void,
        source_pitches: *const u32,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.surfaces.get(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        let device = state.device;
        if reg.devices.get(&device).is_some_and(|d| d.fail_upload) {
            return VDP_STATUS_ERROR;
        }
        let state = reg.surfaces.get_mut(&surface).expect("checked above");

        let w = state.width as usize;
        let h = state.height as usize;
        let cw = state.width.div_ceil(2) as usize;
        let ch = state.height.div_ceil(2) as usize;

        unsafe {
            let pitches = std::slice::from_raw_parts(source_pitches, 3);
            match format {
                VDP_YCBCR_FORMAT_NV12 => {
                    let data = std::slice::from_raw_parts(source_data, 2);
                    for row in 0..h {
                        let src = std::slice::from_raw_parts(
                            data[0].cast::<u8>().add(row * pitches[0] as usize),
                            w,
                        );
                        state.y[row * w..row * w + w].copy_from_slice(src);
                    }
                    for row in 0..ch {
                        let src = std::slice::from_raw_parts(
                            data[1].cast::<u8>().add(row * pitches[1] as usize),
                            cw * 2,
                        );
                        for i in 0..cw {
                            state.cb[row * cw + i] = src[2 * i];
                            state.cr[row * cw + i] = src[2 * i + 1];
                        }
                    }
                }
                VDP_YCBCR_FORMAT_YV12 => {
                    let data = std::slice::from_raw_parts(source_data, 3);
                    for row in 0..h {
                        let src = std::slice::from_raw_parts(
                            data[0].cast::<u8>().add(row * pitches[0] as usize),
                            w,
                        );
                        state.y[row * w..row * w + w].copy_from_slice(src);
                    }
                    for row in 0..ch {
                        let src = std::slice::from_raw_parts(
                            data[1].cast::<u8>().add(row * pitches[1] as usize),
                            cw,
                        );
                        state.cr[row * cw..row * cw + cw].copy_from_slice(src);
                    }
                    for row in 0..ch {
                        let src = std::slice::from_raw_parts(
                            data[2].cast::<u8>().add(row * pitches[2] as usize),
                            cw,
                        );
                        state.cb[row * cw..row * cw + cw].copy_from_slice(src);
                    }
                }
                _ => return VDP_STATUS_INVALID_Y_CB_CR_FORMAT,
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_query_capabilities(
        device: VdpDevice,
        format: VdpRGBAFormat,
        is_supported: *mut VdpBool,
        max_width: *mut u32,
        max_height: *mut u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        let ok = format == VDP_RGBA_FORMAT_B8G8R8A8 || format == VDP_RGBA_FORMAT_R8G8B8A8;
        unsafe {
            *is_supported = if ok { VDP_TRUE } else { VDP_FALSE };
            *max_width = 8192;
            *max_height = 8192;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_query_get_put_bits_native_capabilities(
        device: VdpDevice,
        format: VdpRGBAFormat,
        is_supported: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        let ok = format == VDP_RGBA_FORMAT_B8G8R8A8 || format == VDP_RGBA_FORMAT_R8G8B8A8;
        unsafe { *is_supported = if ok { VDP_TRUE } else { VDP_FALSE } };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_query_put_bits_ycbcr_capabilities(
        device: VdpDevice,
        _format: VdpRGBAFormat,
        _ycbcr: VdpYCbCrFormat,
        is_supported: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        unsafe { *is_supported = VDP_FALSE };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_create(
        device: VdpDevice,
        format: VdpRGBAFormat,
        width: u32,
        height: u32,
        surface: *mut VdpOutputSurface,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.devices.get_mut(&device) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if format != VDP_RGBA_FORMAT_B8G8R8A8 && format != VDP_RGBA_FORMAT_R8G8B8A8 {
            return VDP_STATUS_INVALID_RGBA_FORMAT;
        }
        state.live_surfaces += 1;
        let handle = next_handle();
        reg.output_surfaces.insert(
            handle,
            OutputSurfaceState {
                device,
                width,
                height,
                data: vec![0; width as usize * height as usize * 4],
            },
        );
        unsafe { *surface = handle };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_destroy(
        surface: VdpOutputSurface,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.output_surfaces.remove(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if let Some(dev) = reg.devices.get_mut(&state.device) {
            dev.live_surfaces -= 1;
            dev.destroy_events
                .push(DestroyEvent::OutputSurface(surface));
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_get_parameters(
        surface: VdpOutputSurface,
        format: *mut VdpRGBAFormat,
        width: *mut u32,
        height: *mut u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        let Some(state) = reg.output_surfaces.get(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        unsafe {
            *format = VDP_RGBA_FORMAT_B8G8R8A8;
            *width = state.width;
            *height = state.height;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_get_bits_native(
        surface: VdpOutputSurface,
        _source_rect: *const VdpRect,
        destination_data: *const *mut c_void,
        destination_pitches: *const u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        let Some(state) = reg.output_surfaces.get(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        let w = state.width as usize;
        unsafe {
            let pitch = *destination_pitches as usize;
            let base = (*destination_data).cast::<u8>();
            for row in 0..state.height as usize {
                let dst = std::slice::from_raw_parts_mut(base.add(row * pitch), w * 4);
                dst.copy_from_slice(&state.data[row * w * 4..(row + 1) * w * 4]);
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_put_bits_native(
        surface: VdpOutputSurface,
        source_data: *const *const c_void,
        source_pitches: *const u32,
        _destination_rect: *const VdpRect,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.output_surfaces.get_mut(&surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        let w = state.width as usize;
        unsafe {
            let pitch = *source_pitches as usize;
            let base = (*source_data).cast::<u8>();
            for row in 0..state.height as usize {
                let src = std::slice::from_raw_parts(base.add(row * pitch), w * 4);
                state.data[row * w * 4..(row + 1) * w * 4].copy_from_slice(src);
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn output_surface_put_bits_ycbcr(
        surface: VdpOutputSurface,
        _format: VdpYCbCrFormat,
        _source_data: *const *const c_void,
        _source_pitches: *const u32,
        _destination_rect: *const VdpRect,
        _csc_matrix: *const [[f32; 4]; 3],
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.output_surfaces.contains_key(&surface) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        VDP_STATUS_NO_IMPLEMENTATION
    }

    pub(super) unsafe extern "C" fn output_surface_render_output_surface(
        destination_surface: VdpOutputSurface,
        _destination_rect: *const VdpRect,
        source_surface: VdpOutputSurface,
        _source_rect: *const VdpRect,
        _colors: *const c_void,
        _blend_state: *const c_void,
        _flags: u32,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.output_surfaces.contains_key(&destination_surface)
            || !reg.output_surfaces.contains_key(&source_surface)
        {
            return VDP_STATUS_INVALID_HANDLE;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_query_feature_support(
        device: VdpDevice,
        feature: VdpVideoMixerFeature,
        is_supported: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        unsafe {
            *is_supported = if feature <= VDP_VIDEO_MIXER_FEATURE_SHARPNESS {
                VDP_TRUE
            } else {
                VDP_FALSE
            };
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_query_parameter_support(
        device: VdpDevice,
        parameter: VdpVideoMixerParameter,
        is_supported: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        unsafe {
            *is_supported = if parameter <= VDP_VIDEO_MIXER_PARAMETER_LAYERS {
                VDP_TRUE
            } else {
                VDP_FALSE
            };
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_query_attribute_support(
        device: VdpDevice,
        attribute: VdpVideoMixerAttribute,
        is_supported: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        let known = attribute == VDP_VIDEO_MIXER_ATTRIBUTE_NOISE_REDUCTION_LEVEL
            || attribute == VDP_VIDEO_MIXER_ATTRIBUTE_SHARPNESS_LEVEL;
        unsafe { *is_supported = if known { VDP_TRUE } else { VDP_FALSE } };
        VDP_STATUS_OK
    }

    // Shared by the parameter and attribute range queries; the mock does
    // not constrain any range, so the out-values are left untouched.
    pub(super) unsafe extern "C" fn video_mixer_query_value_range(
        device: VdpDevice,
        _id: u32,
        _min_value: *mut c_void,
        _max_value: *mut c_void,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_create(
        device: VdpDevice,
        feature_count: u32,
        features: *const VdpVideoMixerFeature,
        parameter_count: u32,
        parameters: *const VdpVideoMixerParameter,
        parameter_values: *const *const c_void,
        mixer: *mut VdpVideoMixer,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }

        let mut width = 0u32;
        let mut height = 0u32;
        unsafe {
            let feats = std::slice::from_raw_parts(features, feature_count as usize);
            if feats
                .iter()
                .any(|&f| f > VDP_VIDEO_MIXER_FEATURE_SHARPNESS)
            {
                return VDP_STATUS_INVALID_VIDEO_MIXER_FEATURE;
            }
            let params = std::slice::from_raw_parts(parameters, parameter_count as usize);
            let values = std::slice::from_raw_parts(parameter_values, parameter_count as usize);
            for (param, value) in params.iter().zip(values) {
                match *param {
                    VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_WIDTH => {
                        width = *value.cast::<u32>();
                    }
                    VDP_VIDEO_MIXER_PARAMETER_VIDEO_SURFACE_HEIGHT => {
                        height = *value.cast::<u32>();
                    }
                    VDP_VIDEO_MIXER_PARAMETER_CHROMA_TYPE
                    | VDP_VIDEO_MIXER_PARAMETER_LAYERS => {}
                    _ => return VDP_STATUS_INVALID_VIDEO_MIXER_PARAMETER,
                }
            }
        }
        if width == 0 || height == 0 {
            return VDP_STATUS_INVALID_SIZE;
        }

        let state = reg.devices.get_mut(&device).expect("checked above");
        state.live_mixers += 1;
        let handle = next_handle();
        reg.mixers.insert(
            handle,
            MixerState {
                device,
                width,
                height,
                enables: HashMap::new(),
            },
        );
        unsafe { *mixer = handle };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_set_feature_enables(
        mixer: VdpVideoMixer,
        feature_count: u32,
        features: *const VdpVideoMixerFeature,
        feature_enables: *const VdpBool,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.mixers.get_mut(&mixer) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        unsafe {
            let feats = std::slice::from_raw_parts(features, feature_count as usize);
            let vals = std::slice::from_raw_parts(feature_enables, feature_count as usize);
            for (feat, val) in feats.iter().zip(vals) {
                state.enables.insert(*feat, *val == VDP_TRUE);
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_set_attribute_values(
        mixer: VdpVideoMixer,
        _attribute_count: u32,
        _attributes: *const VdpVideoMixerAttribute,
        _attribute_values: *const *const c_void,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.mixers.contains_key(&mixer) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_get_feature_support(
        mixer: VdpVideoMixer,
        feature_count: u32,
        features: *const VdpVideoMixerFeature,
        feature_supports: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.mixers.contains_key(&mixer) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        unsafe {
            let feats = std::slice::from_raw_parts(features, feature_count as usize);
            let out = std::slice::from_raw_parts_mut(feature_supports, feature_count as usize);
            for (feat, slot) in feats.iter().zip(out) {
                *slot = if *feat <= VDP_VIDEO_MIXER_FEATURE_SHARPNESS {
                    VDP_TRUE
                } else {
                    VDP_FALSE
                };
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_get_feature_enables(
        mixer: VdpVideoMixer,
        feature_count: u32,
        features: *const VdpVideoMixerFeature,
        feature_enables: *mut VdpBool,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        let Some(state) = reg.mixers.get(&mixer) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        unsafe {
            let feats = std::slice::from_raw_parts(features, feature_count as usize);
            let out = std::slice::from_raw_parts_mut(feature_enables, feature_count as usize);
            for (feat, slot) in feats.iter().zip(out) {
                let on = state.enables.get(feat).copied().unwrap_or(false);
                *slot = if on { VDP_TRUE } else { VDP_FALSE };
            }
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn video_mixer_destroy(mixer: VdpVideoMixer) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(state) = reg.mixers.remove(&mixer) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if let Some(dev) = reg.devices.get_mut(&state.device) {
            dev.live_mixers -= 1;
            dev.destroy_events.push(DestroyEvent::Mixer(mixer));
        }
        VDP_STATUS_OK
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) unsafe extern "C" fn video_mixer_render(
        mixer: VdpVideoMixer,
        _background_surface: VdpOutputSurface,
        _background_source_rect: *const VdpRect,
        _current_picture_structure: VdpVideoMixerPictureStructure,
        _video_surface_past_count: u32,
        _video_surface_past: *const VdpVideoSurface,
        video_surface_current: VdpVideoSurface,
        _video_surface_future_count: u32,
        _video_surface_future: *const VdpVideoSurface,
        _video_source_rect: *const VdpRect,
        destination_surface: VdpOutputSurface,
        _destination_rect: *const VdpRect,
        _destination_video_rect: *const VdpRect,
        _layer_count: u32,
        _layers: *const c_void,
    ) -> VdpStatus {
        let mut reg = REGISTRY.lock();
        let Some(mixer_state) = reg.mixers.get(&mixer) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        let device = mixer_state.device;
        let (mw, mh) = (mixer_state.width, mixer_state.height);

        let Some(input) = reg.surfaces.get(&video_surface_current) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if input.width != mw || input.height != mh {
            return VDP_STATUS_INVALID_SIZE;
        }
        // Grayscale "processing": expand luma into the BGRA target.
        let luma = input.y.clone();
        let (w, h) = (input.width as usize, input.height as usize);

        let Some(target) = reg.output_surfaces.get_mut(&destination_surface) else {
            return VDP_STATUS_INVALID_HANDLE;
        };
        if target.width as usize != w || target.height as usize != h {
            return VDP_STATUS_INVALID_SIZE;
        }
        for (pixel, &y) in target.data.chunks_exact_mut(4).zip(luma.iter()) {
            pixel[0] = y;
            pixel[1] = y;
            pixel[2] = y;
            pixel[3] = 0xFF;
        }

        if let Some(dev) = reg.devices.get_mut(&device) {
            dev.render_count += 1;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_target_destroy(
        _target: VdpPresentationQueueTarget,
    ) -> VdpStatus {
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_create(
        device: VdpDevice,
        _target: VdpPresentationQueueTarget,
        queue: *mut VdpPresentationQueue,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        unsafe { *queue = next_handle() };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_destroy(
        _queue: VdpPresentationQueue,
    ) -> VdpStatus {
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_get_time(
        _queue: VdpPresentationQueue,
        current_time: *mut u64,
    ) -> VdpStatus {
        unsafe { *current_time = 0 };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_display(
        _queue: VdpPresentationQueue,
        _surface: VdpOutputSurface,
        _clip_width: u32,
        _clip_height: u32,
        _earliest_presentation_time: u64,
    ) -> VdpStatus {
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_block_until_surface_idle(
        _queue: VdpPresentationQueue,
        _surface: VdpOutputSurface,
        first_presentation_time: *mut u64,
    ) -> VdpStatus {
        unsafe { *first_presentation_time = 0 };
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn presentation_queue_query_surface_status(
        _queue: VdpPresentationQueue,
        _surface: VdpOutputSurface,
        status: *mut u32,
        first_presentation_time: *mut u64,
    ) -> VdpStatus {
        unsafe {
            *status = 0; // idle
            *first_presentation_time = 0;
        }
        VDP_STATUS_OK
    }

    pub(super) unsafe extern "C" fn preemption_callback_register(
        device: VdpDevice,
        _callback: Option<VdpPreemptionCallback>,
        _context: *mut c_void,
    ) -> VdpStatus {
        let reg = REGISTRY.lock();
        if !reg.devices.contains_key(&device) {
            return VDP_STATUS_INVALID_HANDLE;
        }
        VDP_STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devices_are_isolated() {
        let a = MockDevice::new();
        let b = MockDevice::builder().fail_upload(true).build();
        assert_ne!(a.handle(), b.handle());
        a.with_state(|d| assert!(!d.fail_upload));
        b.with_state(|d| assert!(d.fail_upload));
    }

    #[test]
    fn withheld_op_is_not_resolvable() {
        let dev = MockDevice::builder()
            .without_op(VdpFuncId::VideoSurfaceCreate)
            .build();
        assert!(dev
            .get_proc(dev.handle(), VdpFuncId::VideoSurfaceCreate)
            .is_none());
        assert!(dev
            .get_proc(dev.handle(), VdpFuncId::VideoSurfaceDestroy)
            .is_some());
    }

    #[test]
    fn device_destroy_refuses_while_surfaces_live() {
        let dev = MockDevice::new();
        let mut surface: VdpVideoSurface = 0;
        // SAFETY: exercising the shims directly with valid out-pointers.
        unsafe {
            assert_eq!(
                shims::video_surface_create(dev.handle(), VDP_CHROMA_TYPE_420, 16, 16, &mut surface),
                VDP_STATUS_OK
            );
            assert_eq!(shims::device_destroy(dev.handle()), VDP_STATUS_ERROR);
            assert_eq!(shims::video_surface_destroy(surface), VDP_STATUS_OK);
            assert_eq!(shims::device_destroy(dev.handle()), VDP_STATUS_OK);
        }
        assert!(dev.is_destroyed());
    }

    #[test]
    fn surface_contents_round_trip_nv12() {
        let dev = MockDevice::new();
        let mut surface: VdpVideoSurface = 0;
        let (w, h) = (8u32, 4u32);
        let y: Vec<u8> = (0..(w * h) as u8).collect();
        let uv: Vec<u8> = (100..100 + (w * h / 2) as u8).collect();
        let planes: [*const c_void; 3] = [y.as_ptr().cast(), uv.as_ptr().cast(), std::ptr::null()];
        let pitches = [w, w, 0];

        let mut y_out = vec![0u8; (w * h) as usize];
        let mut uv_out = vec![0u8; (w * h / 2) as usize];
        let dplanes: [*mut c_void; 3] = [
            y_out.as_mut_ptr().cast(),
            uv_out.as_mut_ptr().cast(),
            std::ptr::null_mut(),
        ];

        // SAFETY: valid plane buffers and pitches for an 8x4 NV12 frame.
        unsafe {
            shims::video_surface_create(dev.handle(), VDP_CHROMA_TYPE_420, w, h, &mut surface);
            assert_eq!(
                shims::video_surface_put_bits_ycbcr(
                    surface,
                    VDP_YCBCR_FORMAT_NV12,
                    planes.as_ptr(),
                    pitches.as_ptr()
                ),
                VDP_STATUS_OK
            );
            assert_eq!(
                shims::video_surface_get_bits_ycbcr(
                    surface,
                    VDP_YCBCR_FORMAT_NV12,
                    dplanes.as_ptr(),
                    pitches.as_ptr()
                ),
                VDP_STATUS_OK
            );
        }
        assert_eq!(y, y_out);
        assert_eq!(uv, uv_out);
    }
}
