//! Capability catalog and resolver.
//!
//! VDPAU exposes almost its entire API through a per-device
//! `get_proc_address` callback rather than through shared-library exports.
//! This module declares the fixed catalog of operations the pipeline binds
//! ([`VdpFuncId`]) and resolves each of them to a typed function pointer in
//! one pass at device creation ([`CapabilityTable::resolve`]).
//!
//! Every operation invoked later in the pipeline must have resolved
//! successfully up front — a missing unconditional entry is a fatal
//! initialization error naming the operation, never a runtime surprise.
//! Revision-conditional entries resolve to `None` instead of failing, and
//! their availability is queryable through [`CapabilityTable::has`].

use std::ffi::c_void;

use tracing::debug;

use vf_common::InitError;

use crate::ffi::*;

/// Raw entry point as handed out by a [`ProcSource`].
pub type RawProc = *const c_void;

/// Requested VDPAU API revision.
///
/// Older deployments only implement revision 0 of the dispatch surface;
/// the entries introduced with revision 1 are resolved conditionally.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApiRevision {
    V0,
    V1,
}

/// Stable identifiers for the operations in the capability catalog.
///
/// Discriminants match the VDPAU function-id namespace, so a value can be
/// passed straight to `get_proc_address` on the wire.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VdpFuncId {
    GetErrorString = 0,
    GetApiVersion = 2,
    GetInformationString = 4,
    DeviceDestroy = 5,
    GenerateCscMatrix = 6,
    VideoSurfaceQueryCapabilities = 7,
    VideoSurfaceQueryGetPutBitsYCbCrCapabilities = 8,
    VideoSurfaceCreate = 9,
    VideoSurfaceDestroy = 10,
    VideoSurfaceGetParameters = 11,
    VideoSurfaceGetBitsYCbCr = 12,
    VideoSurfacePutBitsYCbCr = 13,
    OutputSurfaceQueryCapabilities = 14,
    OutputSurfaceQueryGetPutBitsNativeCapabilities = 15,
    OutputSurfaceQueryPutBitsYCbCrCapabilities = 17,
    OutputSurfaceCreate = 18,
    OutputSurfaceDestroy = 19,
    OutputSurfaceGetParameters = 20,
    OutputSurfaceGetBitsNative = 21,
    OutputSurfacePutBitsNative = 22,
    OutputSurfacePutBitsYCbCr = 24,
    OutputSurfaceRenderOutputSurface = 33,
    VideoMixerQueryFeatureSupport = 36,
    VideoMixerQueryParameterSupport = 37,
    VideoMixerQueryAttributeSupport = 38,
    VideoMixerQueryParameterValueRange = 39,
    VideoMixerQueryAttributeValueRange = 40,
    VideoMixerCreate = 41,
    VideoMixerSetFeatureEnables = 42,
    VideoMixerSetAttributeValues = 43,
    VideoMixerGetFeatureSupport = 44,
    VideoMixerGetFeatureEnables = 45,
    VideoMixerDestroy = 47,
    VideoMixerRender = 48,
    PresentationQueueTargetDestroy = 49,
    PresentationQueueCreate = 50,
    PresentationQueueDestroy = 51,
    PresentationQueueGetTime = 62,
    PresentationQueueDisplay = 63,
    PresentationQueueBlockUntilSurfaceIdle = 64,
    PresentationQueueQuerySurfaceStatus = 65,
    PreemptionCallbackRegister = 66,
}

impl VdpFuncId {
    /// Wire value for `get_proc_address`.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Human-readable operation name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetErrorString => "GetErrorString",
            Self::GetApiVersion => "GetApiVersion",
            Self::GetInformationString => "GetInformationString",
            Self::DeviceDestroy => "DeviceDestroy",
            Self::GenerateCscMatrix => "GenerateCscMatrix",
            Self::VideoSurfaceQueryCapabilities => "VideoSurfaceQueryCapabilities",
            Self::VideoSurfaceQueryGetPutBitsYCbCrCapabilities => {
                "VideoSurfaceQueryGetPutBitsYCbCrCapabilities"
            }
            Self::VideoSurfaceCreate => "VideoSurfaceCreate",
            Self::VideoSurfaceDestroy => "VideoSurfaceDestroy",
            Self::VideoSurfaceGetParameters => "VideoSurfaceGetParameters",
            Self::VideoSurfaceGetBitsYCbCr => "VideoSurfaceGetBitsYCbCr",
            Self::VideoSurfacePutBitsYCbCr => "VideoSurfacePutBitsYCbCr",
            Self::OutputSurfaceQueryCapabilities => "OutputSurfaceQueryCapabilities",
            Self::OutputSurfaceQueryGetPutBitsNativeCapabilities => {
                "OutputSurfaceQueryGetPutBitsNativeCapabilities"
            }
            Self::OutputSurfaceQueryPutBitsYCbCrCapabilities => {
                "OutputSurfaceQueryPutBitsYCbCrCapabilities"
            }
            Self::OutputSurfaceCreate => "OutputSurfaceCreate",
            Self::OutputSurfaceDestroy => "OutputSurfaceDestroy",
            Self::OutputSurfaceGetParameters => "OutputSurfaceGetParameters",
            Self::OutputSurfaceGetBitsNative => "OutputSurfaceGetBitsNative",
            Self::OutputSurfacePutBitsNative => "OutputSurfacePutBitsNative",
            Self::OutputSurfacePutBitsYCbCr => "OutputSurfacePutBitsYCbCr",
            Self::OutputSurfaceRenderOutputSurface => "OutputSurfaceRenderOutputSurface",
            Self::VideoMixerQueryFeatureSupport => "VideoMixerQueryFeatureSupport",
            Self::VideoMixerQueryParameterSupport => "VideoMixerQueryParameterSupport",
            Self::VideoMixerQueryAttributeSupport => "VideoMixerQueryAttributeSupport",
            Self::VideoMixerQueryParameterValueRange => "VideoMixerQueryParameterValueRange",
            Self::VideoMixerQueryAttributeValueRange => "VideoMixerQueryAttributeValueRange",
            Self::VideoMixerCreate => "VideoMixerCreate",
            Self::VideoMixerSetFeatureEnables => "VideoMixerSetFeatureEnables",
            Self::VideoMixerSetAttributeValues => "VideoMixerSetAttributeValues",
            Self::VideoMixerGetFeatureSupport => "VideoMixerGetFeatureSupport",
            Self::VideoMixerGetFeatureEnables => "VideoMixerGetFeatureEnables",
            Self::VideoMixerDestroy => "VideoMixerDestroy",
            Self::VideoMixerRender => "VideoMixerRender",
            Self::PresentationQueueTargetDestroy => "PresentationQueueTargetDestroy",
            Self::PresentationQueueCreate => "PresentationQueueCreate",
            Self::PresentationQueueDestroy => "PresentationQueueDestroy",
            Self::PresentationQueueGetTime => "PresentationQueueGetTime",
            Self::PresentationQueueDisplay => "PresentationQueueDisplay",
            Self::PresentationQueueBlockUntilSurfaceIdle => {
                "PresentationQueueBlockUntilSurfaceIdle"
            }
            Self::PresentationQueueQuerySurfaceStatus => "PresentationQueueQuerySurfaceStatus",
            Self::PreemptionCallbackRegister => "PreemptionCallbackRegister",
        }
    }

    /// The revision this operation first appeared in, if it is
    /// revision-conditional. `None` means unconditional.
    pub fn since(self) -> Option<ApiRevision> {
        match self {
            Self::PresentationQueueQuerySurfaceStatus | Self::PreemptionCallbackRegister => {
                Some(ApiRevision::V1)
            }
            _ => None,
        }
    }

    /// Whether this entry participates in resolution under `revision`.
    pub fn available_in(self, revision: ApiRevision) -> bool {
        match self.since() {
            Some(min) => revision >= min,
            None => true,
        }
    }
}

/// The fixed operation catalog, in resolution order.
///
/// Entry count is fixed at build time; resolution walks this list and the
/// first unconditional miss aborts initialization.
pub const CATALOG: [VdpFuncId; 42] = [
    VdpFuncId::GetErrorString,
    VdpFuncId::GetApiVersion,
    VdpFuncId::GetInformationString,
    VdpFuncId::DeviceDestroy,
    VdpFuncId::GenerateCscMatrix,
    VdpFuncId::VideoSurfaceQueryCapabilities,
    VdpFuncId::VideoSurfaceQueryGetPutBitsYCbCrCapabilities,
    VdpFuncId::VideoSurfaceCreate,
    VdpFuncId::VideoSurfaceDestroy,
    VdpFuncId::VideoSurfaceGetParameters,
    VdpFuncId::VideoSurfaceGetBitsYCbCr,
    VdpFuncId::VideoSurfacePutBitsYCbCr,
    VdpFuncId::OutputSurfaceQueryCapabilities,
    VdpFuncId::OutputSurfaceQueryGetPutBitsNativeCapabilities,
    VdpFuncId::OutputSurfaceQueryPutBitsYCbCrCapabilities,
    VdpFuncId::OutputSurfaceCreate,
    VdpFuncId::OutputSurfaceDestroy,
    VdpFuncId::OutputSurfaceGetParameters,
    VdpFuncId::OutputSurfaceGetBitsNative,
    VdpFuncId::OutputSurfacePutBitsNative,
    VdpFuncId::OutputSurfacePutBitsYCbCr,
    VdpFuncId::OutputSurfaceRenderOutputSurface,
    VdpFuncId::VideoMixerQueryFeatureSupport,
    VdpFuncId::VideoMixerQueryParameterSupport,
    VdpFuncId::VideoMixerQueryAttributeSupport,
    VdpFuncId::VideoMixerQueryParameterValueRange,
    VdpFuncId::VideoMixerQueryAttributeValueRange,
    VdpFuncId::VideoMixerCreate,
    VdpFuncId::VideoMixerSetFeatureEnables,
    VdpFuncId::VideoMixerSetAttributeValues,
    VdpFuncId::VideoMixerGetFeatureSupport,
    VdpFuncId::VideoMixerGetFeatureEnables,
    VdpFuncId::VideoMixerDestroy,
    VdpFuncId::VideoMixerRender,
    VdpFuncId::PresentationQueueTargetDestroy,
    VdpFuncId::PresentationQueueCreate,
    VdpFuncId::PresentationQueueDestroy,
    VdpFuncId::PresentationQueueGetTime,
    VdpFuncId::PresentationQueueDisplay,
    VdpFuncId::PresentationQueueBlockUntilSurfaceIdle,
    VdpFuncId::PresentationQueueQuerySurfaceStatus,
    VdpFuncId::PreemptionCallbackRegister,
];

/// Source of resolved entry points for a live device.
///
/// The real path wraps the `vdp_get_proc_address` callback returned at
/// device creation; the mock device substitutes its own lookup. `None`
/// means the device does not implement the operation.
pub trait ProcSource {
    fn get_proc(&self, device: VdpDevice, func: VdpFuncId) -> Option<RawProc>;
}

/// The resolved capability table — one typed callable per catalog entry.
///
/// Built once per device and immutable afterwards. Revision-conditional
/// entries are `Option` fields; everything else is guaranteed callable.
pub struct CapabilityTable {
    pub get_error_string: VdpGetErrorString,
    pub get_api_version: VdpGetApiVersion,
    pub get_information_string: VdpGetInformationString,
    pub device_destroy: VdpDeviceDestroy,
    pub generate_csc_matrix: VdpGenerateCscMatrix,
    pub video_surface_query_capabilities: VdpVideoSurfaceQueryCapabilities,
    pub video_surface_query_get_put_bits_ycbcr_capabilities:
        VdpVideoSurfaceQueryGetPutBitsYCbCrCapabilities,
    pub video_surface_create: VdpVideoSurfaceCreate,
    pub video_surface_destroy: VdpVideoSurfaceDestroy,
    pub video_surface_get_parameters: VdpVideoSurfaceGetParameters,
    pub video_surface_get_bits_ycbcr: VdpVideoSurfaceGetBitsYCbCr,
    pub video_surface_put_bits_ycbcr: VdpVideoSurfacePutBitsYCbCr,
    pub output_surface_query_capabilities: VdpOutputSurfaceQueryCapabilities,
    pub output_surface_query_get_put_bits_native_capabilities:
        VdpOutputSurfaceQueryGetPutBitsNativeCapabilities,
    pub output_surface_query_put_bits_ycbcr_capabilities:
        VdpOutputSurfaceQueryPutBitsYCbCrCapabilities,
    pub output_surface_create: VdpOutputSurfaceCreate,
    pub output_surface_destroy: VdpOutputSurfaceDestroy,
    pub output_surface_get_parameters: VdpOutputSurfaceGetParameters,
    pub output_surface_get_bits_native: VdpOutputSurfaceGetBitsNative,
    pub output_surface_put_bits_native: VdpOutputSurfacePutBitsNative,
    pub output_surface_put_bits_ycbcr: VdpOutputSurfacePutBitsYCbCr,
    pub output_surface_render_output_surface: VdpOutputSurfaceRenderOutputSurface,
    pub video_mixer_query_feature_support: VdpVideoMixerQueryFeatureSupport,
    pub video_mixer_query_parameter_support: VdpVideoMixerQueryParameterSupport,
    pub video_mixer_query_attribute_support: VdpVideoMixerQueryAttributeSupport,
    pub video_mixer_query_parameter_value_range: VdpVideoMixerQueryParameterValueRange,
    pub video_mixer_query_attribute_value_range: VdpVideoMixerQueryAttributeValueRange,
    pub video_mixer_create: VdpVideoMixerCreate,
    pub video_mixer_set_feature_enables: VdpVideoMixerSetFeatureEnables,
    pub video_mixer_set_attribute_values: VdpVideoMixerSetAttributeValues,
    pub video_mixer_get_feature_support: VdpVideoMixerGetFeatureSupport,
    pub video_mixer_get_feature_enables: VdpVideoMixerGetFeatureEnables,
    pub video_mixer_destroy: VdpVideoMixerDestroy,
    pub video_mixer_render: VdpVideoMixerRender,
    pub presentation_queue_target_destroy: VdpPresentationQueueTargetDestroy,
    pub presentation_queue_create: VdpPresentationQueueCreate,
    pub presentation_queue_destroy: VdpPresentationQueueDestroy,
    pub presentation_queue_get_time: VdpPresentationQueueGetTime,
    pub presentation_queue_display: VdpPresentationQueueDisplay,
    pub presentation_queue_block_until_surface_idle: VdpPresentationQueueBlockUntilSurfaceIdle,
    pub presentation_queue_query_surface_status: Option<VdpPresentationQueueQuerySurfaceStatus>,
    pub preemption_callback_register: Option<VdpPreemptionCallbackRegister>,
}

impl std::fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityTable")
            .field("resolved", &CATALOG.len())
            .field(
                "query_surface_status",
                &self.presentation_queue_query_surface_status.is_some(),
            )
            .field(
                "preemption_callback",
                &self.preemption_callback_register.is_some(),
            )
            .finish()
    }
}

impl CapabilityTable {
    /// Resolve the full catalog against a live device.
    ///
    /// Entries are bound in catalog order. The first unconditional entry
    /// the source cannot supply aborts with
    /// [`InitError::CapabilityResolution`] naming that operation.
    /// Revision-conditional entries are skipped under an older revision and
    /// tolerated missing under a newer one. Resolution has no side effects
    /// and is idempotent against the same device.
    pub fn resolve(
        source: &dyn ProcSource,
        device: VdpDevice,
        revision: ApiRevision,
    ) -> Result<Self, InitError> {
        // Binds one unconditional catalog entry, converting the raw entry
        // point to the typed alias of the field being initialized.
        macro_rules! required {
            ($id:expr) => {
                match source.get_proc(device, $id) {
                    // SAFETY: the ProcSource contract guarantees the pointer
                    // returned for $id is the entry point whose C signature
                    // matches the alias of the field being assigned.
                    Some(p) => unsafe { std::mem::transmute(p) },
                    None => {
                        return Err(InitError::CapabilityResolution { op: $id.name() });
                    }
                }
            };
        }

        // Binds a revision-conditional entry; absence is never fatal.
        macro_rules! gated {
            ($id:expr) => {
                if $id.available_in(revision) {
                    // SAFETY: as above.
                    source
                        .get_proc(device, $id)
                        .map(|p| unsafe { std::mem::transmute(p) })
                } else {
                    None
                }
            };
        }

        // Field initializers run in written order, which matches CATALOG.
        let table = Self {
            get_error_string: required!(VdpFuncId::GetErrorString),
            get_api_version: required!(VdpFuncId::GetApiVersion),
            get_information_string: required!(VdpFuncId::GetInformationString),
            device_destroy: required!(VdpFuncId::DeviceDestroy),
            generate_csc_matrix: required!(VdpFuncId::GenerateCscMatrix),
            video_surface_query_capabilities: required!(VdpFuncId::VideoSurfaceQueryCapabilities),
            video_surface_query_get_put_bits_ycbcr_capabilities: required!(
                VdpFuncId::VideoSurfaceQueryGetPutBitsYCbCrCapabilities
            ),
            video_surface_create: required!(VdpFuncId::VideoSurfaceCreate),
            video_surface_destroy: required!(VdpFuncId::VideoSurfaceDestroy),
            video_surface_get_parameters: required!(VdpFuncId::VideoSurfaceGetParameters),
            video_surface_get_bits_ycbcr: required!(VdpFuncId::VideoSurfaceGetBitsYCbCr),
            video_surface_put_bits_ycbcr: required!(VdpFuncId::VideoSurfacePutBitsYCbCr),
            output_surface_query_capabilities: required!(VdpFuncId::OutputSurfaceQueryCapabilities),
            output_surface_query_get_put_bits_native_capabilities: required!(
                VdpFuncId::OutputSurfaceQueryGetPutBitsNativeCapabilities
            ),
            output_surface_query_put_bits_ycbcr_capabilities: required!(
                VdpFuncId::OutputSurfaceQueryPutBitsYCbCrCapabilities
            ),
            output_surface_create: required!(VdpFuncId::OutputSurfaceCreate),
            output_surface_destroy: required!(VdpFuncId::OutputSurfaceDestroy),
            output_surface_get_parameters: required!(VdpFuncId::OutputSurfaceGetParameters),
            output_surface_get_bits_native: required!(VdpFuncId::OutputSurfaceGetBitsNative),
            output_surface_put_bits_native: required!(VdpFuncId::OutputSurfacePutBitsNative),
            output_surface_put_bits_ycbcr: required!(VdpFuncId::OutputSurfacePutBitsYCbCr),
            output_surface_render_output_surface: required!(
                VdpFuncId::OutputSurfaceRenderOutputSurface
            ),
            video_mixer_query_feature_support: required!(VdpFuncId::VideoMixerQueryFeatureSupport),
            video_mixer_query_parameter_support: required!(
                VdpFuncId::VideoMixerQueryParameterSupport
            ),
            video_mixer_query_attribute_support: required!(
                VdpFuncId::VideoMixerQueryAttributeSupport
            ),
            video_mixer_query_parameter_value_range: required!(
                VdpFuncId::VideoMixerQueryParameterValueRange
            ),
            video_mixer_query_attribute_value_range: required!(
                VdpFuncId::VideoMixerQueryAttributeValueRange
            ),
            video_mixer_create: required!(VdpFuncId::VideoMixerCreate),
            video_mixer_set_feature_enables: required!(VdpFuncId::VideoMixerSetFeatureEnables),
            video_mixer_set_attribute_values: required!(VdpFuncId::VideoMixerSetAttributeValues),
            video_mixer_get_feature_support: required!(VdpFuncId::VideoMixerGetFeatureSupport),
            video_mixer_get_feature_enables: required!(VdpFuncId::VideoMixerGetFeatureEnables),
            video_mixer_destroy: required!(VdpFuncId::VideoMixerDestroy),
            video_mixer_render: required!(VdpFuncId::VideoMixerRender),
            presentation_queue_target_destroy: required!(
                VdpFuncId::PresentationQueueTargetDestroy
            ),
            presentation_queue_create: required!(VdpFuncId::PresentationQueueCreate),
            presentation_queue_destroy: required!(VdpFuncId::PresentationQueueDestroy),
            presentation_queue_get_time: required!(VdpFuncId::PresentationQueueGetTime),
            presentation_queue_display: required!(VdpFuncId::PresentationQueueDisplay),
            presentation_queue_block_until_surface_idle: required!(
                VdpFuncId::PresentationQueueBlockUntilSurfaceIdle
            ),
            presentation_queue_query_surface_status: gated!(
                VdpFuncId::PresentationQueueQuerySurfaceStatus
            ),
            preemption_callback_register: gated!(VdpFuncId::PreemptionCallbackRegister),
        };

        debug!(
            device,
            revision = ?revision,
            entries = CATALOG.len(),
            "Capability catalog resolved"
        );

        Ok(table)
    }

    /// Whether the table holds a callable for `func`.
    ///
    /// Unconditional entries are always present once resolution succeeded;
    /// revision-conditional entries must be checked here before use.
    pub fn has(&self, func: VdpFuncId) -> bool {
        match func {
            VdpFuncId::PresentationQueueQuerySurfaceStatus => {
                self.presentation_queue_query_surface_status.is_some()
            }
            VdpFuncId::PreemptionCallbackRegister => self.preemption_callback_register.is_some(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;

    #[test]
    fn catalog_ids_are_unique_and_ordered() {
        for pair in CATALOG.windows(2) {
            assert!(
                pair[0].id() < pair[1].id(),
                "catalog must be sorted by function id: {:?} >= {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn catalog_names_are_nonempty() {
        for func in CATALOG {
            assert!(!func.name().is_empty());
        }
    }

    #[test]
    fn only_two_entries_are_revision_gated() {
        let gated: Vec<_> = CATALOG.iter().filter(|f| f.since().is_some()).collect();
        assert_eq!(gated.len(), 2);
        for func in gated {
            assert!(!func.available_in(ApiRevision::V0));
            assert!(func.available_in(ApiRevision::V1));
        }
    }

    #[test]
    fn full_catalog_resolves_against_mock() {
        let dev = MockDevice::new();
        let table = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V1).unwrap();
        assert!(table.has(VdpFuncId::VideoSurfaceCreate));
        assert!(table.has(VdpFuncId::PreemptionCallbackRegister));
    }

    #[test]
    fn missing_unconditional_op_is_fatal_and_named() {
        let dev = MockDevice::builder()
            .without_op(VdpFuncId::VideoMixerCreate)
            .build();
        let err = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V1).unwrap_err();
        match err {
            InitError::CapabilityResolution { op } => assert_eq!(op, "VideoMixerCreate"),
            other => panic!("expected CapabilityResolution, got {other:?}"),
        }
    }

    #[test]
    fn first_missing_op_in_catalog_order_is_reported() {
        // Withhold two operations; the earlier catalog entry must win.
        let dev = MockDevice::builder()
            .without_op(VdpFuncId::VideoMixerRender)
            .without_op(VdpFuncId::VideoSurfaceCreate)
            .build();
        let err = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V1).unwrap_err();
        match err {
            InitError::CapabilityResolution { op } => assert_eq!(op, "VideoSurfaceCreate"),
            other => panic!("expected CapabilityResolution, got {other:?}"),
        }
    }

    #[test]
    fn gated_entries_skipped_under_old_revision() {
        let dev = MockDevice::new();
        let table = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V0).unwrap();
        assert!(!table.has(VdpFuncId::PresentationQueueQuerySurfaceStatus));
        assert!(!table.has(VdpFuncId::PreemptionCallbackRegister));
    }

    #[test]
    fn gated_entry_missing_on_device_is_not_fatal() {
        let dev = MockDevice::builder()
            .without_op(VdpFuncId::PreemptionCallbackRegister)
            .build();
        let table = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V1).unwrap();
        assert!(!table.has(VdpFuncId::PreemptionCallbackRegister));
        // The other gated entry still resolved.
        assert!(table.has(VdpFuncId::PresentationQueueQuerySurfaceStatus));
    }

    #[test]
    fn resolution_is_idempotent() {
        let dev = MockDevice::new();
        let first = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V1).unwrap();
        let second = CapabilityTable::resolve(&dev, dev.handle(), ApiRevision::V1).unwrap();
        assert_eq!(
            first.video_surface_create as usize,
            second.video_surface_create as usize
        );
    }
}
