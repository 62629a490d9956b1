//! End-to-end integration tests for the frame conversion pipeline.
//!
//! These tests exercise the full path — capability resolution, format
//! negotiation, pool sizing, per-frame upload/render/readback, and ordered
//! teardown — against the in-process mock device. The one test that needs a
//! real driver and an X11 display is marked `#[ignore]` so it can be run
//! explicitly on suitable machines:
//!
//! ```bash
//! cargo test -p vf-vdpau --test pipeline_integration -- --ignored
//! ```

use vf_common::{FrameError, PixelFormat, Resolution, VideoFrame};
use vf_vdpau::caps::ApiRevision;
use vf_vdpau::mock::{DestroyEvent, MockDevice};
use vf_vdpau::{DeviceContext, VdpauPipeline, POOL_DEPTH};

// ---------------------------------------------------------------------------
// Helpers: synthetic NV12 frames
// ---------------------------------------------------------------------------

/// Build an NV12 frame with a horizontal luma gradient and neutral chroma.
fn make_gradient_nv12(resolution: Resolution) -> VideoFrame {
    let mut frame = VideoFrame::try_alloc(resolution, PixelFormat::Nv12).unwrap();
    let width = resolution.width as usize;
    for line in frame.plane_mut(0).chunks_exact_mut(width) {
        for (col, px) in line.iter_mut().enumerate() {
            let t = col as f64 / (width.saturating_sub(1).max(1)) as f64;
            *px = (16.0 + t * 219.0) as u8;
        }
    }
    frame.plane_mut(1).fill(128);
    frame
}

/// Build an NV12 frame where every luma sample carries `y` and chroma is
/// neutral.
fn make_uniform_nv12(resolution: Resolution, y: u8) -> VideoFrame {
    let mut frame = VideoFrame::try_alloc(resolution, PixelFormat::Nv12).unwrap();
    frame.plane_mut(0).fill(y);
    frame.plane_mut(1).fill(128);
    frame
}

fn pipeline_over(dev: &MockDevice) -> VdpauPipeline {
    let ctx = DeviceContext::with_proc_source(dev.handle(), dev, ApiRevision::V1)
        .expect("mock resolves the full catalog");
    VdpauPipeline::new(ctx)
}

// ---------------------------------------------------------------------------
// Configure + process
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_hd_frame_keeps_geometry_and_format() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    pipeline.configure(Resolution::HD).unwrap();

    let out = pipeline.process(make_gradient_nv12(Resolution::HD)).unwrap();
    assert_eq!(out.resolution(), Resolution::HD);
    assert_eq!(out.format(), PixelFormat::Nv12);
    assert_eq!(pipeline.frames_processed(), 1);
}

#[test]
fn reported_format_is_the_single_negotiated_one() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    assert_eq!(pipeline.negotiate_formats(), &[PixelFormat::Nv12][..]);

    pipeline.configure(Resolution::new(640, 480)).unwrap();
    let active = pipeline.active_format().unwrap();
    assert_eq!(active.pixel, PixelFormat::Nv12);
}

#[test]
fn every_render_pass_reaches_the_mixer() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(128, 96);
    pipeline.configure(res).unwrap();

    for i in 0..5u8 {
        pipeline.process(make_uniform_nv12(res, i)).unwrap();
    }
    assert_eq!(dev.render_count(), 5);
}

#[test]
fn pool_is_a_lag_window_over_the_last_inputs() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();

    // The pool was pre-filled with blank frames at configure, so the first
    // POOL_DEPTH outputs carry blank luma; the next output carries the
    // first input, which has slid to the front of the window by then.
    for _ in 0..POOL_DEPTH {
        let out = pipeline.process(make_uniform_nv12(res, 200)).unwrap();
        assert!(out.plane(0).iter().all(|&y| y == 0), "pre-fill is blank");
    }
    let out = pipeline.process(make_uniform_nv12(res, 50)).unwrap();
    assert!(out.plane(0).iter().all(|&y| y == 200));
}

#[test]
fn process_keeps_surfaces_bounded() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();

    for i in 0..16u8 {
        pipeline.process(make_uniform_nv12(res, i)).unwrap();
    }
    // Only the persistent render target remains between frames.
    assert_eq!(dev.live_surface_count(), 1);

    pipeline.teardown();
    assert_eq!(dev.live_surface_count(), 0);
}

// ---------------------------------------------------------------------------
// Per-frame failures are recoverable
// ---------------------------------------------------------------------------

#[test]
fn upload_failure_skips_the_frame_but_not_the_stream() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();

    dev.set_fail_upload(true);
    let err = pipeline.process(make_uniform_nv12(res, 1)).unwrap_err();
    assert!(matches!(err, FrameError::Upload(_)));
    // The failed frame's surface was destroyed, not leaked.
    assert_eq!(dev.live_surface_count(), 1);

    dev.set_fail_upload(false);
    pipeline.process(make_uniform_nv12(res, 2)).unwrap();
    assert_eq!(pipeline.frames_processed(), 1);
}

#[test]
fn download_failure_skips_the_frame_but_not_the_stream() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();

    dev.set_fail_download(true);
    let err = pipeline.process(make_uniform_nv12(res, 1)).unwrap_err();
    assert!(matches!(err, FrameError::Download(_)));

    dev.set_fail_download(false);
    pipeline.process(make_uniform_nv12(res, 2)).unwrap();
}

#[test]
fn surface_create_failure_skips_the_frame_but_not_the_stream() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();

    dev.set_fail_surface_create(true);
    let err = pipeline.process(make_uniform_nv12(res, 1)).unwrap_err();
    assert!(matches!(err, FrameError::SurfaceCreate(_)));

    dev.set_fail_surface_create(false);
    pipeline.process(make_uniform_nv12(res, 2)).unwrap();
}

#[test]
fn failed_frames_still_advance_the_window() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();

    // Three failed uploads push the tagged frames through the window
    // anyway; the fourth (successful) frame reads the first one back.
    dev.set_fail_upload(true);
    for tag in [10, 11, 12] {
        let _ = pipeline.process(make_uniform_nv12(res, tag)).unwrap_err();
    }
    dev.set_fail_upload(false);
    let out = pipeline.process(make_uniform_nv12(res, 13)).unwrap();
    assert!(out.plane(0).iter().all(|&y| y == 10));
}

#[test]
fn mismatched_geometry_is_frame_scoped() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    pipeline.configure(Resolution::new(128, 96)).unwrap();

    let err = pipeline
        .process(make_uniform_nv12(Resolution::new(64, 48), 7))
        .unwrap_err();
    assert!(matches!(err, FrameError::SurfaceCreate(_)));

    pipeline
        .process(make_uniform_nv12(Resolution::new(128, 96), 8))
        .unwrap();
}

// ---------------------------------------------------------------------------
// Teardown ordering
// ---------------------------------------------------------------------------

#[test]
fn teardown_destroys_surfaces_then_mixer_then_device() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    let res = Resolution::new(64, 48);
    pipeline.configure(res).unwrap();
    pipeline.process(make_uniform_nv12(res, 1)).unwrap();
    pipeline.teardown();

    let events = dev.destroy_events();
    let mixer_at = events
        .iter()
        .position(|e| matches!(e, DestroyEvent::Mixer(_)))
        .expect("mixer destroyed");
    let device_at = events
        .iter()
        .position(|e| matches!(e, DestroyEvent::Device))
        .expect("device destroyed");

    for (i, event) in events.iter().enumerate() {
        if matches!(
            event,
            DestroyEvent::Surface(_) | DestroyEvent::OutputSurface(_)
        ) {
            assert!(i < mixer_at, "surface destroyed after mixer: {events:?}");
        }
    }
    assert!(mixer_at < device_at, "mixer destroyed after device");
    assert!(dev.is_destroyed());
}

#[test]
fn teardown_is_idempotent_and_runs_on_drop() {
    let dev = MockDevice::new();
    let mut pipeline = pipeline_over(&dev);
    pipeline.configure(Resolution::new(64, 48)).unwrap();
    pipeline.teardown();
    pipeline.teardown();
    drop(pipeline);
    assert_eq!(dev.device_destroy_count(), 1);
}

// ---------------------------------------------------------------------------
// Real hardware (run explicitly with --ignored)
// ---------------------------------------------------------------------------

#[test]
#[ignore = "requires a VDPAU driver and an X11 display"]
fn open_real_device_pipeline() {
    let config = vf_common::PipelineConfig::default();
    let mut pipeline =
        vf_vdpau::pipeline::open(&config, ApiRevision::V1).expect("driver present");
    pipeline.configure(Resolution::HD).expect("configure");
    let out = pipeline
        .process(make_gradient_nv12(Resolution::HD))
        .expect("process");
    assert_eq!(out.resolution(), Resolution::HD);
    pipeline.teardown();
}
