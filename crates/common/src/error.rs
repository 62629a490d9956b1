//! Central error types for the pipeline (thiserror-based).

use thiserror::Error;

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("initialization error: {0}")]
    Init(#[from] InitError),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal initialization-phase errors — the stream cannot start.
#[derive(Error, Debug)]
pub enum InitError {
    /// An unconditional catalog operation failed to resolve. Carries the
    /// operation's name for diagnostics.
    #[error("capability resolution failed for operation `{op}`")]
    CapabilityResolution { op: &'static str },

    #[error("hardware device creation on display {display} failed: {reason}")]
    DeviceOpen { display: String, reason: String },

    /// No candidate in the format preference list is supported by the device.
    #[error("no supported surface format among the negotiated candidates")]
    UnsupportedFormat,

    #[error("video mixer creation failed: {0}")]
    MixerCreate(String),
}

/// Frame-scoped errors — the current frame is skipped, the stream continues.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("video surface creation failed: {0}")]
    SurfaceCreate(String),

    #[error("surface upload failed: {0}")]
    Upload(String),

    #[error("surface readback failed: {0}")]
    Download(String),

    #[error("host frame allocation failed: {0} bytes")]
    OutOfMemory(usize),
}

/// Convenience Result type for pipeline operations.
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_error_names_failing_operation() {
        let err = InitError::CapabilityResolution {
            op: "VideoSurfaceCreate",
        };
        assert!(err.to_string().contains("VideoSurfaceCreate"));
    }

    #[test]
    fn device_open_reports_display_identity() {
        let err = InitError::DeviceOpen {
            display: ":0.0".into(),
            reason: "connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(":0.0"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn errors_convert_to_top_level() {
        let init: FilterError = InitError::UnsupportedFormat.into();
        assert!(matches!(init, FilterError::Init(_)));

        let frame: FilterError = FrameError::Upload("io".into()).into();
        assert!(matches!(frame, FilterError::Frame(_)));
    }
}
