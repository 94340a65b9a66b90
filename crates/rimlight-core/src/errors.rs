use thiserror::Error;

#[derive(Error, Debug)]
pub enum RimlightError {
    #[error("Configuration invalid: {reason}")]
    ConfigurationInvalid { reason: String },

    #[error("Screen-cast permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("Capture stream error: {reason}")]
    CaptureFailed { reason: String },

    #[error("Sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised at the sampler boundary.
///
/// The sampling computation itself is total; the only failure is a frame
/// buffer that does not match the negotiated geometry, which indicates a
/// contract breach by the frame source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    #[error("Frame buffer is {actual} bytes, expected {expected} (geometry mismatch)")]
    FrameSizeMismatch { expected: usize, actual: usize },
}
