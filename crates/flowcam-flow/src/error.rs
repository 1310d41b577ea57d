use flowcam_image::{FrameGeometry, ImageError};

/// An error type for the flow module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FlowError {
    /// The filter tunables are inconsistent.
    #[error("Invalid flow filter configuration: {0}")]
    Config(String),

    /// A call into the flow backend failed.
    #[error("Flow backend call `{op}` failed with status {code}")]
    Backend {
        /// The failing operation.
        op: &'static str,
        /// The status code returned by the backend.
        code: i32,
    },

    /// A descriptor does not match the layout the engine expects.
    #[error("Descriptor geometry mismatch: expected {expected:?}, got {actual:?}")]
    GeometryMismatch {
        /// The geometry the engine was built for.
        expected: FrameGeometry,
        /// The geometry of the descriptor passed in.
        actual: FrameGeometry,
    },

    /// Error from the image module.
    #[error(transparent)]
    Image(#[from] ImageError),
}
