#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for video sources.
pub mod error;

/// Frame rate counter for video processing.
///
/// Track and measure frames per second (FPS) during video capture and processing.
pub mod fps_counter;

/// Source specification and the frame source trait.
///
/// See [`source::FrameSource`] for the contract every video source follows.
pub mod source;

/// GStreamer video capture for files and cameras (feature-gated).
///
/// Requires the `gstreamer` feature flag and system GStreamer libraries.
/// See [`gstreamer::VideoCapture`].
#[cfg(feature = "gstreamer")]
pub mod gstreamer;

pub use crate::error::StreamError;
pub use crate::source::{FrameSource, SourceSpec};
