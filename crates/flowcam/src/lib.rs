#![deny(missing_docs)]
//! Dense optical flow visualization for video files and cameras.
//!
//! Frames are read from a [`io::FrameSource`], converted to grayscale, fed to
//! a [`flow::FlowEngine`] and the color encoded flow field is shown through a
//! [`display::Display`] sink. See [`pipeline::FlowPipeline`] for the loop.

/// Sinks the capture loop shows its panels on.
pub mod display;

/// Per-channel histogram plot of the encoded flow.
pub mod diagnostics;

/// The capture, compute and display loop.
pub mod pipeline;

#[doc(inline)]
pub use flowcam_image as image;

#[doc(inline)]
pub use flowcam_imgproc as imgproc;

#[doc(inline)]
pub use flowcam_io as io;

#[doc(inline)]
pub use flowcam_flow as flow;
