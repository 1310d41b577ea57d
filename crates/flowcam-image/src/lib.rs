#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for host-side pixel buffers.
pub mod image;

/// zero-copy descriptors over host images.
pub mod descriptor;

/// Error types for the image module.
pub mod error;

pub use crate::descriptor::{FrameDescriptor, FrameDescriptorMut, FrameGeometry, RawImage};
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};
