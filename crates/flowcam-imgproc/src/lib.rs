#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// utilities to draw on images.
pub mod draw;

/// compute image histogram module.
pub mod histogram;

/// module containing parallization utilities.
pub mod parallel;
