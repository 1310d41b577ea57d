#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Flow filter tunables and their validation.
pub mod config;

/// Traits implemented by optical flow engines.
pub mod engine;

/// Error types for the flow module.
pub mod error;

/// Bindings to the flowfilter GPU library (feature-gated).
///
/// Requires the `cuda` feature flag, the flowfilter library and the CUDA runtime.
#[cfg(feature = "cuda")]
pub mod gpu;

pub use crate::config::FlowFilterConfig;
pub use crate::engine::{FlowColorEncoder, FlowEngine, FlowEngineFactory};
pub use crate::error::FlowError;
