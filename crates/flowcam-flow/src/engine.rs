use flowcam_image::{FrameDescriptor, FrameDescriptorMut, FrameGeometry};

use crate::{config::FlowFilterConfig, error::FlowError};

/// Geometry of the grayscale `u8` frames an engine accepts.
pub fn gray_geometry(height: usize, width: usize) -> FrameGeometry {
    FrameGeometry {
        height,
        width,
        depth: 1,
        pitch: width,
        item_size: 1,
    }
}

/// Geometry of the two channel `f32` flow field an engine produces.
pub fn flow_geometry(height: usize, width: usize) -> FrameGeometry {
    FrameGeometry {
        height,
        width,
        depth: 2,
        pitch: width * 2 * std::mem::size_of::<f32>(),
        item_size: std::mem::size_of::<f32>(),
    }
}

/// Geometry of the four channel `u8` color encoding of the flow field.
pub fn color_geometry(height: usize, width: usize) -> FrameGeometry {
    FrameGeometry {
        height,
        width,
        depth: 4,
        pitch: width * 4,
        item_size: 1,
    }
}

/// Check that a descriptor geometry matches the one an engine was built for.
///
/// # Errors
///
/// Returns [`FlowError::GeometryMismatch`] if any field differs.
pub fn check_geometry(expected: FrameGeometry, actual: FrameGeometry) -> Result<(), FlowError> {
    if expected != actual {
        return Err(FlowError::GeometryMismatch { expected, actual });
    }
    Ok(())
}

/// A stateful optical flow estimator fed one grayscale frame at a time.
///
/// The engine keeps the flow of the previous step as a prior, so the order of
/// [`FlowEngine::load_image`] and [`FlowEngine::compute`] calls matters. The
/// flow of an iteration is only valid after `compute` returned.
pub trait FlowEngine {
    /// The color encoder bound to this engine's flow output.
    type Encoder: FlowColorEncoder;

    /// Set the clamp of the flow magnitude.
    fn set_max_flow(&mut self, max_flow: f32) -> Result<(), FlowError>;

    /// Set the smoothness weight of each pyramid level.
    fn set_gamma(&mut self, gamma: &[f32]) -> Result<(), FlowError>;

    /// Set the smoothing iterations of each pyramid level.
    fn set_smooth_iterations(&mut self, iterations: &[u32]) -> Result<(), FlowError>;

    /// Upload a grayscale frame. The descriptor must match [`gray_geometry`].
    fn load_image(&mut self, image: &FrameDescriptor<'_>) -> Result<(), FlowError>;

    /// Run one filter step on the last loaded frame.
    fn compute(&mut self) -> Result<(), FlowError>;

    /// Copy the current flow field into a host buffer matching [`flow_geometry`].
    fn download_flow(&mut self, flow: &mut FrameDescriptorMut<'_>) -> Result<(), FlowError>;

    /// Create a color encoder reading this engine's flow output.
    fn color_encoder(&self, max_flow: f32) -> Result<Self::Encoder, FlowError>;

    /// Duration of the last compute step in milliseconds, if the backend
    /// measures it.
    fn elapsed_time(&self) -> Option<f32> {
        None
    }

    /// Apply every tunable of a validated configuration.
    fn configure(&mut self, config: &FlowFilterConfig) -> Result<(), FlowError> {
        config.validate()?;
        self.set_max_flow(config.max_flow)?;
        self.set_gamma(&config.gamma)?;
        self.set_smooth_iterations(&config.smooth_iterations)?;
        Ok(())
    }
}

/// Encodes the flow field of an engine as an RGBA image.
///
/// Channel order of the downloaded buffer is R, G, B, A.
pub trait FlowColorEncoder {
    /// Encode the current flow field.
    fn compute(&mut self) -> Result<(), FlowError>;

    /// Copy the encoded colors into a host buffer matching [`color_geometry`].
    fn download_color(&mut self, color: &mut FrameDescriptorMut<'_>) -> Result<(), FlowError>;
}

/// Builds an engine once the frame dimensions are known.
pub trait FlowEngineFactory {
    /// The engine produced by this factory.
    type Engine: FlowEngine;

    /// Create an engine for frames of `height` x `width` with `levels`
    /// pyramid levels.
    fn create(
        &mut self,
        height: usize,
        width: usize,
        levels: usize,
    ) -> Result<Self::Engine, FlowError>;
}

impl<F, E> FlowEngineFactory for F
where
    F: FnMut(usize, usize, usize) -> Result<E, FlowError>,
    E: FlowEngine,
{
    type Engine = E;

    fn create(&mut self, height: usize, width: usize, levels: usize) -> Result<E, FlowError> {
        self(height, width, levels)
    }
}
