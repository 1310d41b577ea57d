use std::time::Duration;

use flowcam_flow::{FlowColorEncoder, FlowEngine, FlowEngineFactory, FlowError, FlowFilterConfig};
use flowcam_image::{FrameDescriptor, FrameDescriptorMut, Image, ImageError, ImageSize};
use flowcam_imgproc::color::{bgra_from_rgba_inplace, gray_from_bgr_u8};
use flowcam_io::{fps_counter::FpsCounter, FrameSource, SourceSpec, StreamError};

use crate::{
    diagnostics::{HistogramConfig, HistogramDiagnostics},
    display::{Display, DisplayError, Panel},
};

/// Panel name of the grayscale input frame.
pub const IMAGE_PANEL: &str = "image";

/// Panel name of the color encoded flow.
pub const FLOW_PANEL: &str = "optical flow";

/// Panel name of the histogram plot.
pub const HISTOGRAM_PANEL: &str = "calcHist";

/// How long the loop waits for display events after each frame by default.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(10);

/// Why the capture loop stopped. None of these are errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The source ran out of frames, a read failed or the frame size changed.
    EndOfStream,
    /// The user asked to stop.
    UserCancelled,
    /// The configured number of frames was processed.
    FrameLimit,
}

/// Phase of the capture loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing happened yet.
    Uninitialized,
    /// The video source is being opened.
    OpeningSource,
    /// The first frame is read to learn the frame size.
    Priming,
    /// The flow engine and host buffers are being set up.
    ConfiguringEngine,
    /// Frames are being processed.
    Running,
    /// The loop ended normally.
    Terminated(Termination),
}

/// Outcome of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub termination: Termination,
    /// Number of frames that went through the flow engine.
    pub frames: usize,
    /// Size of the frames.
    pub size: ImageSize,
}

/// Settings of a capture loop run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Where frames come from.
    pub source: SourceSpec,
    /// Flow filter tunables.
    pub flow: FlowFilterConfig,
    /// Bounded wait after each frame, also used to poll for cancellation.
    pub wait: Duration,
    /// Histogram plot of the encoded flow, if enabled.
    pub diagnostics: Option<HistogramConfig>,
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceSpec::DEFAULT_CAMERA,
            flow: FlowFilterConfig::default(),
            wait: DEFAULT_WAIT,
            diagnostics: None,
            max_frames: None,
        }
    }
}

/// An error that aborts the capture loop.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The source could not be opened or delivered no first frame.
    #[error("Failed to open video source {spec}: {reason}")]
    SourceOpen {
        /// The source that failed.
        spec: SourceSpec,
        /// What went wrong.
        reason: String,
    },

    /// The configuration was rejected before starting.
    #[error("Invalid configuration: {0}")]
    Configuration(FlowError),

    /// The flow engine failed.
    #[error("Flow engine failed: {0}")]
    Engine(#[from] FlowError),

    /// A host buffer operation failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The display sink failed.
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Host buffers shared with the engine, allocated once from the first frame.
struct FrameBuffers {
    gray: Image<u8, 1>,
    flow: Image<f32, 2>,
    color: Image<u8, 4>,
}

impl FrameBuffers {
    fn new(size: ImageSize) -> Result<Self, ImageError> {
        Ok(Self {
            gray: Image::from_size_val(size, 0)?,
            flow: Image::from_size_val(size, 0.0)?,
            color: Image::from_size_val(size, 0)?,
        })
    }
}

/// The capture, optical flow and display loop.
///
/// A single loop serves both the plain and the histogram variant; the
/// histogram plot is enabled through [`PipelineConfig::diagnostics`].
///
/// Per frame the loop converts the BGR input to grayscale, feeds the engine,
/// downloads the flow field and its RGBA color encoding, reorders it to BGRA
/// and hands the panels to the display.
pub struct FlowPipeline<F, D> {
    config: PipelineConfig,
    factory: F,
    display: D,
    state: LoopState,
}

impl<F, D> FlowPipeline<F, D>
where
    F: FlowEngineFactory,
    D: Display,
{
    /// Create a pipeline after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the flow tunables, the
    /// histogram layout or the frame limit are invalid. Nothing is opened.
    pub fn new(config: PipelineConfig, factory: F, display: D) -> Result<Self, PipelineError> {
        config.flow.validate().map_err(PipelineError::Configuration)?;

        if let Some(histogram) = &config.diagnostics {
            histogram
                .validate()
                .map_err(|e| PipelineError::Configuration(FlowError::Image(e)))?;
        }

        if config.max_frames == Some(0) {
            return Err(PipelineError::Configuration(FlowError::Config(
                "max frames must be positive".to_string(),
            )));
        }

        Ok(Self {
            config,
            factory,
            display,
            state: LoopState::Uninitialized,
        })
    }

    /// The current phase of the loop.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The validated configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The display sink.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Consume the pipeline and return its display sink.
    pub fn into_display(self) -> D {
        self.display
    }

    fn transition(&mut self, next: LoopState) {
        log::debug!("capture loop: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Open the configured source with `opener` and process it to the end.
    ///
    /// The source is closed on every path once it was opened. On error the
    /// state is left at the phase that failed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceOpen`] if the source cannot be opened or
    /// yields no first frame; in that case the engine factory is never called.
    /// Engine, buffer and display failures abort the loop. Read failures and
    /// frame size changes after the first frame end it normally.
    pub fn run<S, O>(&mut self, opener: O) -> Result<RunSummary, PipelineError>
    where
        S: FrameSource,
        O: FnOnce(&SourceSpec) -> Result<S, StreamError>,
    {
        self.transition(LoopState::OpeningSource);

        let spec = self.config.source.clone();
        log::info!("Opening video source {spec}");

        let mut source = opener(&spec).map_err(|e| PipelineError::SourceOpen {
            spec: spec.clone(),
            reason: e.to_string(),
        })?;

        let result = self.run_opened(&spec, &mut source);

        if let Err(e) = source.close() {
            log::warn!("Failed to close video source {spec}: {e}");
        }

        if let Ok(summary) = &result {
            log::info!(
                "Finished after {} frames: {:?}",
                summary.frames,
                summary.termination
            );
        }

        result
    }

    fn run_opened<S: FrameSource>(
        &mut self,
        spec: &SourceSpec,
        source: &mut S,
    ) -> Result<RunSummary, PipelineError> {
        self.transition(LoopState::Priming);

        let first = match source.read() {
            Ok(Some(frame)) if !frame.size().is_empty() => frame,
            Ok(Some(_)) => {
                return Err(PipelineError::SourceOpen {
                    spec: spec.clone(),
                    reason: "first frame is empty".to_string(),
                })
            }
            Ok(None) => {
                return Err(PipelineError::SourceOpen {
                    spec: spec.clone(),
                    reason: "no frames".to_string(),
                })
            }
            Err(e) => {
                return Err(PipelineError::SourceOpen {
                    spec: spec.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let size = first.size();
        log::info!("frame shape: [{}, {}]", size.height, size.width);

        self.transition(LoopState::ConfiguringEngine);

        let mut engine = self
            .factory
            .create(size.height, size.width, self.config.flow.levels)?;
        engine.configure(&self.config.flow)?;
        let mut encoder = engine.color_encoder(self.config.flow.max_flow)?;

        let mut buffers = FrameBuffers::new(size)?;
        let mut diagnostics = self
            .config
            .diagnostics
            .clone()
            .map(HistogramDiagnostics::new)
            .transpose()?;

        self.transition(LoopState::Running);

        let mut fps = FpsCounter::new();
        let mut frames = 0;
        let mut pending = Some(first);

        let termination = loop {
            let frame = match pending.take() {
                Some(frame) => frame,
                None => match source.read() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => break Termination::EndOfStream,
                    Err(e) => {
                        log::warn!("Failed to read from {spec}: {e}");
                        break Termination::EndOfStream;
                    }
                },
            };

            if frame.size() != size {
                log::warn!(
                    "Frame size of {spec} changed from {size} to {}, stopping",
                    frame.size()
                );
                break Termination::EndOfStream;
            }

            self.process_frame(
                &frame,
                &mut engine,
                &mut encoder,
                &mut buffers,
                diagnostics.as_mut(),
            )?;
            frames += 1;

            let rate = fps.update();
            log::trace!("frame {frames}: {rate:.1} fps");

            if self.display.wait_for_cancel(self.config.wait) {
                log::info!("Cancelled by user");
                break Termination::UserCancelled;
            }

            if self.config.max_frames.is_some_and(|max| frames >= max) {
                break Termination::FrameLimit;
            }
        };

        self.transition(LoopState::Terminated(termination));

        Ok(RunSummary {
            termination,
            frames,
            size,
        })
    }

    fn process_frame<E: FlowEngine>(
        &mut self,
        frame: &Image<u8, 3>,
        engine: &mut E,
        encoder: &mut E::Encoder,
        buffers: &mut FrameBuffers,
        diagnostics: Option<&mut HistogramDiagnostics>,
    ) -> Result<(), PipelineError> {
        gray_from_bgr_u8(frame, &mut buffers.gray)?;

        engine.load_image(&FrameDescriptor::from_image(&buffers.gray)?)?;
        engine.compute()?;
        if let Some(ms) = engine.elapsed_time() {
            log::debug!("flow compute: {ms:.3} ms");
        }

        engine.download_flow(&mut FrameDescriptorMut::from_image(&mut buffers.flow)?)?;

        encoder.compute()?;
        encoder.download_color(&mut FrameDescriptorMut::from_image(&mut buffers.color)?)?;
        bgra_from_rgba_inplace(&mut buffers.color);

        if let Some(diagnostics) = diagnostics {
            let plot = diagnostics.update(&buffers.color)?;
            self.display.show(HISTOGRAM_PANEL, Panel::Bgr(plot))?;
        }

        self.display.show(IMAGE_PANEL, Panel::Gray(&buffers.gray))?;
        self.display.show(FLOW_PANEL, Panel::Bgra(&buffers.color))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.source, SourceSpec::Camera(0));
        assert_eq!(config.wait, Duration::from_millis(10));
        assert_eq!(config.flow, FlowFilterConfig::default());
        assert!(config.diagnostics.is_none());
        assert!(config.max_frames.is_none());
    }

    #[test]
    fn source_open_error_names_the_source() {
        let err = PipelineError::SourceOpen {
            spec: SourceSpec::parse("missing.mp4"),
            reason: "no frames".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open video source missing.mp4: no frames"
        );
    }
}
