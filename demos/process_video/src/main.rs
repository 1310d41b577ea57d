use argh::FromArgs;
use std::time::Duration;

use flowcam::{
    diagnostics::HistogramConfig,
    display::{CancelToken, Display, HeadlessDisplay},
    flow::{gpu::GpuFlowFilter, FlowFilterConfig},
    io::{gstreamer::VideoCapture, SourceSpec},
    pipeline::{FlowPipeline, PipelineConfig, PipelineError, RunSummary},
};

mod rerun_display;
use rerun_display::RerunDisplay;

#[derive(FromArgs, Debug)]
/// Compute and display the dense optical flow of a video file or camera.
struct Args {
    /// video file path or camera index, camera 0 if omitted
    #[argh(positional)]
    source: Option<String>,

    /// plot the per-channel histogram of the color encoded flow
    #[argh(switch)]
    histogram: bool,

    /// clamp of the flow magnitude in pixels per frame
    #[argh(option, default = "40.0")]
    max_flow: f32,

    /// smoothness weight of one pyramid level, repeated once per level
    #[argh(option)]
    gamma: Vec<f32>,

    /// smoothing iterations of one pyramid level, repeated once per level
    #[argh(option)]
    smooth_iterations: Vec<u32>,

    /// number of pyramid levels
    #[argh(option, default = "3")]
    levels: usize,

    /// milliseconds to wait for viewer events after each frame
    #[argh(option, default = "10")]
    wait_ms: u64,

    /// stop after this many frames
    #[argh(option)]
    max_frames: Option<usize>,

    /// do not spawn a viewer
    #[argh(switch)]
    headless: bool,
}

fn run<D: Display>(config: PipelineConfig, display: D) -> Result<RunSummary, PipelineError> {
    let mut pipeline = FlowPipeline::new(config, GpuFlowFilter::new, display)?;
    pipeline.run(VideoCapture::open)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Args = argh::from_env();

    let source = args
        .source
        .as_deref()
        .map(SourceSpec::parse)
        .unwrap_or(SourceSpec::DEFAULT_CAMERA);

    let mut flow = FlowFilterConfig::default()
        .with_levels(args.levels)
        .with_max_flow(args.max_flow);
    if !args.gamma.is_empty() {
        flow = flow.with_gamma(args.gamma);
    }
    if !args.smooth_iterations.is_empty() {
        flow = flow.with_smooth_iterations(args.smooth_iterations);
    }

    let config = PipelineConfig {
        source,
        flow,
        wait: Duration::from_millis(args.wait_ms),
        diagnostics: args.histogram.then(HistogramConfig::default),
        max_frames: args.max_frames,
    };

    // create a cancel token to stop the capture loop
    let cancel = CancelToken::new();
    ctrlc::set_handler({
        let cancel = cancel.clone();
        move || {
            log::info!("Received Ctrl-C signal. Stopping the capture loop");
            cancel.cancel();
        }
    })?;

    let summary = if args.headless {
        run(config, HeadlessDisplay::new(cancel))?
    } else {
        run(config, RerunDisplay::spawn("flowcam process_video", cancel)?)?
    };

    log::info!(
        "Processed {} frames of size {}: {:?}",
        summary.frames,
        summary.size,
        summary.termination
    );

    Ok(())
}
