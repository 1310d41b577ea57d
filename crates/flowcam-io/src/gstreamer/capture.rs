use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;

use flowcam_image::{Image, ImageSize};

use super::{pipeline_description, SINK_NAME};
use crate::{
    error::StreamError,
    source::{FrameSource, SourceSpec},
};

/// How long a single read waits for the next sample.
const PULL_TIMEOUT_SECS: u64 = 5;

/// A video file or camera decoded through GStreamer.
///
/// Frames are delivered as packed BGR8 images. The pipeline is stopped when
/// the capture is closed or dropped.
pub struct VideoCapture {
    spec: SourceSpec,
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    closed: bool,
}

impl VideoCapture {
    /// Open a video source and start decoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, the pipeline cannot be
    /// built or it refuses to start playing (e.g. missing camera device).
    pub fn open(spec: &SourceSpec) -> Result<Self, StreamError> {
        gst::init()?;

        if let SourceSpec::File(path) = spec {
            if !path.exists() {
                return Err(StreamError::FileNotFound(path.clone()));
            }
        }

        let desc = pipeline_description(spec);
        log::debug!("Capture pipeline: {desc}");

        let pipeline = gst::parse::launch(&desc)?
            .dynamic_cast::<gst::Pipeline>()
            .map_err(StreamError::DowncastPipelineError)?;

        let appsink = pipeline
            .by_name(SINK_NAME)
            .ok_or(StreamError::GetElementByNameError)?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(StreamError::DowncastPipelineError)?;

        if let Err(err) = pipeline.set_state(gst::State::Playing) {
            // leave no half-started pipeline behind
            let _ = pipeline.set_state(gst::State::Null);
            return Err(err.into());
        }

        log::debug!("Capture pipeline playing for {spec}");

        Ok(Self {
            spec: spec.clone(),
            pipeline,
            appsink,
            closed: false,
        })
    }

    /// The source this capture was opened from.
    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    /// Take the first error posted on the pipeline bus, if any.
    fn take_bus_error(&self) -> Option<StreamError> {
        let bus = self.pipeline.bus()?;
        let msg = bus.pop_filtered(&[gst::MessageType::Error])?;
        read_error_from_message(&msg)
    }

    /// Copy a sample into a packed BGR image, dropping any row padding.
    fn frame_from_sample(sample: &gst::Sample) -> Result<Image<u8, 3>, StreamError> {
        let caps = sample.caps().ok_or(StreamError::GetCapsError)?;
        let info = gst_video::VideoInfo::from_caps(caps)?;

        if info.format() != gst_video::VideoFormat::Bgr {
            return Err(StreamError::InvalidImageFormat(format!(
                "expected BGR, got {:?}",
                info.format()
            )));
        }

        let size = ImageSize {
            width: info.width() as usize,
            height: info.height() as usize,
        };
        let stride = info.stride()[0] as usize;
        let row_bytes = size.width * 3;

        let buffer = sample.buffer().ok_or(StreamError::GetBufferError)?;
        let map = buffer.map_readable()?;
        let src = map.as_slice();

        if stride < row_bytes || src.len() < stride * size.height.saturating_sub(1) + row_bytes {
            return Err(StreamError::InvalidImageFormat(format!(
                "buffer of {} bytes is too small for {size} with stride {stride}",
                src.len()
            )));
        }

        let mut data = Vec::with_capacity(row_bytes * size.height);
        for row in src.chunks(stride).take(size.height) {
            data.extend_from_slice(&row[..row_bytes]);
        }

        Ok(Image::new(size, data)?)
    }
}

impl FrameSource for VideoCapture {
    fn read(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        if self.closed || self.appsink.is_eos() {
            return Ok(None);
        }

        match self
            .appsink
            .try_pull_sample(gst::ClockTime::from_seconds(PULL_TIMEOUT_SECS))
        {
            Some(sample) => Ok(Some(Self::frame_from_sample(&sample)?)),
            // either end of stream or a failed pipeline
            None => match self.take_bus_error() {
                Some(err) => Err(err),
                None => Ok(None),
            },
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        log::debug!("Closing capture for {}", self.spec);
        self.closed = true;
        self.pipeline.set_state(gst::State::Null)?;
        Ok(())
    }
}

/// Turn a bus error message into a read error.
fn read_error_from_message(msg: &gst::Message) -> Option<StreamError> {
    let gst::MessageView::Error(err) = msg.view() else {
        return None;
    };
    log::debug!("Bus error debug info: {:?}", err.debug());
    let reason = match msg.src() {
        Some(src) => format!("{}: {}", src.path_string(), err.error()),
        None => err.error().to_string(),
    };
    Some(StreamError::ReadError(reason))
}

impl Drop for VideoCapture {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Error closing capture in drop: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_error_becomes_read_error() -> Result<(), StreamError> {
        gst::init()?;

        let msg = gst::message::Error::builder(gst::CoreError::Failed, "decoder stalled").build();
        match read_error_from_message(&msg) {
            Some(StreamError::ReadError(reason)) => assert!(reason.contains("decoder stalled")),
            other => panic!("unexpected {other:?}"),
        }

        assert!(read_error_from_message(&gst::message::Eos::new()).is_none());

        Ok(())
    }
}
