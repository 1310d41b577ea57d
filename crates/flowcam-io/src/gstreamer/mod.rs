mod capture;

pub use capture::VideoCapture;

use crate::source::SourceSpec;

/// Name of the appsink element frames are pulled from.
pub(crate) const SINK_NAME: &str = "sink";

/// Build the GStreamer pipeline description for a source.
///
/// Every pipeline ends in an appsink delivering packed BGR frames. File
/// pipelines keep every decoded frame; camera pipelines drop stale frames so
/// the loop always sees the latest image.
pub fn pipeline_description(spec: &SourceSpec) -> String {
    match spec {
        SourceSpec::File(path) => {
            let location = if cfg!(windows) {
                path.to_string_lossy().replace('\\', "/")
            } else {
                path.to_string_lossy().into_owned()
            };
            format!(
                "filesrc location=\"{location}\" ! \
                decodebin ! \
                videoconvert ! \
                video/x-raw,format=BGR ! \
                appsink name={SINK_NAME} sync=false max-buffers=5 drop=false"
            )
        }
        SourceSpec::Camera(index) => format!(
            "v4l2src device=/dev/video{index} ! \
            videoconvert ! \
            video/x-raw,format=BGR ! \
            appsink name={SINK_NAME} sync=false max-buffers=1 drop=true"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_pipeline_description() {
        let desc = pipeline_description(&SourceSpec::parse("/tmp/clip.mp4"));
        assert!(desc.starts_with("filesrc location=\"/tmp/clip.mp4\""));
        assert!(desc.contains("format=BGR"));
        assert!(desc.contains("drop=false"));
    }

    #[test]
    fn camera_pipeline_description() {
        let desc = pipeline_description(&SourceSpec::Camera(1));
        assert!(desc.starts_with("v4l2src device=/dev/video1"));
        assert!(desc.contains("appsink name=sink"));
    }
}
