/// An error type for video sources.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    /// Error when the video file does not exist.
    #[error("File does not exist: {0}")]
    FileNotFound(std::path::PathBuf),

    /// Error while reading a frame.
    #[error("Failed to read frame: {0}")]
    ReadError(String),

    /// An error occurred during GStreamer initialization or parsing.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    GStreamerError(#[from] gstreamer::glib::Error),

    /// An error occurred while downcasting a pipeline element.
    #[cfg(feature = "gstreamer")]
    #[error("Failed to downcast pipeline element")]
    DowncastPipelineError(gstreamer::Element),

    /// An error occurred while looking up an element by name.
    #[error("Failed to get an element by name")]
    GetElementByNameError,

    /// An error occurred while setting the pipeline state.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    SetPipelineStateError(#[from] gstreamer::StateChangeError),

    /// An error occurred while mapping a buffer or parsing caps.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    BoolError(#[from] gstreamer::glib::BoolError),

    /// An error occurred while getting the caps from the sample.
    #[error("Failed to get the caps from the sample")]
    GetCapsError,

    /// An error occurred while getting the buffer from the sample.
    #[error("Failed to get the buffer from the sample")]
    GetBufferError,

    /// An error occurred while checking the image format.
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] flowcam_image::ImageError),
}
