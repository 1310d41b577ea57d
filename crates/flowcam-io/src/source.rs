use std::path::PathBuf;

use flowcam_image::Image;

use crate::error::StreamError;

/// Where frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceSpec {
    /// A video file decoded from disk.
    File(PathBuf),
    /// A camera identified by its index, e.g. `/dev/video0` for `0`.
    Camera(u32),
}

impl SourceSpec {
    /// The camera used when no source is given.
    pub const DEFAULT_CAMERA: SourceSpec = SourceSpec::Camera(0);

    /// Parse a command line source argument.
    ///
    /// An argument made only of digits selects a camera index, anything else
    /// is taken as a file path.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowcam_io::SourceSpec;
    ///
    /// assert_eq!(SourceSpec::parse("1"), SourceSpec::Camera(1));
    /// assert_eq!(SourceSpec::parse("clip.mp4"), SourceSpec::File("clip.mp4".into()));
    /// ```
    pub fn parse(arg: &str) -> Self {
        let is_index = !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit());
        match arg.parse::<u32>() {
            Ok(index) if is_index => SourceSpec::Camera(index),
            _ => SourceSpec::File(PathBuf::from(arg)),
        }
    }
}

impl std::fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSpec::File(path) => write!(f, "{}", path.display()),
            SourceSpec::Camera(index) => write!(f, "camera {index}"),
        }
    }
}

/// A blocking source of BGR8 frames.
///
/// Implementations own their decode resources and release them on `Drop`.
pub trait FrameSource {
    /// Read the next frame.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    fn read(&mut self) -> Result<Option<Image<u8, 3>>, StreamError>;

    /// Release the source early. Reading after closing yields `Ok(None)`.
    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        (**self).read()
    }

    fn close(&mut self) -> Result<(), StreamError> {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::SourceSpec;
    use std::path::PathBuf;

    #[test]
    fn parse_camera_index() {
        assert_eq!(SourceSpec::parse("0"), SourceSpec::Camera(0));
        assert_eq!(SourceSpec::parse("12"), SourceSpec::Camera(12));
    }

    #[test]
    fn parse_file_path() {
        assert_eq!(
            SourceSpec::parse("/data/clip.mp4"),
            SourceSpec::File(PathBuf::from("/data/clip.mp4"))
        );
        assert_eq!(SourceSpec::parse("-1"), SourceSpec::File(PathBuf::from("-1")));
        assert_eq!(SourceSpec::parse("+1"), SourceSpec::File(PathBuf::from("+1")));
        // too large for an index
        assert_eq!(
            SourceSpec::parse("99999999999"),
            SourceSpec::File(PathBuf::from("99999999999"))
        );
    }

    #[test]
    fn display_names_the_source() {
        assert_eq!(SourceSpec::Camera(2).to_string(), "camera 2");
        assert_eq!(SourceSpec::parse("a.mp4").to_string(), "a.mp4");
        assert_eq!(SourceSpec::DEFAULT_CAMERA, SourceSpec::Camera(0));
    }
}
