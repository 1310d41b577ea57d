use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use flowcam_image::{Image, ImageSize};

/// Error reported by a display sink.
#[derive(thiserror::Error, Debug)]
#[error("Display error: {0}")]
pub struct DisplayError(pub String);

/// An image handed to a display sink, borrowed for the duration of the call.
#[derive(Clone, Copy, Debug)]
pub enum Panel<'a> {
    /// Single channel 8-bit image.
    Gray(&'a Image<u8, 1>),
    /// Packed BGR 8-bit image.
    Bgr(&'a Image<u8, 3>),
    /// Packed BGRA 8-bit image.
    Bgra(&'a Image<u8, 4>),
}

impl Panel<'_> {
    /// Size of the image behind the panel.
    pub fn size(&self) -> ImageSize {
        match self {
            Panel::Gray(img) => img.size(),
            Panel::Bgr(img) => img.size(),
            Panel::Bgra(img) => img.size(),
        }
    }

    /// Raw interleaved bytes of the panel.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Panel::Gray(img) => img.as_slice(),
            Panel::Bgr(img) => img.as_slice(),
            Panel::Bgra(img) => img.as_slice(),
        }
    }
}

/// A sink for named image panels that also reports user cancellation.
pub trait Display {
    /// Show `panel` under `name`, replacing what was shown under that name.
    fn show(&mut self, name: &str, panel: Panel<'_>) -> Result<(), DisplayError>;

    /// Give the sink up to `timeout` to process events.
    ///
    /// Returns `true` if the user asked to stop.
    fn wait_for_cancel(&mut self, timeout: Duration) -> bool;
}

impl<D: Display + ?Sized> Display for &mut D {
    fn show(&mut self, name: &str, panel: Panel<'_>) -> Result<(), DisplayError> {
        (**self).show(name, panel)
    }

    fn wait_for_cancel(&mut self, timeout: Duration) -> bool {
        (**self).wait_for_cancel(timeout)
    }
}

/// A shared flag used to ask the capture loop to stop.
///
/// Clones share the same flag, so one can be moved into a signal handler.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A display that shows nothing and only waits for the cancel token.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    cancel: CancelToken,
    shown: u64,
}

impl HeadlessDisplay {
    /// Create a headless display observing `cancel`.
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel, shown: 0 }
    }

    /// Number of panels received so far.
    pub fn panels_shown(&self) -> u64 {
        self.shown
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, name: &str, panel: Panel<'_>) -> Result<(), DisplayError> {
        self.shown += 1;
        log::trace!("headless: dropping panel {name} of size {}", panel.size());
        Ok(())
    }

    fn wait_for_cancel(&mut self, timeout: Duration) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        if !timeout.is_zero() {
            std::thread::sleep(timeout);
        }
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcam_image::ImageError;

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let handler = token.clone();
        assert!(!token.is_cancelled());
        handler.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn headless_display_reports_cancel() -> Result<(), DisplayError> {
        let token = CancelToken::new();
        let mut display = HeadlessDisplay::new(token.clone());

        let img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )
        .map_err(|e: ImageError| DisplayError(e.to_string()))?;

        display.show("image", Panel::Gray(&img))?;
        assert_eq!(display.panels_shown(), 1);
        assert!(!display.wait_for_cancel(Duration::ZERO));

        token.cancel();
        assert!(display.wait_for_cancel(Duration::from_millis(1)));
        Ok(())
    }

    #[test]
    fn panel_exposes_size_and_bytes() -> Result<(), ImageError> {
        let img = Image::<u8, 4>::new(
            ImageSize {
                width: 1,
                height: 1,
            },
            vec![1, 2, 3, 4],
        )?;
        let panel = Panel::Bgra(&img);
        assert_eq!(panel.size(), img.size());
        assert_eq!(panel.as_bytes(), &[1, 2, 3, 4]);
        Ok(())
    }
}
