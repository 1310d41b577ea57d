use flowcam_image::{Image, ImageError, ImageSize};
use flowcam_imgproc::histogram::{compute_histogram, draw_histogram, normalize_histogram};

/// Curve colors of the plot, in BGR, for channels 0, 1 and 2 of the input.
const CURVE_COLORS: [[u8; 3]; 3] = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];

/// Layout of the histogram plot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramConfig {
    /// Number of bins over the `[0, 256)` range.
    pub bins: usize,
    /// Width of the plot in pixels.
    pub width: usize,
    /// Height of the plot in pixels. The tallest bin reaches the top.
    pub height: usize,
    /// Thickness of the curves.
    pub thickness: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: 256,
            width: 512,
            height: 400,
            thickness: 2,
        }
    }
}

impl HistogramConfig {
    /// Check the plot layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the bin count is outside `1..=256` or the plot is empty.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.bins == 0 || self.bins > 256 {
            return Err(ImageError::InvalidHistogramBins(self.bins));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::EmptyImage(self.width, self.height));
        }
        Ok(())
    }
}

/// Per-channel histogram plot of the color encoded flow.
///
/// The plot is cleared and redrawn on every [`HistogramDiagnostics::update`],
/// with one curve per color channel of the input panel.
pub struct HistogramDiagnostics {
    config: HistogramConfig,
    canvas: Image<u8, 3>,
    plane: Option<Image<u8, 1>>,
    counts: Vec<usize>,
    normalized: Vec<f32>,
}

impl HistogramDiagnostics {
    /// Allocate the plot.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: HistogramConfig) -> Result<Self, ImageError> {
        config.validate()?;
        let canvas = Image::from_size_val(
            ImageSize {
                width: config.width,
                height: config.height,
            },
            0,
        )?;
        Ok(Self {
            counts: vec![0; config.bins],
            normalized: vec![0.0; config.bins],
            config,
            canvas,
            plane: None,
        })
    }

    /// The plot layout.
    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// The last drawn plot.
    pub fn canvas(&self) -> &Image<u8, 3> {
        &self.canvas
    }

    /// Redraw the plot from the first three channels of `panel`.
    ///
    /// Channel 0 is drawn in blue, channel 1 in green and channel 2 in red.
    pub fn update(&mut self, panel: &Image<u8, 4>) -> Result<&Image<u8, 3>, ImageError> {
        self.canvas.fill(0);

        let plane = match self.plane.take() {
            Some(plane) if plane.size() == panel.size() => plane,
            _ => Image::from_size_val(panel.size(), 0)?,
        };
        let plane = self.plane.insert(plane);
        let max_value = self.canvas.rows() as f32;

        for (ch, color) in CURVE_COLORS.iter().enumerate() {
            plane
                .as_slice_mut()
                .iter_mut()
                .zip(panel.as_slice().chunks_exact(4))
                .for_each(|(dst, px)| *dst = px[ch]);

            compute_histogram(plane, &mut self.counts, self.config.bins)?;
            normalize_histogram(&self.counts, &mut self.normalized, max_value)?;
            draw_histogram(
                &mut self.canvas,
                &self.normalized,
                *color,
                self.config.thickness,
            );
        }

        Ok(&self.canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(pixels: &[[u8; 4]]) -> Result<Image<u8, 4>, ImageError> {
        Image::new(
            ImageSize {
                width: pixels.len(),
                height: 1,
            },
            pixels.iter().flatten().copied().collect(),
        )
    }

    #[test]
    fn rejects_bad_layout() {
        let bins = HistogramConfig {
            bins: 0,
            ..Default::default()
        };
        assert!(HistogramDiagnostics::new(bins).is_err());

        let empty = HistogramConfig {
            width: 0,
            ..Default::default()
        };
        assert!(HistogramDiagnostics::new(empty).is_err());
    }

    #[test]
    fn draws_one_curve_per_channel() -> Result<(), ImageError> {
        let mut diag = HistogramDiagnostics::new(HistogramConfig::default())?;
        let flow = panel(&[[0, 128, 255, 255], [0, 128, 255, 255]])?;

        let plot = diag.update(&flow)?;
        assert_eq!(plot.size(), ImageSize { width: 512, height: 400 });

        let has_color = |color: [u8; 3]| plot.as_slice().chunks_exact(3).any(|px| px == color);
        assert!(has_color([255, 0, 0]));
        assert!(has_color([0, 255, 0]));
        assert!(has_color([0, 0, 255]));

        // the peak of channel 0 sits at x = 0 and reaches the top row
        assert_eq!(plot.get_pixel(0, 0, 0)?, 255);
        Ok(())
    }

    #[test]
    fn plot_is_cleared_between_updates() -> Result<(), ImageError> {
        let config = HistogramConfig {
            bins: 4,
            width: 8,
            height: 8,
            thickness: 1,
        };
        let mut diag = HistogramDiagnostics::new(config)?;

        diag.update(&panel(&[[255, 255, 255, 0]])?)?;
        let first = diag.canvas().clone();

        diag.update(&panel(&[[0, 0, 0, 0], [0, 0, 0, 0]])?)?;
        assert_ne!(diag.canvas(), &first);

        // the previous peak at x = 6 is gone
        assert_eq!(diag.canvas().get_pixel(6, 0, 2)?, 0);
        assert_eq!(diag.canvas().get_pixel(0, 0, 2)?, 255);
        Ok(())
    }
}
