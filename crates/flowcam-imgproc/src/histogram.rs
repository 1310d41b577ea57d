use flowcam_image::{Image, ImageError};
use rayon::prelude::*;

use crate::draw::draw_line;

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images. The intensity range
/// [0, 256) is split in `num_bins` uniform bins and the output is overwritten.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use flowcam_image::{Image, ImageSize};
/// use flowcam_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > 256 {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    if hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; 256];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = (i * num_bins) >> 8;
    }

    let counts = src
        .as_slice()
        .par_chunks(4096)
        .fold(
            || vec![0usize; num_bins],
            |mut local, chunk| {
                for &px in chunk {
                    local[bin_lut[px as usize]] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                for (i, val) in b.iter().enumerate() {
                    a[i] += val;
                }
                a
            },
        );

    hist.copy_from_slice(&counts);

    Ok(())
}

/// Scale a histogram so its values span `[0, max_value]`.
///
/// Min-max normalization: the smallest count maps to 0 and the largest to
/// `max_value`. A flat histogram maps entirely to 0.
///
/// # Errors
///
/// Returns an error if `hist` and `dst` have different lengths.
///
/// # Example
///
/// ```
/// use flowcam_imgproc::histogram::normalize_histogram;
///
/// let mut out = vec![0.0; 3];
/// normalize_histogram(&[0, 2, 4], &mut out, 400.0).unwrap();
/// assert_eq!(out, vec![0.0, 200.0, 400.0]);
/// ```
pub fn normalize_histogram(
    hist: &[usize],
    dst: &mut [f32],
    max_value: f32,
) -> Result<(), ImageError> {
    if hist.len() != dst.len() || hist.is_empty() {
        return Err(ImageError::InvalidHistogramBins(dst.len()));
    }

    let min = hist.iter().copied().min().unwrap_or(0) as f64;
    let max = hist.iter().copied().max().unwrap_or(0) as f64;
    let range = max - min;

    let scale = if range > f64::EPSILON {
        max_value as f64 / range
    } else {
        0.0
    };

    dst.iter_mut()
        .zip(hist.iter())
        .for_each(|(d, &h)| *d = ((h as f64 - min) * scale) as f32);

    Ok(())
}

/// Plot a normalized histogram as a polyline on an image.
///
/// Bin `i` is drawn at `x = i * bin_width` and `y = rows - round(hist[i])`,
/// where `bin_width = round(cols / hist.len())`.
///
/// # Arguments
///
/// * `img` - The canvas to draw on.
/// * `hist` - The histogram, already scaled to the canvas height.
/// * `color` - The line color.
/// * `thickness` - The line thickness.
pub fn draw_histogram<const C: usize>(
    img: &mut Image<u8, C>,
    hist: &[f32],
    color: [u8; C],
    thickness: usize,
) {
    if hist.is_empty() {
        return;
    }

    let bin_width = (img.cols() as f64 / hist.len() as f64).round() as i64;
    let bottom = img.rows() as i64;

    hist.windows(2).enumerate().for_each(|(i, pair)| {
        let x0 = bin_width * i as i64;
        let x1 = bin_width * (i as i64 + 1);
        let y0 = bottom - pair[0].round() as i64;
        let y1 = bottom - pair[1].round() as i64;
        draw_line(img, (x0, y0), (x1, y1), color, thickness);
    });
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use flowcam_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_compute_histogram() -> Result<(), ImageError> {
        let image = Image::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
        )?;

        let mut histogram = vec![0; 3];

        super::compute_histogram(&image, &mut histogram, 3)?;
        assert_eq!(histogram, vec![3, 3, 3]);

        // the output is overwritten, not accumulated
        super::compute_histogram(&image, &mut histogram, 3)?;
        assert_eq!(histogram, vec![3, 3, 3]);

        Ok(())
    }

    #[test]
    fn test_compute_histogram_invalid_bins() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )?;
        let mut histogram = vec![0; 257];
        assert_eq!(
            super::compute_histogram(&image, &mut histogram, 257),
            Err(ImageError::InvalidHistogramBins(257))
        );
        let mut histogram = vec![0; 4];
        assert_eq!(
            super::compute_histogram(&image, &mut histogram, 8),
            Err(ImageError::InvalidHistogramBins(8))
        );
        Ok(())
    }

    #[test]
    fn test_normalize_histogram_two_values() -> Result<(), ImageError> {
        // three pixels at 10 and one pixel at 200
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![10, 10, 200, 10],
        )?;

        let mut hist = vec![0; 256];
        super::compute_histogram(&image, &mut hist, 256)?;
        assert_eq!(hist[10], 3);
        assert_eq!(hist[200], 1);

        let mut normalized = vec![0.0f32; 256];
        super::normalize_histogram(&hist, &mut normalized, 400.0)?;

        let max = normalized.iter().cloned().fold(f32::MIN, f32::max);
        assert_relative_eq!(max, 400.0);
        assert_relative_eq!(normalized[10], 400.0);
        assert_relative_eq!(normalized[200], 400.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(normalized[0], 0.0);

        Ok(())
    }

    #[test]
    fn test_normalize_histogram_flat() -> Result<(), ImageError> {
        let mut normalized = vec![1.0f32; 4];
        super::normalize_histogram(&[5, 5, 5, 5], &mut normalized, 400.0)?;
        assert_eq!(normalized, vec![0.0; 4]);
        assert!(super::normalize_histogram(&[1, 2], &mut normalized, 1.0).is_err());
        Ok(())
    }

    #[test]
    fn test_draw_histogram() -> Result<(), ImageError> {
        let mut canvas = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 8,
                height: 4,
            },
            0,
        )?;

        // bin width 2, flat curve at height 2 -> row 2
        super::draw_histogram(&mut canvas, &[2.0, 2.0, 2.0, 2.0], [255, 0, 0], 1);

        for x in 0..7 {
            assert_eq!(canvas.get_pixel(x, 2, 0)?, 255);
            assert_eq!(canvas.get_pixel(x, 2, 1)?, 0);
        }
        assert_eq!(canvas.get_pixel(0, 0, 0)?, 0);

        Ok(())
    }
}
