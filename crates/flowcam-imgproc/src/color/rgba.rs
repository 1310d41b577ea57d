use crate::parallel;
use flowcam_image::{Image, ImageDtype};

/// Reorder an RGBA image into BGRA in place.
///
/// # Example
///
/// ```
/// use flowcam_image::{Image, ImageSize};
/// use flowcam_imgproc::color::bgra_from_rgba_inplace;
///
/// let mut image = Image::<u8, 4>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![10, 20, 30, 40],
/// )
/// .unwrap();
///
/// bgra_from_rgba_inplace(&mut image);
/// assert_eq!(image.as_slice(), &[30, 20, 10, 40]);
/// ```
pub fn bgra_from_rgba_inplace<T>(img: &mut Image<T, 4>)
where
    T: ImageDtype,
{
    parallel::par_iter_rows_inplace(img, |pixel| pixel.swap(0, 2));
}

#[cfg(test)]
mod tests {
    use flowcam_image::{Image, ImageError, ImageSize};

    #[test]
    fn bgra_from_rgba_single_pixel() -> Result<(), ImageError> {
        let mut image = Image::<u8, 4>::new(
            ImageSize {
                width: 1,
                height: 1,
            },
            vec![200, 100, 50, 255],
        )?;

        super::bgra_from_rgba_inplace(&mut image);
        assert_eq!(image.as_slice(), &[50, 100, 200, 255]);

        Ok(())
    }

    #[test]
    fn bgra_from_rgba_inplace_is_order_sensitive() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let mut image = Image::<u8, 4>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![
                1, 2, 3, 4,
                5, 6, 7, 8,
            ],
        )?;

        super::bgra_from_rgba_inplace(&mut image);
        assert_eq!(image.as_slice(), &[3, 2, 1, 4, 7, 6, 5, 8]);

        // a second pass restores the original order, it is not idempotent
        super::bgra_from_rgba_inplace(&mut image);
        assert_eq!(image.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        Ok(())
    }
}
