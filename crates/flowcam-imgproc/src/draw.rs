use flowcam_image::Image;

/// Set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[start..start + C].copy_from_slice(&color);
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// Points outside the image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. (Note: thickness > 1 is approximate).
///
/// # Example
///
/// ```
/// use flowcam_image::{Image, ImageSize};
/// use flowcam_imgproc::draw::draw_line;
///
/// let mut img = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 0).unwrap();
/// draw_line(&mut img, (0, 0), (3, 3), [255], 1);
///
/// assert_eq!(img.get_pixel(2, 2, 0).unwrap(), 255);
/// assert_eq!(img.get_pixel(3, 0, 0).unwrap(), 0);
/// ```
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    // thick lines are stamped as a small square centered on each point
    let lo = -((thickness.max(1) as i64 - 1) / 2);
    let hi = thickness.max(1) as i64 / 2;

    loop {
        for i in lo..=hi {
            for j in lo..=hi {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}
