use flowcam_image::{Image, ImageError, ImageSize};
use flowcam_imgproc::{color, histogram};

#[test]
fn bgra_panel_histograms_follow_channel_order() -> Result<(), ImageError> {
    // two pixels: pure red and pure green, as delivered in RGBA order
    let mut panel = Image::<u8, 4>::new(
        ImageSize {
            width: 2,
            height: 1,
        },
        vec![255, 0, 0, 255, 0, 255, 0, 255],
    )?;

    color::bgra_from_rgba_inplace(&mut panel);

    let planes = panel.split_channels()?;
    let mut blue = vec![0; 256];
    let mut red = vec![0; 256];
    histogram::compute_histogram(&planes[0], &mut blue, 256)?;
    histogram::compute_histogram(&planes[2], &mut red, 256)?;

    // after the reorder, channel 0 is blue (both pixels at 0)
    assert_eq!(blue[0], 2);
    // and channel 2 is red (one saturated pixel)
    assert_eq!(red[255], 1);
    assert_eq!(red[0], 1);

    Ok(())
}

#[test]
fn histogram_plot_stays_inside_canvas() -> Result<(), ImageError> {
    let mut canvas = Image::<u8, 3>::from_size_val(
        ImageSize {
            width: 512,
            height: 400,
        },
        0,
    )?;

    let gray = Image::<u8, 1>::new(
        ImageSize {
            width: 4,
            height: 1,
        },
        vec![0, 0, 0, 255],
    )?;
    let mut hist = vec![0; 256];
    histogram::compute_histogram(&gray, &mut hist, 256)?;
    let mut normalized = vec![0.0; 256];
    histogram::normalize_histogram(&hist, &mut normalized, canvas.rows() as f32)?;

    histogram::draw_histogram(&mut canvas, &normalized, [255, 0, 0], 2);

    // the dominant bin reaches the top row, empty bins fall below the last row
    assert_eq!(canvas.get_pixel(0, 0, 0)?, 255);
    assert_eq!(canvas.get_pixel(100, 399, 0)?, 0);
    assert_eq!(canvas.get_pixel(100, 398, 0)?, 0);
    assert!(canvas.as_slice().iter().any(|&v| v == 255));

    Ok(())
}
