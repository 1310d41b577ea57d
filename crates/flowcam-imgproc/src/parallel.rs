use rayon::prelude::*;

use flowcam_image::{Image, ImageDtype};

/// Apply a function to each pixel in the image in parallel.
///
/// Rows are distributed over the rayon thread pool; `f` receives the source
/// and destination pixels as channel slices.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: ImageDtype,
    T2: ImageDtype,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }
    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each pixel of the image in place, in parallel by rows.
pub fn par_iter_rows_inplace<T, const C: usize>(
    img: &mut Image<T, C>,
    f: impl Fn(&mut [T]) + Send + Sync,
) where
    T: ImageDtype,
{
    let cols = img.cols();
    if cols == 0 {
        return;
    }
    img.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .for_each(|row| row.chunks_exact_mut(C).for_each(&f));
}
