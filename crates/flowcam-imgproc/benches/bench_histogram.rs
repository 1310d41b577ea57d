use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flowcam_image::{Image, ImageSize};
use flowcam_imgproc::histogram::{compute_histogram, normalize_histogram};

// vanilla version
fn histogram_vanilla(src: &Image<u8, 1>, hist: &mut [usize]) {
    hist.iter_mut().for_each(|h| *h = 0);
    for &px in src.as_slice() {
        hist[px as usize] += 1;
    }
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("Histogram");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{width}x{height}");

        let image_size = ImageSize {
            width: *width,
            height: *height,
        };
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        let image = Image::<u8, 1>::new(image_size, data).unwrap();
        let mut hist = vec![0usize; 256];
        let mut normalized = vec![0f32; 256];

        group.bench_with_input(
            BenchmarkId::new("vanilla", &parameter_string),
            &image,
            |b, i| b.iter(|| histogram_vanilla(black_box(i), black_box(&mut hist))),
        );

        group.bench_with_input(
            BenchmarkId::new("par_fold", &parameter_string),
            &image,
            |b, i| {
                b.iter(|| {
                    compute_histogram(black_box(i), black_box(&mut hist), 256).unwrap();
                    normalize_histogram(&hist, black_box(&mut normalized), 400.0).unwrap();
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_histogram);
criterion_main!(benches);
