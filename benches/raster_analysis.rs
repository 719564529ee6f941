use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use image::GrayImage;
use watershed_compare::{
    analysis::{difference::DifferenceEngine, region::RegionMeasurer},
    image_utils::gray16_from_samples,
};

fn bench_difference(c: &mut Criterion) {
    let (width, height) = (1024u32, 1024u32);
    let len = (width * height) as usize;
    let a = gray16_from_samples(width, height, (0..len).map(|i| (i * 31 % 65536) as u16).collect()).unwrap();
    let b = gray16_from_samples(width, height, (0..len).map(|i| (i * 97 % 65536) as u16).collect()).unwrap();

    let parallel = DifferenceEngine::new();
    let sequential = DifferenceEngine::new().with_parallel(false);

    c.bench_function("difference_1024_parallel", |bench| {
        bench.iter(|| parallel.compute_gray16(black_box(&a), black_box(&b)))
    });
    c.bench_function("difference_1024_sequential", |bench| {
        bench.iter(|| sequential.compute_gray16(black_box(&a), black_box(&b)))
    });
}

fn bench_region(c: &mut Criterion) {
    let mask = GrayImage::from_fn(1024, 1024, |x, y| {
        if (x / 16 + y / 16) % 2 == 0 {
            image::Luma([255])
        } else {
            image::Luma([0])
        }
    });
    let measurer = RegionMeasurer::default();

    c.bench_function("measure_1024", |bench| bench.iter(|| measurer.measure(black_box(&mask))));
    c.bench_function("measure_components_1024", |bench| {
        bench.iter(|| measurer.measure_components(black_box(&mask)))
    });
}

criterion_group!(benches, bench_difference, bench_region);
criterion_main!(benches);
