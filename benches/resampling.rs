//! Benchmarks for ROI negotiation and strided resampling
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::ArrayD;
use volpipe::{
    decimate, ArraySource, Coordinate, DownSample, PipelineBuilder, Request, Roi, ScaleFactor,
    Volume,
};

fn roi(offset: &[i64], shape: &[i64]) -> Roi {
    Roi::from_slices(offset, shape).unwrap()
}

fn volume(extent: &Roi) -> Volume {
    let shape = extent.shape().to_usize_vec().unwrap();
    Volume::from_array(
        ArrayD::<f32>::ones(shape),
        extent.offset().clone(),
        Coordinate::ones(extent.dims()),
    )
    .unwrap()
}

fn bench_center_preserving_scale(c: &mut Criterion) {
    let request = roi(&[-3, 17, 250], &[33, 64, 64]);
    let uniform = ScaleFactor::uniform(2);
    let anisotropic = ScaleFactor::per_axis([1, 3, 3]);

    c.bench_function("center_preserving_scale/uniform", |b| {
        b.iter(|| black_box(&request).center_preserving_scale(black_box(&uniform)))
    });
    c.bench_function("center_preserving_scale/per_axis", |b| {
        b.iter(|| black_box(&request).center_preserving_scale(black_box(&anisotropic)))
    });
}

fn bench_decimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimate");

    for side in [32i64, 64, 128] {
        let extent = roi(&[0, 0, 0], &[side, side, side]);
        let input = volume(&extent);
        let factor = ScaleFactor::uniform(2);
        let target = roi(&[0, 0, 0], &[side / 2, side / 2, side / 2]);

        group.throughput(Throughput::Elements((side * side * side) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| decimate(black_box(&input), &extent, &factor, &target).unwrap())
        });
    }

    group.finish();
}

fn bench_request_batch(c: &mut Criterion) {
    let extent = roi(&[-64, -64, -64], &[128, 128, 128]);
    let source = ArraySource::new("memory").with_volume("raw", volume(&extent));
    let pipeline = PipelineBuilder::new(source)
        .node(DownSample::single("raw", 2u32, "raw_2").unwrap())
        .node(DownSample::single("raw_2", 2u32, "raw_4").unwrap())
        .build()
        .unwrap();

    let request = Request::new()
        .with("raw", roi(&[0, 0, 0], &[16, 16, 16]))
        .with("raw_4", roi(&[-4, -4, -4], &[8, 8, 8]));

    c.bench_function("request_batch/two_levels", |b| {
        b.iter(|| pipeline.request_batch(black_box(&request)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_center_preserving_scale,
    bench_decimate,
    bench_request_batch
);
criterion_main!(benches);
