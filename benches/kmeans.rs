use std::time::Duration;

use chromaseg::{
    kmeans::{self, Centroids},
    AssignmentTable, KmeansOptions, Sample,
};
use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;

/// A synthetic image made of noisy color blobs, so k-means has some structure to find.
fn synthetic_samples() -> Vec<Sample> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
    let bases = (0..12)
        .map(|_| [rng.gen_range(0.0..255.0), rng.gen_range(0.0..255.0), rng.gen_range(0.0..255.0)])
        .collect::<Vec<[f64; 3]>>();

    (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| (x, y)))
        .map(|(x, y)| {
            let base = bases[((x / 64) + (y / 64) * 3) as usize % bases.len()];
            let noise = [(); 3].map(|()| rng.gen_range(-12.0..12.0));
            let color = Srgb::new(
                (base[0] + noise[0]).clamp(0.0, 255.0) as u8,
                (base[1] + noise[1]).clamp(0.0, 255.0) as u8,
                (base[2] + noise[2]).clamp(0.0, 255.0) as u8,
            );
            Sample::from_srgb(color, (x, y))
        })
        .collect()
}

fn bench(
    c: &mut Criterion,
    group: &str,
    samples: &[Sample],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(usize, &[Sample])),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(20)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3));

    for k in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &(k, samples), &mut f);
    }
}

fn seed_single(c: &mut Criterion) {
    let samples = synthetic_samples();
    bench(c, "seed_single", &samples, |b, &(k, samples)| {
        b.iter(|| kmeans::seed(samples, k, &mut Xoroshiro128PlusPlus::seed_from_u64(0)))
    })
}

fn seed_par(c: &mut Criterion) {
    let samples = synthetic_samples();
    bench(c, "seed_par", &samples, |b, &(k, samples)| {
        b.iter(|| kmeans::seed_par(samples, k, &mut Xoroshiro128PlusPlus::seed_from_u64(0)))
    })
}

fn initial_centroids(samples: &[Sample], k: usize) -> Centroids {
    kmeans::seed(samples, k, &mut Xoroshiro128PlusPlus::seed_from_u64(0)).unwrap()
}

fn assign_single(c: &mut Criterion) {
    let samples = synthetic_samples();
    bench(c, "assign_single", &samples, |b, &(k, samples)| {
        let centroids = initial_centroids(samples, k);
        b.iter(|| {
            let mut table = AssignmentTable::new(samples.len());
            kmeans::assign(samples, &centroids, &mut table)
        })
    })
}

fn assign_par(c: &mut Criterion) {
    let samples = synthetic_samples();
    bench(c, "assign_par", &samples, |b, &(k, samples)| {
        let centroids = initial_centroids(samples, k);
        b.iter(|| {
            let mut table = AssignmentTable::new(samples.len());
            kmeans::assign_par(samples, &centroids, &mut table)
        })
    })
}

fn run_single(c: &mut Criterion) {
    let samples = synthetic_samples();
    bench(c, "run_single", &samples, |b, &(k, samples)| {
        let options = KmeansOptions::new(k).max_iterations(20);
        b.iter(|| kmeans::run(samples, &options))
    })
}

fn run_par(c: &mut Criterion) {
    let samples = synthetic_samples();
    bench(c, "run_par", &samples, |b, &(k, samples)| {
        let options = KmeansOptions::new(k).max_iterations(20);
        b.iter(|| kmeans::run_par(samples, &options))
    })
}

criterion_group!(
    benches,
    seed_single,
    seed_par,
    assign_single,
    assign_par,
    run_single,
    run_par
);
criterion_main!(benches);
