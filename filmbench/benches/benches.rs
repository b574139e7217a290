use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use filmbench::grain::synthesize_grain;
use filmbench::{BlurKernel, KernelConfig, NaiveBlur, PixelBuffer, SimdBlur};

fn blur_benchmarks(c: &mut Criterion) {
    let config = KernelConfig::new(3, 1.5).unwrap();
    let mut group = c.benchmark_group("gaussian_blur");
    group.sample_size(10);

    for (width, height) in [(256, 256), (1280, 720), (1920, 1080)] {
        let input = PixelBuffer::noise(width, height, 0x5EED).unwrap();
        let label = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::new("naive", &label), &input, |b, input| {
            b.iter(|| NaiveBlur.apply(black_box(input), black_box(&config)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("simd", &label), &input, |b, input| {
            b.iter(|| SimdBlur.apply(black_box(input), black_box(&config)).unwrap())
        });
    }
    group.finish();
}

fn radius_scaling(c: &mut Criterion) {
    let input = PixelBuffer::noise(512, 512, 7).unwrap();
    let mut group = c.benchmark_group("simd_radius");

    for radius in [1usize, 3, 8, 16] {
        let config = KernelConfig::new(radius, radius as f32 / 2.0 + 0.5).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(radius), &config, |b, config| {
            b.iter(|| SimdBlur.apply(black_box(&input), black_box(config)).unwrap())
        });
    }
    group.finish();
}

fn grain_benchmark(c: &mut Criterion) {
    c.bench_function("grain_1080p", |b| {
        b.iter(|| synthesize_grain(black_box(1920), black_box(1080), 0.3, 0))
    });
}

criterion_group!(benches, blur_benchmarks, radius_scaling, grain_benchmark);
criterion_main!(benches);
