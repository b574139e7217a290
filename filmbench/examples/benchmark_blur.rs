/// Quick throughput comparison of the blur kernels
///
/// Run with: cargo run --release --example benchmark_blur
use filmbench::{BlurKernel, KernelConfig, NaiveBlur, PixelBuffer, SimdBlur};
use std::time::Instant;

fn main() {
    let sizes = [(512, 512), (1024, 1024), (2048, 2048)];
    let config = KernelConfig::new(3, 1.5).unwrap();
    let kernels: [&dyn BlurKernel; 2] = [&NaiveBlur, &SimdBlur];

    for (width, height) in sizes {
        println!("\n=== {}x{} image ===", width, height);

        let input = PixelBuffer::noise(width, height, 1).unwrap();

        for kernel in kernels {
            // Warmup
            kernel.apply(&input, &config).unwrap();

            // Benchmark
            let iterations = 10;
            let start = Instant::now();
            for _ in 0..iterations {
                kernel.apply(&input, &config).unwrap();
            }
            let elapsed = start.elapsed();

            let ms_per_iter = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
            let mpix_per_sec = (width * height) as f64 / 1_000_000.0 / (ms_per_iter / 1000.0);

            println!(
                "{:<6} {:>9.3} ms/blur  {:>8.1} Mpix/sec",
                kernel.name(),
                ms_per_iter,
                mpix_per_sec
            );
        }
    }
}
