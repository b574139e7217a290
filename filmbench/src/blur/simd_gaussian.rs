/// Separable Gaussian blur using the `wide` crate
///
/// Uses f32x8 to process 8 adjacent samples per instruction in both passes.
/// The horizontal pass convolves an edge-padded copy of each row; the
/// vertical pass accumulates whole clamped rows, so no transpose is needed.
/// Both passes clamp finished samples to `0.0..=1.0`.
use multiversion::multiversion;
use tracing::trace;
use wide::f32x8;

use crate::buffer::clamp_index;
use crate::{BlurKernel, KernelConfig, PixelBuffer, Result};

const LANES: usize = 8;

/// Vectorized two-pass blur.
///
/// Matches [`NaiveBlur`](super::NaiveBlur) within
/// [`EQUIVALENCE_TOLERANCE`](super::EQUIVALENCE_TOLERANCE) at O(W·H·K) cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimdBlur;

impl BlurKernel for SimdBlur {
    fn name(&self) -> &'static str {
        "simd"
    }

    fn apply(&self, input: &PixelBuffer, config: &KernelConfig) -> Result<PixelBuffer> {
        let width = input.width();
        let height = input.height();
        trace!(width, height, taps = config.taps(), "simd blur");

        let mut temp = input.with_same_shape();
        let mut output = input.with_same_shape();

        // Horizontal pass
        Self::horizontal_pass(
            input.samples(),
            temp.samples_mut(),
            width,
            config.radius(),
            config.weights(),
        );

        // Vertical pass
        Self::vertical_pass(
            temp.samples(),
            output.samples_mut(),
            width,
            height,
            config.radius(),
            config.weights(),
        );

        Ok(output)
    }
}

impl SimdBlur {
    fn horizontal_pass(
        input: &[f32],
        output: &mut [f32],
        width: usize,
        radius: usize,
        weights: &[f32],
    ) {
        assert_eq!(input.len(), output.len());

        #[cfg(feature = "parallel-blur")]
        {
            use rayon::prelude::*;
            input
                .par_chunks_exact(width)
                .zip(output.par_chunks_exact_mut(width))
                .for_each_init(
                    || vec![0f32; width + 2 * radius],
                    |padded, (input, output)| {
                        pad_row(input, padded, radius);
                        convolve_row(padded, weights, output);
                    },
                );
        }

        #[cfg(not(feature = "parallel-blur"))]
        {
            let mut padded = vec![0f32; width + 2 * radius];
            input
                .chunks_exact(width)
                .zip(output.chunks_exact_mut(width))
                .for_each(|(input, output)| {
                    pad_row(input, &mut padded, radius);
                    convolve_row(&padded, weights, output);
                });
        }
    }

    fn vertical_pass(
        input: &[f32],
        output: &mut [f32],
        width: usize,
        height: usize,
        radius: usize,
        weights: &[f32],
    ) {
        assert_eq!(input.len(), output.len());

        #[cfg(feature = "parallel-blur")]
        {
            use rayon::prelude::*;
            output
                .par_chunks_exact_mut(width)
                .enumerate()
                .for_each(|(y, out_row)| {
                    vertical_row(input, out_row, y, width, height, radius, weights);
                });
        }

        #[cfg(not(feature = "parallel-blur"))]
        {
            output
                .chunks_exact_mut(width)
                .enumerate()
                .for_each(|(y, out_row)| {
                    vertical_row(input, out_row, y, width, height, radius, weights);
                });
        }
    }
}

/// Copies `row` into `padded` with `radius` replicated edge samples on each side.
#[inline(always)]
fn pad_row(row: &[f32], padded: &mut [f32], radius: usize) {
    let width = row.len();
    debug_assert_eq!(padded.len(), width + 2 * radius);
    padded[..radius].fill(row[0]);
    padded[radius..radius + width].copy_from_slice(row);
    padded[radius + width..].fill(row[width - 1]);
}

#[inline(always)]
fn load(s: &[f32]) -> f32x8 {
    let mut lanes = [0f32; LANES];
    lanes.copy_from_slice(&s[..LANES]);
    f32x8::new(lanes)
}

/// Convolves one padded row, `output.len()` samples, 8 at a time.
#[inline(always)]
#[multiversion(targets("x86_64+avx2+fma", "x86_64+sse2", "aarch64+neon"))]
fn convolve_row(padded: &[f32], weights: &[f32], output: &mut [f32]) {
    let width = output.len();
    let mut x = 0;

    while x + LANES <= width {
        let mut acc = f32x8::splat(0.0);
        for (k, &weight) in weights.iter().enumerate() {
            acc = load(&padded[x + k..]).mul_add(f32x8::splat(weight), acc);
        }
        let acc = acc.max(f32x8::splat(0.0)).min(f32x8::splat(1.0));
        output[x..x + LANES].copy_from_slice(&acc.to_array());
        x += LANES;
    }

    // Scalar tail
    while x < width {
        let mut acc = 0f32;
        for (k, &weight) in weights.iter().enumerate() {
            acc += padded[x + k] * weight;
        }
        output[x] = acc.clamp(0.0, 1.0);
        x += 1;
    }
}

#[inline(always)]
fn vertical_row(
    input: &[f32],
    out_row: &mut [f32],
    y: usize,
    width: usize,
    height: usize,
    radius: usize,
    weights: &[f32],
) {
    out_row.fill(0.0);
    for (k, &weight) in weights.iter().enumerate() {
        let sy = clamp_index(y as isize + k as isize - radius as isize, height);
        accumulate_row(&input[sy * width..][..width], weight, out_row);
    }
    clamp_row(out_row);
}

/// `dst += weight * src`, 8 lanes at a time.
#[inline(always)]
#[multiversion(targets("x86_64+avx2+fma", "x86_64+sse2", "aarch64+neon"))]
fn accumulate_row(src: &[f32], weight: f32, dst: &mut [f32]) {
    assert_eq!(src.len(), dst.len());
    let w = f32x8::splat(weight);

    let mut src_chunks = src.chunks_exact(LANES);
    let mut dst_chunks = dst.chunks_exact_mut(LANES);
    for (s, d) in (&mut src_chunks).zip(&mut dst_chunks) {
        let acc = load(s).mul_add(w, load(d));
        d.copy_from_slice(&acc.to_array());
    }

    for (s, d) in src_chunks
        .remainder()
        .iter()
        .zip(dst_chunks.into_remainder())
    {
        *d += s * weight;
    }
}

/// Clamps finished samples into `0.0..=1.0`.
#[inline(always)]
#[multiversion(targets("x86_64+avx2+fma", "x86_64+sse2", "aarch64+neon"))]
fn clamp_row(row: &mut [f32]) {
    let lo = f32x8::splat(0.0);
    let hi = f32x8::splat(1.0);

    let mut chunks = row.chunks_exact_mut(LANES);
    for c in &mut chunks {
        let v = load(c).max(lo).min(hi);
        c.copy_from_slice(&v.to_array());
    }
    for s in chunks.into_remainder() {
        *s = s.clamp(0.0, 1.0);
    }
}
