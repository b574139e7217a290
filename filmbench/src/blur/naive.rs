use tracing::trace;

use crate::buffer::clamp_index;
use crate::{BlurKernel, KernelConfig, PixelBuffer, Result};

/// Reference 2D convolution.
///
/// Every output pixel is the weighted sum over its full
/// `(2K+1) x (2K+1)` neighbourhood, summed row by row in a fixed order so the
/// result is bit-for-bit reproducible. Sums are clamped to `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveBlur;

impl BlurKernel for NaiveBlur {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn apply(&self, input: &PixelBuffer, config: &KernelConfig) -> Result<PixelBuffer> {
        let width = input.width();
        let height = input.height();
        let radius = config.radius() as isize;
        let taps = config.taps();
        let weights = config.weights_2d();
        trace!(width, height, taps, "naive blur");

        let mut output = input.with_same_shape();
        let out = output.samples_mut();

        for y in 0..height {
            for x in 0..width {
                let mut acc = 0f32;
                for (dy, kernel_row) in weights.chunks_exact(taps).enumerate() {
                    let sy = clamp_index(y as isize + dy as isize - radius, height);
                    let row = input.row(sy);
                    for (dx, &weight) in kernel_row.iter().enumerate() {
                        let sx = clamp_index(x as isize + dx as isize - radius, width);
                        acc += row[sx] * weight;
                    }
                }
                out[y * width + x] = acc.clamp(0.0, 1.0);
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_input_stays_uniform() {
        let input = PixelBuffer::new(9, 7, 0.5).unwrap();
        let config = KernelConfig::new(2, 1.0).unwrap();
        let out = NaiveBlur.apply(&input, &config).unwrap();
        for &s in out.samples() {
            assert!((s - 0.5).abs() < 1e-6, "{}", s);
        }
    }

    #[test]
    fn impulse_spreads_by_outer_product() {
        let mut data = vec![0.0; 16];
        data[5] = 1.0; // (1, 1)
        let input = PixelBuffer::from_vec(4, 4, data).unwrap();
        let config = KernelConfig::new(1, 1.0).unwrap();
        let w = config.weights();
        let out = NaiveBlur.apply(&input, &config).unwrap();

        assert_eq!(out.get(1, 1).unwrap(), w[1] * w[1]);
        // Left and top neighbours see the impulse through clamped taps only once.
        assert_eq!(out.get(0, 1).unwrap(), w[1] * w[2]);
        assert_eq!(out.get(1, 0).unwrap(), w[2] * w[1]);
        assert_eq!(out.get(2, 1).unwrap(), w[1] * w[0]);
        assert_eq!(out.get(3, 3).unwrap(), 0.0);
    }
}
