use crate::{FilmBenchError, PixelBuffer, Result};

/// Gaussian kernel parameters with precomputed, normalized 1D weights.
///
/// The kernel support is `2 * radius + 1` taps. The 2D kernel applied by the
/// naive blur is the outer product of [`weights`](Self::weights) with itself.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelConfig {
    radius: usize,
    sigma: f32,
    weights: Vec<f32>,
}

impl KernelConfig {
    /// Largest accepted radius. The naive kernel holds `(2K+1)²` weights.
    pub const MAX_RADIUS: usize = 1024;

    /// # Errors
    /// [`FilmBenchError::InvalidConfig`] if `sigma` is not a positive finite
    /// value or `radius` exceeds [`MAX_RADIUS`](Self::MAX_RADIUS).
    pub fn new(radius: usize, sigma: f32) -> Result<Self> {
        if radius > Self::MAX_RADIUS {
            return Err(FilmBenchError::InvalidConfig(format!(
                "radius must be at most {}, got {}",
                Self::MAX_RADIUS,
                radius
            )));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(FilmBenchError::InvalidConfig(format!(
                "sigma must be positive and finite, got {}",
                sigma
            )));
        }

        // Accumulate in f64 so normalization error stays below f32 rounding.
        let sigma = f64::from(sigma);
        let two_sigma_sq = 2.0 * sigma * sigma;
        let raw: Vec<f64> = (0..=2 * radius)
            .map(|i| {
                let d = i as f64 - radius as f64;
                (-(d * d) / two_sigma_sq).exp()
            })
            .collect();
        let total: f64 = raw.iter().sum();
        let weights = raw.iter().map(|w| (w / total) as f32).collect();

        Ok(Self {
            radius,
            sigma: sigma as f32,
            weights,
        })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Number of taps along one axis.
    pub fn taps(&self) -> usize {
        2 * self.radius + 1
    }

    /// Normalized 1D weights, `taps()` long, symmetric around `radius`.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Row-major `taps() x taps()` outer product of the 1D weights.
    pub fn weights_2d(&self) -> Vec<f32> {
        self.weights
            .iter()
            .flat_map(|&wy| self.weights.iter().map(move |&wx| wy * wx))
            .collect()
    }
}

/// A blur implementation under benchmark.
///
/// Implementations borrow the input read-only and return a freshly allocated
/// output of the same shape, with edge-replicate boundary handling.
pub trait BlurKernel: Send + Sync {
    /// Short name used in timing samples, logs and error messages.
    fn name(&self) -> &'static str;

    fn apply(&self, input: &PixelBuffer, config: &KernelConfig) -> Result<PixelBuffer>;
}
