//! Planar sample buffer shared read-only between kernels.
//!
//! ## Convention
//!
//! - Samples are `f32` intensities in the `[0, 1]` range, stored row-major.
//! - A buffer never changes after construction. Kernels allocate their output
//!   with [`PixelBuffer::with_same_shape`] and fill it through a crate-private
//!   accessor.

use crate::{FilmBenchError, Result};

/// A `width * height` grid of samples in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Creates a buffer where every sample is `fill`.
    ///
    /// # Errors
    /// - [`FilmBenchError::InvalidDimension`] if either dimension is zero
    /// - [`FilmBenchError::InvalidSample`] if `fill` is not a finite value in `[0, 1]`
    pub fn new(width: usize, height: usize, fill: f32) -> Result<Self> {
        check_dimensions(width, height)?;
        check_sample(0, fill)?;
        Ok(Self {
            data: vec![fill; width * height],
            width,
            height,
        })
    }

    /// Wraps existing row-major samples.
    ///
    /// # Errors
    /// - [`FilmBenchError::InvalidDimension`] if either dimension is zero
    /// - [`FilmBenchError::SampleCountMismatch`] if `data.len() != width * height`
    /// - [`FilmBenchError::InvalidSample`] for the first sample outside `[0, 1]`
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width * height;
        if data.len() != expected {
            return Err(FilmBenchError::SampleCountMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        for (index, &value) in data.iter().enumerate() {
            check_sample(index, value)?;
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Deterministic pseudo-random test pattern.
    ///
    /// The same `(width, height, seed)` always yields the same samples, so
    /// benchmark runs stay reproducible across machines.
    pub fn noise(width: usize, height: usize, seed: u64) -> Result<Self> {
        check_dimensions(width, height)?;
        let mut state = seed;
        let data = (0..width * height)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 40) & 0xFFFF) as f32 / 65535.0
            })
            .collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Allocates a zero-filled buffer of identical dimensions.
    #[must_use]
    pub fn with_same_shape(&self) -> Self {
        Self {
            data: vec![0.0; self.data.len()],
            width: self.width,
            height: self.height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of samples, always `width * height`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: a buffer holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sample at column `x`, row `y`.
    ///
    /// # Errors
    /// [`FilmBenchError::OutOfRange`] if `x >= width` or `y >= height`.
    pub fn get(&self, x: usize, y: usize) -> Result<f32> {
        if x >= self.width || y >= self.height {
            return Err(FilmBenchError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.data[y * self.width + x])
    }

    /// Returns the row-major samples.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Returns row `y` as a slice of `width` samples.
    pub(crate) fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..][..self.width]
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Largest absolute per-sample difference between two buffers.
    ///
    /// A NaN difference propagates to the result.
    ///
    /// # Errors
    /// [`FilmBenchError::ShapeMismatch`] if the dimensions differ.
    pub fn max_abs_difference(&self, other: &PixelBuffer) -> Result<f32> {
        if self.width != other.width || self.height != other.height {
            return Err(FilmBenchError::ShapeMismatch(
                self.width,
                self.height,
                other.width,
                other.height,
            ));
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, |acc, d| if d.is_nan() || d > acc { d } else { acc }))
    }
}

/// Edge-replicate lookup: clamps a possibly negative coordinate into `0..len`.
#[inline(always)]
pub(crate) fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(FilmBenchError::InvalidDimension { width, height });
    }
    Ok(())
}

fn check_sample(index: usize, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(FilmBenchError::InvalidSample { index, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            PixelBuffer::new(0, 4, 0.5),
            Err(FilmBenchError::InvalidDimension {
                width: 0,
                height: 4
            })
        );
        assert!(matches!(
            PixelBuffer::new(4, 0, 0.5),
            Err(FilmBenchError::InvalidDimension { .. })
        ));
        assert!(PixelBuffer::noise(0, 0, 1).is_err());
    }

    #[test]
    fn rejects_bad_samples() {
        assert!(matches!(
            PixelBuffer::new(2, 2, 1.5),
            Err(FilmBenchError::InvalidSample { .. })
        ));
        assert!(matches!(
            PixelBuffer::from_vec(2, 1, vec![0.0, f32::NAN]),
            Err(FilmBenchError::InvalidSample { index: 1, .. })
        ));
        assert_eq!(
            PixelBuffer::from_vec(2, 2, vec![0.0; 3]),
            Err(FilmBenchError::SampleCountMismatch {
                width: 2,
                height: 2,
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn get_reports_out_of_range() {
        let buf = PixelBuffer::from_vec(2, 2, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        assert_eq!(buf.get(1, 1), Ok(1.0));
        assert_eq!(buf.get(0, 1), Ok(0.5));
        assert!(matches!(
            buf.get(2, 0),
            Err(FilmBenchError::OutOfRange { x: 2, y: 0, .. })
        ));
        assert!(buf.get(0, 2).is_err());
    }

    #[test]
    fn same_shape_is_zero_filled() {
        let buf = PixelBuffer::new(3, 5, 0.75).unwrap();
        let out = buf.with_same_shape();
        assert_eq!((out.width(), out.height()), (3, 5));
        assert!(out.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn noise_is_deterministic_and_in_range() {
        let a = PixelBuffer::noise(17, 9, 42).unwrap();
        let b = PixelBuffer::noise(17, 9, 42).unwrap();
        let c = PixelBuffer::noise(17, 9, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.samples().iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn max_abs_difference_requires_same_shape() {
        let a = PixelBuffer::new(2, 3, 0.5).unwrap();
        let b = PixelBuffer::new(3, 2, 0.5).unwrap();
        assert_eq!(
            a.max_abs_difference(&b),
            Err(FilmBenchError::ShapeMismatch(2, 3, 3, 2))
        );
        let c = PixelBuffer::from_vec(2, 3, vec![0.5, 0.5, 0.5, 0.25, 0.5, 0.5]).unwrap();
        assert_eq!(a.max_abs_difference(&c), Ok(0.25));
    }

    #[test]
    fn max_abs_difference_propagates_nan() {
        let a = PixelBuffer::new(3, 1, 0.5).unwrap();
        let mut b = a.clone();
        b.samples_mut()[1] = f32::NAN;
        assert!(a.max_abs_difference(&b).unwrap().is_nan());
        assert!(b.max_abs_difference(&a).unwrap().is_nan());
    }

    #[test]
    fn clamp_index_replicates_edges() {
        assert_eq!(clamp_index(-3, 4), 0);
        assert_eq!(clamp_index(2, 4), 2);
        assert_eq!(clamp_index(9, 4), 3);
        assert_eq!(clamp_index(-1, 1), 0);
    }

    proptest! {
        #[test]
        fn length_matches_dimensions(width in 1usize..64, height in 1usize..64) {
            let buf = PixelBuffer::new(width, height, 0.0).unwrap();
            prop_assert_eq!(buf.len(), width * height);
            prop_assert!(!buf.is_empty());
        }
    }
}
