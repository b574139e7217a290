//! Gaussian blur kernels under benchmark.
//!
//! - [`NaiveBlur`]: full 2D convolution, O(W·H·K²). The correctness oracle.
//! - [`SimdBlur`]: separable two-pass convolution on `wide::f32x8` lanes,
//!   O(W·H·K), with runtime target dispatch via `multiversion`.
//!
//! Both use the edge-replicate boundary policy: neighbour coordinates outside
//! the buffer are clamped to the nearest edge pixel. Their outputs agree
//! within [`EQUIVALENCE_TOLERANCE`], the difference coming only from
//! floating-point summation order.

mod naive;
mod simd_gaussian;

pub use naive::NaiveBlur;
pub use simd_gaussian::SimdBlur;

/// Maximum absolute difference accepted between the two kernels' outputs.
pub const EQUIVALENCE_TOLERANCE: f32 = 1e-4;
