//! Reproducible benchmark harness for film emulation blur kernels.
//!
//! The crate times a naive Gaussian blur (the correctness oracle) against a
//! vectorized separable implementation on identical input, verifies that both
//! agree within a floating-point tolerance, and records the latency reported
//! by an asynchronous procedural grain job.
//!
//! # Example
//!
//! ```
//! use filmbench::{run_suite, BenchmarkConfig, RayonGrainDevice};
//! use std::time::Duration;
//!
//! let config = BenchmarkConfig::default()
//!     .with_resolution(64, 48)
//!     .with_kernel(2, 1.0)
//!     .with_trials(3)
//!     .with_max_trial_duration(Duration::from_secs(10));
//! let grain = RayonGrainDevice::new(64, 48, 0.3);
//!
//! let report = run_suite(&config, &grain).unwrap();
//! assert!(report.max_abs_difference() <= config.tolerance);
//! println!("{report}");
//! ```

pub mod blur;
mod buffer;
pub mod grain;
mod harness;
mod kernel;
mod report;

pub use blur::{NaiveBlur, SimdBlur};
pub use buffer::PixelBuffer;
pub use grain::{GrainGenerator, GrainHandle, RayonGrainDevice};
pub use harness::{run_suite, BenchmarkConfig, BenchmarkHarness, Phase};
pub use kernel::{BlurKernel, KernelConfig};
pub use report::{BenchmarkReport, KernelSummary, TimingSample, BANNER, RULE};

use std::time::Duration;
use thiserror::Error;

/// Errors that may occur while building buffers, running kernels or driving
/// a benchmark suite.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FilmBenchError {
    #[error("invalid buffer dimensions {width}x{height}, both must be at least 1")]
    InvalidDimension { width: usize, height: usize },

    #[error("buffer of {width}x{height} needs {expected} samples, got {actual}")]
    SampleCountMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("sample {value} at index {index} is outside [0, 1]")]
    InvalidSample { index: usize, value: f32 },

    #[error("cannot compare a {0}x{1} buffer with a {2}x{3} buffer")]
    ShapeMismatch(usize, usize, usize, usize),

    #[error("pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("{kernel}: degenerate timing, minimum trial took {min:?}")]
    DegenerateTiming { kernel: &'static str, min: Duration },

    #[error("{kernel}: trial {trial} took {elapsed:?}, exceeding the {limit:?} budget")]
    TrialTimeout {
        kernel: &'static str,
        trial: usize,
        elapsed: Duration,
        limit: Duration,
    },

    #[error("{baseline} and {candidate} disagree by {max_diff}, tolerance is {tolerance}")]
    EquivalenceMismatch {
        baseline: &'static str,
        candidate: &'static str,
        max_diff: f32,
        tolerance: f32,
    },

    #[error("grain device failed: {0}")]
    GrainDevice(String),
}

pub type Result<T, E = FilmBenchError> = std::result::Result<T, E>;
