//! Benchmark orchestration.
//!
//! A [`BenchmarkHarness`] drives one run through
//! `Idle -> Warming -> Measuring -> Reporting`. [`BenchmarkHarness::run_suite`]
//! consumes the harness, so a finished run can never be re-entered; start a
//! new harness for the next run.

use std::fmt;
use std::time::{Duration, Instant};

use futures::executor::block_on;
use tracing::{debug, info, warn};

use crate::blur::EQUIVALENCE_TOLERANCE;
use crate::grain::GrainGenerator;
use crate::report::{speedup, BenchmarkReport, KernelSummary, TimingSample};
use crate::{
    BlurKernel, FilmBenchError, KernelConfig, NaiveBlur, PixelBuffer, Result, SimdBlur,
};

/// Settings for one benchmark run.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkConfig {
    pub width: usize,
    pub height: usize,
    /// Kernel radius K; the kernel spans `2K + 1` taps per axis.
    pub radius: usize,
    pub sigma: f32,
    /// Measured trials per kernel.
    pub trial_count: usize,
    /// Discarded passes per kernel before measuring. At least one pass always
    /// runs, since its output is used for the equivalence check.
    pub warmup_trials: usize,
    /// A kernel whose trial exceeds this budget skips its remaining trials.
    pub max_trial_duration: Duration,
    /// Seed of the noise input buffer.
    pub seed: u64,
    /// Maximum accepted absolute difference between the kernels' outputs.
    pub tolerance: f32,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            width: 3840,
            height: 2160,
            radius: 3,
            sigma: 1.5,
            trial_count: 5,
            warmup_trials: 1,
            max_trial_duration: Duration::from_secs(30),
            seed: 0x5EED,
            tolerance: EQUIVALENCE_TOLERANCE,
        }
    }
}

impl BenchmarkConfig {
    #[must_use]
    pub fn with_resolution(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_kernel(mut self, radius: usize, sigma: f32) -> Self {
        self.radius = radius;
        self.sigma = sigma;
        self
    }

    #[must_use]
    pub fn with_trials(mut self, trial_count: usize) -> Self {
        self.trial_count = trial_count;
        self
    }

    #[must_use]
    pub fn with_warmup(mut self, warmup_trials: usize) -> Self {
        self.warmup_trials = warmup_trials;
        self
    }

    #[must_use]
    pub fn with_max_trial_duration(mut self, max_trial_duration: Duration) -> Self {
        self.max_trial_duration = max_trial_duration;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks the harness parameters and builds the kernel they describe.
    ///
    /// # Errors
    /// [`FilmBenchError::InvalidConfig`] naming the first offending option.
    pub fn validate(&self) -> Result<KernelConfig> {
        if self.width == 0 || self.height == 0 {
            return Err(FilmBenchError::InvalidConfig(format!(
                "resolution {}x{} must be at least 1x1",
                self.width, self.height
            )));
        }
        if self.trial_count < 1 {
            return Err(FilmBenchError::InvalidConfig(
                "trial_count must be at least 1".to_string(),
            ));
        }
        if self.max_trial_duration.is_zero() {
            return Err(FilmBenchError::InvalidConfig(
                "max_trial_duration must be non-zero".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(FilmBenchError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        if self.radius > self.width.max(self.height) {
            return Err(FilmBenchError::InvalidConfig(format!(
                "radius {} exceeds the larger image dimension of {}x{}",
                self.radius, self.width, self.height
            )));
        }
        KernelConfig::new(self.radius, self.sigma)
    }
}

/// Harness lifecycle. Transitions only move forward, one step at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Warming,
    Measuring,
    Reporting,
}

impl Phase {
    /// The only phase reachable from `self`, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::Warming),
            Phase::Warming => Some(Phase::Measuring),
            Phase::Measuring => Some(Phase::Reporting),
            Phase::Reporting => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Warming => "warming",
            Phase::Measuring => "measuring",
            Phase::Reporting => "reporting",
        })
    }
}

/// Times a baseline kernel against a candidate on identical input.
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
    kernel: KernelConfig,
    baseline: Box<dyn BlurKernel>,
    candidate: Box<dyn BlurKernel>,
    phase: Phase,
}

impl BenchmarkHarness {
    /// Harness comparing [`NaiveBlur`] (baseline) against [`SimdBlur`].
    ///
    /// # Errors
    /// [`FilmBenchError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        Self::with_kernels(config, Box::new(NaiveBlur), Box::new(SimdBlur))
    }

    /// Harness comparing arbitrary kernels. Speedup is reported as
    /// `min(baseline) / min(candidate)`.
    pub fn with_kernels(
        config: BenchmarkConfig,
        baseline: Box<dyn BlurKernel>,
        candidate: Box<dyn BlurKernel>,
    ) -> Result<Self> {
        let kernel = config.validate()?;
        Ok(Self {
            config,
            kernel,
            baseline,
            candidate,
            phase: Phase::Idle,
        })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, next: Phase) {
        debug_assert_eq!(self.phase.next(), Some(next), "illegal phase transition");
        debug!(from = %self.phase, to = %next, "harness phase");
        self.phase = next;
    }

    /// Runs the whole suite and returns its report.
    ///
    /// Kernel trials run sequentially on the calling thread. The grain job is
    /// issued once measuring is over and is always awaited before the report
    /// is built.
    ///
    /// # Errors
    /// - [`FilmBenchError::EquivalenceMismatch`] if the kernels disagree
    /// - [`FilmBenchError::DegenerateTiming`] if the candidate's fastest trial took zero time
    /// - [`FilmBenchError::GrainDevice`] if the grain job never reports back
    /// - any error returned by a kernel
    ///
    /// A [`FilmBenchError::TrialTimeout`] is not returned; it is recorded in
    /// the affected kernel's [`KernelSummary`] and the other kernel still runs.
    pub fn run_suite(mut self, grain: &dyn GrainGenerator) -> Result<BenchmarkReport> {
        let resolution = (self.config.width, self.config.height);
        let input = PixelBuffer::noise(resolution.0, resolution.1, self.config.seed)?;
        info!(
            width = resolution.0,
            height = resolution.1,
            radius = self.kernel.radius(),
            sigma = self.kernel.sigma(),
            trials = self.config.trial_count,
            "starting benchmark suite"
        );

        self.enter(Phase::Warming);
        let max_abs_difference = self.warm_up(&input)?;

        self.enter(Phase::Measuring);
        let budget = self.config.max_trial_duration;
        let mut baseline_samples = Vec::with_capacity(self.config.trial_count);
        let mut candidate_samples = Vec::with_capacity(self.config.trial_count);
        let baseline_failure =
            self.measure(self.baseline.as_ref(), &input, budget, &mut baseline_samples)?;
        let candidate_failure =
            self.measure(self.candidate.as_ref(), &input, budget, &mut candidate_samples)?;

        let grain_job = grain.run_async();

        self.enter(Phase::Reporting);
        let grain = block_on(grain_job)?;
        debug!(?grain, "grain device reported");

        let baseline =
            KernelSummary::from_samples(self.baseline.name(), &baseline_samples, baseline_failure);
        let candidate = KernelSummary::from_samples(
            self.candidate.name(),
            &candidate_samples,
            candidate_failure,
        );
        let mut samples = baseline_samples;
        samples.append(&mut candidate_samples);
        let speedup = speedup(&baseline, &candidate)?;
        info!(
            baseline_min = ?baseline.min(),
            candidate_min = ?candidate.min(),
            ?speedup,
            "benchmark suite complete"
        );

        Ok(BenchmarkReport::new(
            resolution,
            self.kernel,
            samples,
            baseline,
            candidate,
            speedup,
            max_abs_difference,
            grain,
        ))
    }

    /// Runs the discarded warm-up passes. The first pass of each kernel is
    /// compared against the other to establish equivalence.
    fn warm_up(&self, input: &PixelBuffer) -> Result<f32> {
        let expected = self.baseline.apply(input, &self.kernel)?;
        let actual = self.candidate.apply(input, &self.kernel)?;
        let max_diff = expected.max_abs_difference(&actual)?;
        debug!(max_diff, "equivalence check");
        if max_diff.is_nan() || max_diff > self.config.tolerance {
            return Err(FilmBenchError::EquivalenceMismatch {
                baseline: self.baseline.name(),
                candidate: self.candidate.name(),
                max_diff,
                tolerance: self.config.tolerance,
            });
        }

        for _ in 1..self.config.warmup_trials {
            self.baseline.apply(input, &self.kernel)?;
            self.candidate.apply(input, &self.kernel)?;
        }
        Ok(max_diff)
    }

    /// Times `trial_count` runs of `kernel`, appending one sample per trial.
    ///
    /// Returns the [`FilmBenchError::TrialTimeout`] that stopped the kernel
    /// early, if any.
    fn measure(
        &self,
        kernel: &dyn BlurKernel,
        input: &PixelBuffer,
        budget: Duration,
        samples: &mut Vec<TimingSample>,
    ) -> Result<Option<FilmBenchError>> {
        for trial in 0..self.config.trial_count {
            let start = Instant::now();
            let output = kernel.apply(input, &self.kernel)?;
            let elapsed = start.elapsed();
            drop(output);

            if elapsed > budget {
                let timeout = FilmBenchError::TrialTimeout {
                    kernel: kernel.name(),
                    trial,
                    elapsed,
                    limit: budget,
                };
                warn!("{}, skipping remaining trials", timeout);
                return Ok(Some(timeout));
            }

            debug!(kernel = kernel.name(), trial, ?elapsed, "trial");
            samples.push(TimingSample::new(
                kernel.name(),
                (input.width(), input.height()),
                elapsed,
                trial,
            ));
        }
        Ok(None)
    }
}

/// Validates `config` and runs the default naive vs SIMD suite.
///
/// # Errors
/// [`FilmBenchError::InvalidConfig`] for a bad config, otherwise see
/// [`BenchmarkHarness::run_suite`].
pub fn run_suite(config: &BenchmarkConfig, grain: &dyn GrainGenerator) -> Result<BenchmarkReport> {
    BenchmarkHarness::new(config.clone())?.run_suite(grain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_4k() {
        let config = BenchmarkConfig::default();
        assert_eq!((config.width, config.height), (3840, 2160));
        let kernel = config.validate().unwrap();
        assert_eq!(kernel.taps(), 7);
    }

    #[test]
    fn validation_names_the_bad_option() {
        let cases = [
            (BenchmarkConfig::default().with_trials(0), "trial_count"),
            (BenchmarkConfig::default().with_resolution(0, 10), "resolution"),
            (
                BenchmarkConfig::default().with_max_trial_duration(Duration::ZERO),
                "max_trial_duration",
            ),
            (BenchmarkConfig::default().with_kernel(2, 0.0), "sigma"),
            (BenchmarkConfig::default().with_kernel(usize::MAX, 1.0), "radius"),
            (
                BenchmarkConfig::default()
                    .with_resolution(8, 6)
                    .with_kernel(9, 1.0),
                "radius",
            ),
            (BenchmarkConfig::default().with_kernel(2000, 1.0), "radius"),
        ];
        for (config, needle) in cases {
            match config.validate() {
                Err(FilmBenchError::InvalidConfig(msg)) => {
                    assert!(msg.contains(needle), "{}", msg)
                }
                other => panic!("expected InvalidConfig for {}, got {:?}", needle, other),
            }
        }
    }

    #[test]
    fn phases_only_move_forward() {
        let mut phase = Phase::Idle;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![Phase::Idle, Phase::Warming, Phase::Measuring, Phase::Reporting]
        );
    }

    #[test]
    fn new_harness_starts_idle() {
        let config = BenchmarkConfig::default().with_resolution(8, 8);
        let harness = BenchmarkHarness::new(config).unwrap();
        assert_eq!(harness.phase(), Phase::Idle);
        assert_eq!(harness.config().width, 8);
    }
}
