use std::fmt;
use std::time::Duration;

use crate::{FilmBenchError, KernelConfig, Result};

/// First line printed before a suite starts.
pub const BANNER: &str = "Running Film Emulation Performance Benchmark...";
/// Separator framing the report body.
pub const RULE: &str = "------------------------------------------------";

/// One timed kernel execution.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingSample {
    kernel: &'static str,
    width: usize,
    height: usize,
    elapsed: Duration,
    trial: usize,
}

impl TimingSample {
    pub(crate) fn new(
        kernel: &'static str,
        (width, height): (usize, usize),
        elapsed: Duration,
        trial: usize,
    ) -> Self {
        Self {
            kernel,
            width,
            height,
            elapsed,
            trial,
        }
    }

    pub fn kernel(&self) -> &'static str {
        self.kernel
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Zero-based index among the measured (non warm-up) trials.
    pub fn trial(&self) -> usize {
        self.trial
    }
}

/// Aggregate timings for one kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelSummary {
    kernel: &'static str,
    min: Option<Duration>,
    mean: Option<Duration>,
    max: Option<Duration>,
    trials: usize,
    failure: Option<FilmBenchError>,
}

impl KernelSummary {
    /// Summarizes `kernel`'s samples out of `samples`.
    pub(crate) fn from_samples(
        kernel: &'static str,
        samples: &[TimingSample],
        failure: Option<FilmBenchError>,
    ) -> Self {
        let elapsed: Vec<Duration> = samples
            .iter()
            .filter(|s| s.kernel == kernel)
            .map(|s| s.elapsed)
            .collect();

        let (min, mean, max) = if elapsed.is_empty() {
            (None, None, None)
        } else {
            let total: Duration = elapsed.iter().sum();
            (
                elapsed.iter().min().copied(),
                Some(total / elapsed.len() as u32),
                elapsed.iter().max().copied(),
            )
        };

        Self {
            kernel,
            min,
            mean,
            max,
            trials: elapsed.len(),
            failure,
        }
    }

    pub fn kernel(&self) -> &'static str {
        self.kernel
    }

    /// Fastest trial, the headline figure.
    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn mean(&self) -> Option<Duration> {
        self.mean
    }

    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Number of trials that completed within budget.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// The [`FilmBenchError::TrialTimeout`] that cut this kernel short, if any.
    pub fn failure(&self) -> Option<&FilmBenchError> {
        self.failure.as_ref()
    }
}

/// `min(baseline) / min(candidate)`.
///
/// Returns `Ok(None)` when either kernel has no completed trial.
///
/// # Errors
/// [`FilmBenchError::DegenerateTiming`] if the candidate's minimum is zero.
pub(crate) fn speedup(baseline: &KernelSummary, candidate: &KernelSummary) -> Result<Option<f64>> {
    let (Some(base), Some(cand)) = (baseline.min, candidate.min) else {
        return Ok(None);
    };
    if cand.is_zero() {
        return Err(FilmBenchError::DegenerateTiming {
            kernel: candidate.kernel,
            min: cand,
        });
    }
    Ok(Some(base.as_secs_f64() / cand.as_secs_f64()))
}

/// Result of one benchmark run. Built once, never mutated.
#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    width: usize,
    height: usize,
    kernel: KernelConfig,
    samples: Vec<TimingSample>,
    baseline: KernelSummary,
    candidate: KernelSummary,
    speedup: Option<f64>,
    max_abs_difference: f32,
    grain: Duration,
}

impl BenchmarkReport {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        (width, height): (usize, usize),
        kernel: KernelConfig,
        samples: Vec<TimingSample>,
        baseline: KernelSummary,
        candidate: KernelSummary,
        speedup: Option<f64>,
        max_abs_difference: f32,
        grain: Duration,
    ) -> Self {
        Self {
            width,
            height,
            kernel,
            samples,
            baseline,
            candidate,
            speedup,
            max_abs_difference,
            grain,
        }
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn kernel_config(&self) -> &KernelConfig {
        &self.kernel
    }

    /// All measured samples in execution order.
    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    /// Summary of the reference kernel.
    pub fn baseline(&self) -> &KernelSummary {
        &self.baseline
    }

    /// Summary of the optimized kernel.
    pub fn candidate(&self) -> &KernelSummary {
        &self.candidate
    }

    /// `None` when a timeout left either kernel without samples.
    pub fn speedup(&self) -> Option<f64> {
        self.speedup
    }

    pub fn max_abs_difference(&self) -> f32 {
        self.max_abs_difference
    }

    /// Device-reported grain latency.
    pub fn grain(&self) -> Duration {
        self.grain
    }

    /// `true` if any kernel was cut short by a trial timeout.
    pub fn is_partial(&self) -> bool {
        self.baseline.failure.is_some() || self.candidate.failure.is_some()
    }
}

/// Common name for standard resolutions.
fn resolution_tag(width: usize, height: usize) -> Option<&'static str> {
    match (width, height) {
        (3840, 2160) => Some("4K"),
        (2560, 1440) => Some("1440p"),
        (1920, 1080) => Some("1080p"),
        (1280, 720) => Some("720p"),
        _ => None,
    }
}

fn fmt_ms(d: Duration) -> String {
    format!("{:.2} ms", d.as_secs_f64() * 1000.0)
}

fn fmt_kernel(summary: &KernelSummary) -> String {
    match (summary.min, &summary.failure) {
        (_, Some(FilmBenchError::TrialTimeout { trial, .. })) => {
            format!("timed out (trial {})", trial)
        }
        (Some(min), _) => fmt_ms(min),
        (None, _) => "n/a".to_string(),
    }
}

impl fmt::Display for BenchmarkReport {
    /// Renders the report body; callers print [`BANNER`] and [`RULE`] first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match resolution_tag(self.width, self.height) {
            Some(tag) => writeln!(
                f,
                "Image Resolution: {}x{} ({})",
                self.width, self.height, tag
            )?,
            None => writeln!(f, "Image Resolution: {}x{}", self.width, self.height)?,
        }
        writeln!(f, "[CPU] Naive Gaussian Blur: {}", fmt_kernel(&self.baseline))?;
        writeln!(f, "[WAS] SIMD Gaussian Blur:  {}", fmt_kernel(&self.candidate))?;
        match self.speedup {
            Some(ratio) => writeln!(f, "      => Speedup: {:.1}x", ratio)?,
            None => writeln!(f, "      => Speedup: n/a")?,
        }
        writeln!(
            f,
            "[GPU] Procedural Grain:    {} (Non-blocking)",
            fmt_ms(self.grain)
        )?;
        writeln!(f, "{}", RULE)?;
        write!(f, "Benchmark Complete.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kernel: &'static str, ms: u64, trial: usize) -> TimingSample {
        TimingSample::new(kernel, (8, 8), Duration::from_millis(ms), trial)
    }

    #[test]
    fn summary_filters_by_kernel() {
        let samples = vec![
            sample("naive", 30, 0),
            sample("simd", 4, 0),
            sample("naive", 20, 1),
            sample("simd", 6, 1),
            sample("naive", 40, 2),
        ];
        let naive = KernelSummary::from_samples("naive", &samples, None);
        assert_eq!(naive.trials(), 3);
        assert_eq!(naive.min(), Some(Duration::from_millis(20)));
        assert_eq!(naive.mean(), Some(Duration::from_millis(30)));
        assert_eq!(naive.max(), Some(Duration::from_millis(40)));

        let simd = KernelSummary::from_samples("simd", &samples, None);
        assert_eq!(simd.min(), Some(Duration::from_millis(4)));
        let ratio = speedup(&naive, &simd).unwrap().unwrap();
        assert!((ratio - 5.0).abs() < 1e-9, "{}", ratio);
    }

    #[test]
    fn zero_candidate_minimum_is_degenerate() {
        let samples = vec![sample("naive", 10, 0), sample("simd", 0, 0)];
        let naive = KernelSummary::from_samples("naive", &samples, None);
        let simd = KernelSummary::from_samples("simd", &samples, None);
        assert_eq!(
            speedup(&naive, &simd),
            Err(FilmBenchError::DegenerateTiming {
                kernel: "simd",
                min: Duration::ZERO
            })
        );
    }

    #[test]
    fn missing_samples_give_no_speedup() {
        let samples = vec![sample("naive", 10, 0)];
        let naive = KernelSummary::from_samples("naive", &samples, None);
        let simd = KernelSummary::from_samples("simd", &samples, None);
        assert_eq!(simd.min(), None);
        assert_eq!(speedup(&naive, &simd), Ok(None));
    }

    #[test]
    fn renders_timeouts_and_missing_speedup() {
        let samples = vec![sample("simd", 2, 0)];
        let timeout = FilmBenchError::TrialTimeout {
            kernel: "naive",
            trial: 0,
            elapsed: Duration::from_millis(50),
            limit: Duration::from_millis(10),
        };
        let report = BenchmarkReport::new(
            (100, 50),
            KernelConfig::new(1, 1.0).unwrap(),
            samples.clone(),
            KernelSummary::from_samples("naive", &samples, Some(timeout)),
            KernelSummary::from_samples("simd", &samples, None),
            None,
            0.0,
            Duration::from_micros(1500),
        );
        assert!(report.is_partial());
        let text = report.to_string();
        assert!(text.starts_with("Image Resolution: 100x50\n"));
        assert!(text.contains("[CPU] Naive Gaussian Blur: timed out (trial 0)\n"));
        assert!(text.contains("[WAS] SIMD Gaussian Blur:  2.00 ms\n"));
        assert!(text.contains("      => Speedup: n/a\n"));
        assert!(text.contains("[GPU] Procedural Grain:    1.50 ms (Non-blocking)\n"));
        assert!(text.ends_with("Benchmark Complete."));
    }

    #[test]
    fn tags_standard_resolutions() {
        assert_eq!(resolution_tag(3840, 2160), Some("4K"));
        assert_eq!(resolution_tag(1920, 1080), Some("1080p"));
        assert_eq!(resolution_tag(640, 480), None);
    }
}
