//! Procedural grain as an external, asynchronously timed unit of work.
//!
//! The harness never synthesizes grain itself. It only issues a job through
//! [`GrainGenerator::run_async`] and later awaits the duration the device
//! reports. [`RayonGrainDevice`] is a reference device that runs a
//! hash-noise grain pass on the rayon thread pool.

use std::time::{Duration, Instant};

use futures::channel::oneshot;
use futures::future::BoxFuture;
use futures::FutureExt;
use rayon::prelude::*;
use tracing::debug;

use crate::{FilmBenchError, Result};

/// Pending grain job. Resolves to the device-reported elapsed time.
pub type GrainHandle = BoxFuture<'static, Result<Duration>>;

/// A compute device that can run the grain pass without blocking the caller.
pub trait GrainGenerator: Send + Sync {
    /// Issues the grain job and returns immediately.
    fn run_async(&self) -> GrainHandle;
}

/// Reference grain device backed by the global rayon pool.
#[derive(Clone, Debug)]
pub struct RayonGrainDevice {
    width: usize,
    height: usize,
    intensity: f32,
    seed: u32,
}

impl RayonGrainDevice {
    pub fn new(width: usize, height: usize, intensity: f32) -> Self {
        Self {
            width,
            height,
            intensity,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

impl GrainGenerator for RayonGrainDevice {
    fn run_async(&self) -> GrainHandle {
        let (tx, rx) = oneshot::channel();
        let Self {
            width,
            height,
            intensity,
            seed,
        } = *self;

        rayon::spawn(move || {
            let start = Instant::now();
            let grain = synthesize_grain(width, height, intensity, seed);
            let elapsed = start.elapsed();
            std::hint::black_box(grain);
            debug!(width, height, ?elapsed, "grain pass finished");
            // The receiver may already be gone if the caller abandoned the run.
            let _ = tx.send(elapsed);
        });

        rx.map(|reported| {
            reported.map_err(|_| {
                FilmBenchError::GrainDevice("grain job dropped before reporting".to_string())
            })
        })
        .boxed()
    }
}

/// Signed grain offsets in `[-intensity / 2, intensity / 2]`, row-major.
///
/// Uses the classic `fract(sin(dot(p, (12.9898, 78.233))) * 43758.5453)`
/// hash, so the pattern depends only on pixel position and `seed`.
pub fn synthesize_grain(width: usize, height: usize, intensity: f32, seed: u32) -> Vec<f32> {
    let mut out = vec![0f32; width * height];
    if width == 0 {
        return out;
    }
    let offset = seed as f32 * 0.618_034;
    out.par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, sample) in row.iter_mut().enumerate() {
                let noise = hash(x as f32 + offset, y as f32 + offset);
                *sample = (noise - 0.5) * intensity;
            }
        });
    out
}

#[inline(always)]
fn hash(x: f32, y: f32) -> f32 {
    let v = (x * 12.9898 + y * 78.233).sin() * 43758.547;
    v - v.floor()
}
