//! Timed iteration driver.
//!
//! Every benchmark runs `iterations + 1` repetitions of its step. Repetition 0
//! is a warm-up that absorbs first-use costs such as lazy pipeline
//! compilation. The stopwatch starts right before repetition 1 and stops
//! after the last repetition and a final device synchronize, before any data
//! returns to the host.

use std::time::{Duration, Instant};

use tracing::debug;

use prk_core::{ComputeBackend, Element, Result};

use crate::config::RunConfig;
use crate::grid::{DeviceGrid, Grid};
use crate::session::Workload;
use crate::stencil::StencilOperator;
use crate::validation::{self, StencilReport};

/// Source of elapsed time for the timed portion of a run.
pub trait Stopwatch {
    /// Begin timing.
    fn start(&mut self);

    /// End timing and return the elapsed duration since `start`.
    fn stop(&mut self) -> Duration;
}

/// Wall-clock stopwatch.
#[derive(Debug, Default)]
pub struct WallStopwatch {
    started: Option<Instant>,
}

impl WallStopwatch {
    /// Create a stopped stopwatch.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stopwatch for WallStopwatch {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn stop(&mut self) -> Duration {
        self.started
            .take()
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }
}

/// Elapsed time of the timed repetitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingRecord {
    /// Total duration of the timed repetitions.
    pub elapsed: Duration,
    /// Number of timed repetitions.
    pub iterations: usize,
}

impl TimingRecord {
    /// Average seconds per timed repetition.
    pub fn avg_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64() / self.iterations.max(1) as f64
    }
}

/// Run `step` for repetitions `0..=iterations`, timing all but the first.
///
/// `finish` runs after the last repetition while the stopwatch is still
/// running. It is where backends drain outstanding work.
pub fn run_timed<S, F, G>(iterations: usize, stopwatch: &mut S, mut step: F, finish: G) -> Result<TimingRecord>
where
    S: Stopwatch,
    F: FnMut(usize) -> Result<()>,
    G: FnOnce() -> Result<()>,
{
    for iter in 0..=iterations {
        if iter == 1 {
            stopwatch.start();
        }
        step(iter)?;
    }
    finish()?;
    let elapsed = stopwatch.stop();

    Ok(TimingRecord {
        elapsed,
        iterations,
    })
}

/// Host results of a stencil run.
#[derive(Debug)]
pub struct StencilRun<T: Element> {
    /// Grid after the last repetition.
    pub grid: Grid<T>,
    /// Timed portion.
    pub timing: TimingRecord,
}

/// Run the stencil benchmark on `backend`.
///
/// Each repetition applies the operator, increments the input and waits for
/// the device.
pub fn run_stencil<B, T, S>(
    backend: &B,
    config: &RunConfig,
    operator: &StencilOperator,
    stopwatch: &mut S,
) -> Result<StencilRun<T>>
where
    B: ComputeBackend,
    T: Element,
    S: Stopwatch,
{
    let mut grid = Grid::<T>::new(config.n());
    grid.initialize();

    let mut device = DeviceGrid::acquire(backend, &grid, config.tile_size())?;
    let timing = run_timed(
        config.iterations(),
        stopwatch,
        |_| {
            operator.apply(&mut device)?;
            device.increment()?;
            backend.synchronize()
        },
        || backend.synchronize(),
    )?;
    device.sync_to_host(&mut grid)?;

    debug!(
        "{} on {}: {} iterations in {:?}",
        config.descriptor(),
        backend.kind(),
        timing.iterations,
        timing.elapsed
    );

    Ok(StencilRun { grid, timing })
}

impl Workload for RunConfig {
    type Report = StencilReport;

    fn element_count(&self) -> usize {
        self.n() * self.n()
    }

    fn run<B: ComputeBackend, T: Element>(&self, backend: &B) -> Result<StencilReport> {
        let operator = StencilOperator::lookup(self.descriptor());
        let run = run_stencil::<B, T, _>(backend, self, &operator, &mut WallStopwatch::new())?;
        Ok(validation::validate_stencil(self, &run.grid, &run.timing))
    }
}
