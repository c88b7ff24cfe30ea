//! Correctness checks and throughput accounting.

use std::fmt;

use prk_core::{Element, Precision};

use crate::config::{RunConfig, TriadConfig};
use crate::driver::TimingRecord;
use crate::grid::Grid;

/// Tolerance of both checksum comparisons.
pub const EPSILON: f64 = 1.0e-8;

/// Triad scalar.
pub const TRIAD_SCALAR: f64 = 3.0;

/// Initial value of the triad `B` and `C` vectors.
pub const TRIAD_INIT: f64 = 2.0;

/// Mean absolute value of `output` over the active region of an `n x n` grid.
pub fn l1_norm<T: Element>(output: &[T], n: usize, radius: usize) -> f64 {
    let side = n - 2 * radius;
    let active_points = (side * side) as f64;
    let mut norm = 0.0;
    for i in radius..n - radius {
        for j in radius..n - radius {
            norm += output[i * n + j].to_f64().abs();
        }
    }
    norm / active_points
}

/// Expected interior norm after `iterations + 1` applications.
pub fn reference_norm(iterations: usize) -> f64 {
    2.0 * (iterations + 1) as f64
}

/// Throughput figures of a validated stencil run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilMetrics {
    /// Points in the active region.
    pub active_points: usize,
    /// Points in the stencil footprint.
    pub stencil_size: usize,
    /// Floating-point operations per application.
    pub flops: usize,
    /// Seconds per timed iteration.
    pub avg_time: f64,
}

impl StencilMetrics {
    /// Derive metrics from the run configuration and timing.
    pub fn new(config: &RunConfig, timing: &TimingRecord) -> Self {
        let active_points = config.active_points();
        let stencil_size = config.descriptor().stencil_size();
        Self {
            active_points,
            stencil_size,
            flops: (2 * stencil_size + 1) * active_points,
            avg_time: timing.avg_seconds(),
        }
    }

    /// Millions of floating-point operations per second.
    pub fn mflops(&self) -> f64 {
        1.0e-6 * self.flops as f64 / self.avg_time
    }
}

/// Result of a stencil run.
#[derive(Debug, Clone, PartialEq)]
pub enum StencilReport {
    /// The interior norm matched the reference.
    Validated {
        /// Element precision of the run.
        precision: Precision,
        /// Throughput figures.
        metrics: StencilMetrics,
    },
    /// The interior norm missed the reference.
    Failed {
        /// Observed interior norm.
        norm: f64,
        /// Expected interior norm.
        reference: f64,
    },
}

impl StencilReport {
    /// True if the run validated.
    pub fn is_valid(&self) -> bool {
        matches!(self, StencilReport::Validated { .. })
    }
}

impl fmt::Display for StencilReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StencilReport::Validated { precision, metrics } => {
                writeln!(f, "Solution validates")?;
                write!(
                    f,
                    "{}B Rate (MFlops/s): {} Avg time (s): {}",
                    precision.bits(),
                    metrics.mflops(),
                    metrics.avg_time
                )
            }
            StencilReport::Failed { norm, reference } => {
                write!(f, "ERROR: L1 norm = {} Reference L1 norm = {}", norm, reference)
            }
        }
    }
}

/// Check the interior norm of `grid` against the closed-form reference.
pub fn validate_stencil<T: Element>(config: &RunConfig, grid: &Grid<T>, timing: &TimingRecord) -> StencilReport {
    let norm = l1_norm(grid.output(), config.n(), config.descriptor().radius);
    let reference = reference_norm(config.iterations());

    if (norm - reference).abs() > EPSILON {
        StencilReport::Failed { norm, reference }
    } else {
        StencilReport::Validated {
            precision: T::PRECISION,
            metrics: StencilMetrics::new(config, timing),
        }
    }
}

/// Result of a triad run.
#[derive(Debug, Clone, PartialEq)]
pub enum TriadReport {
    /// Checksum matched.
    Validated {
        /// Element precision of the run.
        precision: Precision,
        /// Bytes moved per iteration.
        bytes: f64,
        /// Seconds per timed iteration.
        avg_time: f64,
    },
    /// Checksum missed.
    Failed {
        /// Expected checksum.
        expected: f64,
        /// Observed checksum.
        observed: f64,
    },
}

impl TriadReport {
    /// True if the run validated.
    pub fn is_valid(&self) -> bool {
        matches!(self, TriadReport::Validated { .. })
    }
}

impl fmt::Display for TriadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriadReport::Validated {
                precision,
                bytes,
                avg_time,
            } => {
                writeln!(f, "Solution validates")?;
                write!(
                    f,
                    "{}B Rate (MB/s): {} Avg time (s): {}",
                    precision.bits(),
                    1.0e-6 * bytes / avg_time,
                    avg_time
                )
            }
            TriadReport::Failed { expected, observed } => {
                writeln!(f, "Failed Validation on output array")?;
                writeln!(f, "       Expected checksum: {}", expected)?;
                writeln!(f, "       Observed checksum: {}", observed)?;
                write!(f, "ERROR: solution did not validate")
            }
        }
    }
}

/// Expected `sum(|A|)` after the triad loop.
pub fn triad_checksum(config: &TriadConfig) -> f64 {
    let mut ar = 0.0;
    for _ in 0..=config.iterations() {
        ar += TRIAD_INIT + TRIAD_SCALAR * TRIAD_INIT;
    }
    ar * config.length() as f64
}

/// Check `a` against the expected checksum, relative to the observed sum.
pub fn validate_triad<T: Element>(config: &TriadConfig, a: &[T], timing: &TimingRecord) -> TriadReport {
    let expected = triad_checksum(config);
    let observed: f64 = a.iter().map(|v| v.to_f64().abs()).sum();

    if (expected - observed).abs() / observed > EPSILON || observed == 0.0 {
        TriadReport::Failed { expected, observed }
    } else {
        TriadReport::Validated {
            precision: T::PRECISION,
            bytes: 4.0 * config.length() as f64 * T::PRECISION.bytes() as f64,
            avg_time: timing.avg_seconds(),
        }
    }
}
