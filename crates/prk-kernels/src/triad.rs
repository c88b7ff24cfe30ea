//! STREAM triad: `A += B + scalar * C`.

use tracing::debug;

use prk_core::{ComputeBackend, Element, Result};

use crate::config::TriadConfig;
use crate::driver::{run_timed, Stopwatch, TimingRecord, WallStopwatch};
use crate::session::Workload;
use crate::validation::{self, TriadReport, TRIAD_INIT, TRIAD_SCALAR};

/// Host results of a triad run.
#[derive(Debug)]
pub struct TriadRun<T: Element> {
    /// Final contents of `A`.
    pub a: Vec<T>,
    /// Timed portion.
    pub timing: TimingRecord,
}

/// Run the triad benchmark on `backend`.
pub fn run_triad<B, T, S>(backend: &B, config: &TriadConfig, stopwatch: &mut S) -> Result<TriadRun<T>>
where
    B: ComputeBackend,
    T: Element,
    S: Stopwatch,
{
    let len = config.length();
    let init = T::from_f64(TRIAD_INIT);
    let scalar = T::from_f64(TRIAD_SCALAR);

    let mut a = backend.upload(&vec![T::zero(); len])?;
    let b = backend.upload(&vec![init; len])?;
    let c = backend.upload(&vec![init; len])?;

    let timing = run_timed(
        config.iterations(),
        stopwatch,
        |_| {
            backend.triad(&mut a, &b, &c, scalar)?;
            backend.synchronize()
        },
        || backend.synchronize(),
    )?;

    let mut host = vec![T::zero(); len];
    backend.download(&a, &mut host)?;

    debug!(
        "triad on {}: {} iterations in {:?}",
        backend.kind(),
        timing.iterations,
        timing.elapsed
    );

    Ok(TriadRun { a: host, timing })
}

impl Workload for TriadConfig {
    type Report = TriadReport;

    fn element_count(&self) -> usize {
        self.length()
    }

    fn run<B: ComputeBackend, T: Element>(&self, backend: &B) -> Result<TriadReport> {
        let run = run_triad::<B, T, _>(backend, self, &mut WallStopwatch::new())?;
        Ok(validation::validate_triad(self, &run.a, &run.timing))
    }
}
