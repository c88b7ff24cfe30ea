//! Per-backend run orchestration.
//!
//! A [`Session`] walks the selected backends in preference order. Each
//! attempt moves through a small state machine:
//!
//! ```text
//! Admit --skip--> done
//!   |
//! Probe --unreachable--> done
//!   |
//! Decide --> Run(f32) --> Run(f64) --> done
//! ```
//!
//! Every step records an [`Outcome`]. Run failures are reported and the next
//! run proceeds. Only a failure to set up a host backend ends the session.

use tracing::{debug, warn};

use prk_core::{BackendKind, ComputeBackend, DeviceInfo, Element, Precision, Result};
use prk_cpu::{ParallelBackend, ReferenceBackend};
#[cfg(feature = "wgpu")]
use prk_wgpu::WgpuBackend;

use crate::negotiate::{self, Decision, Plan, SkipReason};
use crate::report;

/// A benchmark that can run on any backend at either precision.
pub trait Workload {
    /// Printable result of one run.
    type Report: std::fmt::Display;

    /// Elements in the problem, for the reference size gate.
    fn element_count(&self) -> usize;

    /// Execute one run with element type `T`.
    fn run<B: ComputeBackend, T: Element>(&self, backend: &B) -> Result<Self::Report>;
}

/// A probed, ready backend.
pub enum Device {
    /// Sequential host reference.
    Reference(ReferenceBackend),
    /// rayon thread pool.
    Cpu(ParallelBackend),
    /// WebGPU device.
    #[cfg(feature = "wgpu")]
    Gpu(WgpuBackend),
}

impl Device {
    /// Create the backend of `kind`.
    pub async fn probe(kind: BackendKind) -> Result<Self> {
        match kind {
            BackendKind::Reference => Ok(Device::Reference(ReferenceBackend::new())),
            BackendKind::Cpu => Ok(Device::Cpu(ParallelBackend::new(None)?)),
            BackendKind::Gpu => probe_gpu().await,
        }
    }

    /// Identity and capabilities.
    pub fn info(&self) -> &DeviceInfo {
        match self {
            Device::Reference(b) => b.device(),
            Device::Cpu(b) => b.device(),
            #[cfg(feature = "wgpu")]
            Device::Gpu(b) => b.device(),
        }
    }

    /// Run `workload` at `precision`.
    pub fn run<W: Workload>(&self, workload: &W, precision: Precision) -> Result<W::Report> {
        match self {
            Device::Reference(b) => run_on(b, workload, precision),
            Device::Cpu(b) => run_on(b, workload, precision),
            #[cfg(feature = "wgpu")]
            Device::Gpu(b) => run_on(b, workload, precision),
        }
    }
}

#[cfg(feature = "wgpu")]
async fn probe_gpu() -> Result<Device> {
    Ok(Device::Gpu(WgpuBackend::new().await?))
}

#[cfg(not(feature = "wgpu"))]
async fn probe_gpu() -> Result<Device> {
    Err(prk_core::PrkError::BackendUnavailable(
        "built without the wgpu feature".to_string(),
    ))
}

fn run_on<B: ComputeBackend, W: Workload>(backend: &B, workload: &W, precision: Precision) -> Result<W::Report> {
    match precision {
        Precision::Single => workload.run::<B, f32>(backend),
        Precision::Double => workload.run::<B, f64>(backend),
    }
}

/// What happened to one (backend, precision) pair.
#[derive(Debug)]
pub enum Outcome<R> {
    /// The run completed. The report says whether it validated.
    Completed {
        /// Backend.
        backend: BackendKind,
        /// Element precision.
        precision: Precision,
        /// Run result.
        report: R,
    },
    /// The run was not attempted. `precision` is `None` when the whole backend was skipped.
    Skipped {
        /// Backend.
        backend: BackendKind,
        /// Skipped precision, if only one was.
        precision: Option<Precision>,
        /// Why.
        reason: SkipReason,
    },
    /// The run raised an error and was abandoned.
    Failed {
        /// Backend.
        backend: BackendKind,
        /// Element precision.
        precision: Precision,
        /// Error text as printed.
        error: String,
    },
}

impl<R> Outcome<R> {
    /// Backend this outcome belongs to.
    pub fn backend(&self) -> BackendKind {
        match self {
            Outcome::Completed { backend, .. }
            | Outcome::Skipped { backend, .. }
            | Outcome::Failed { backend, .. } => *backend,
        }
    }

    /// Report of a completed run.
    pub fn report(&self) -> Option<&R> {
        match self {
            Outcome::Completed { report, .. } => Some(report),
            _ => None,
        }
    }
}

enum Attempt {
    Admit(BackendKind),
    Probe(BackendKind),
    Decide(Device),
    Run(Device, Plan),
    Done,
}

/// Walk `plan`, running each admitted precision through `run`.
///
/// A skipped or failed precision does not stop the ones after it.
fn run_plan<R, F>(backend: BackendKind, plan: Plan, mut run: F) -> Vec<Outcome<R>>
where
    R: std::fmt::Display,
    F: FnMut(Precision) -> Result<R>,
{
    plan.steps
        .into_iter()
        .map(|(precision, decision)| match decision {
            Decision::Skip(reason) => {
                println!("{}", reason);
                Outcome::Skipped {
                    backend,
                    precision: Some(precision),
                    reason,
                }
            }
            Decision::Run => match run(precision) {
                Ok(report) => {
                    println!("{}", report);
                    Outcome::Completed {
                        backend,
                        precision,
                        report,
                    }
                }
                Err(e) => {
                    println!("{}", e);
                    Outcome::Failed {
                        backend,
                        precision,
                        error: e.to_string(),
                    }
                }
            },
        })
        .collect()
}

/// Ordered set of backends to attempt.
#[derive(Debug, Clone)]
pub struct Session {
    backends: Vec<BackendKind>,
}

impl Session {
    /// Attempt `backends`, always in preference order and each at most once.
    pub fn new(backends: impl IntoIterator<Item = BackendKind>) -> Self {
        let mut backends: Vec<_> = backends.into_iter().collect();
        backends.sort();
        backends.dedup();
        Self { backends }
    }

    /// Selected backends in attempt order.
    pub fn backends(&self) -> &[BackendKind] {
        &self.backends
    }

    /// Run `workload` on every selected backend and precision.
    ///
    /// Results and diagnostics are printed as they happen. The returned
    /// outcomes are in the same order. Errors are returned only for fatal
    /// host setup failures.
    pub async fn run<W: Workload>(&self, workload: &W) -> Result<Vec<Outcome<W::Report>>> {
        let mut outcomes = Vec::new();

        for &kind in &self.backends {
            let mut state = Attempt::Admit(kind);
            loop {
                state = match state {
                    Attempt::Admit(kind) => match negotiate::admit(kind, workload.element_count()) {
                        Some(reason) => {
                            println!("{}", reason);
                            outcomes.push(Outcome::Skipped {
                                backend: kind,
                                precision: None,
                                reason,
                            });
                            Attempt::Done
                        }
                        None => Attempt::Probe(kind),
                    },

                    Attempt::Probe(kind) => match Device::probe(kind).await {
                        Ok(device) => Attempt::Decide(device),
                        Err(e) if kind.is_accelerator() => {
                            warn!("{} backend unavailable: {}", kind, e);
                            let reason = SkipReason::Unavailable(e.to_string());
                            println!("{}", reason);
                            outcomes.push(Outcome::Skipped {
                                backend: kind,
                                precision: None,
                                reason,
                            });
                            Attempt::Done
                        }
                        Err(e) => return Err(e),
                    },

                    Attempt::Decide(device) => {
                        print!("{}", report::device_banner(device.info()));
                        let plan = negotiate::decide(device.info());
                        debug!("{} plan: {:?}", kind, plan.steps);
                        Attempt::Run(device, plan)
                    }

                    Attempt::Run(device, plan) => {
                        outcomes.extend(run_plan(kind, plan, |precision| {
                            device.run(workload, precision)
                        }));
                        Attempt::Done
                    }

                    Attempt::Done => break,
                };
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use prk_core::{CapabilityFlag, PrkError};

    use crate::config::RunConfig;
    use crate::stencil::Pattern;
    use crate::validation::StencilReport;

    /// Fails every single-precision run and reports the precision otherwise.
    struct SinglePrecisionFails;

    impl Workload for SinglePrecisionFails {
        type Report = Precision;

        fn element_count(&self) -> usize {
            16
        }

        fn run<B: ComputeBackend, T: Element>(&self, _backend: &B) -> Result<Precision> {
            match T::PRECISION {
                Precision::Single => Err(PrkError::LaunchFailed("f32 kernel rejected".to_string())),
                Precision::Double => Ok(Precision::Double),
            }
        }
    }

    fn summary(outcomes: &[Outcome<Precision>]) -> Vec<(BackendKind, &'static str, Option<Precision>)> {
        outcomes
            .iter()
            .map(|o| match o {
                Outcome::Completed { backend, precision, .. } => (*backend, "completed", Some(*precision)),
                Outcome::Skipped { backend, precision, .. } => (*backend, "skipped", *precision),
                Outcome::Failed { backend, precision, .. } => (*backend, "failed", Some(*precision)),
            })
            .collect()
    }

    fn completed(outcomes: &[Outcome<StencilReport>], kind: BackendKind) -> Vec<&StencilReport> {
        outcomes
            .iter()
            .filter(|o| o.backend() == kind)
            .filter_map(|o| o.report())
            .collect()
    }

    #[test]
    fn test_session_order_is_fixed() {
        let session = Session::new([BackendKind::Gpu, BackendKind::Reference, BackendKind::Gpu]);
        assert_eq!(session.backends(), &[BackendKind::Reference, BackendKind::Gpu]);
    }

    #[tokio::test]
    async fn test_host_backends_validate() {
        let session = Session::new([BackendKind::Reference, BackendKind::Cpu]);
        let config = RunConfig::new(5, 20, 32, Pattern::Star, 2).unwrap();
        let outcomes = session.run(&config).await.unwrap();

        assert_eq!(outcomes.len(), 4);
        for kind in [BackendKind::Reference, BackendKind::Cpu] {
            let reports = completed(&outcomes, kind);
            assert_eq!(reports.len(), 2);
            assert!(reports.iter().all(|r| r.is_valid()));
        }
    }

    #[tokio::test]
    async fn test_reference_skipped_for_large_grid() {
        let session = Session::new([BackendKind::Reference, BackendKind::Cpu]);
        // 317^2 = 100_489 elements.
        let config = RunConfig::new(1, 317, 32, Pattern::Star, 1).unwrap();
        let outcomes = session.run(&config).await.unwrap();

        assert!(matches!(
            outcomes[0],
            Outcome::Skipped {
                backend: BackendKind::Reference,
                precision: None,
                reason: SkipReason::TooLarge { .. },
            }
        ));
        let cpu = completed(&outcomes, BackendKind::Cpu);
        assert_eq!(cpu.len(), 2);
        assert!(cpu.iter().all(|r| r.is_valid()));
    }

    #[tokio::test]
    async fn test_failed_run_does_not_stop_session() {
        let session = Session::new([BackendKind::Reference, BackendKind::Cpu]);
        let outcomes = session.run(&SinglePrecisionFails).await.unwrap();

        assert_eq!(
            summary(&outcomes),
            vec![
                (BackendKind::Reference, "failed", Some(Precision::Single)),
                (BackendKind::Reference, "completed", Some(Precision::Double)),
                (BackendKind::Cpu, "failed", Some(Precision::Single)),
                (BackendKind::Cpu, "completed", Some(Precision::Double)),
            ]
        );
        match &outcomes[0] {
            Outcome::Failed { error, .. } => assert!(error.contains("f32 kernel rejected")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(not(feature = "wgpu"))]
    #[tokio::test]
    async fn test_unreachable_accelerator_is_skipped() {
        let session = Session::new(BackendKind::ALL.iter().copied());
        let outcomes = session.run(&SinglePrecisionFails).await.unwrap();

        assert_eq!(outcomes.len(), 5);
        match &outcomes[4] {
            Outcome::Skipped {
                backend: BackendKind::Gpu,
                precision: None,
                reason: SkipReason::Unavailable(msg),
            } => assert!(msg.contains("wgpu feature")),
            other => panic!("expected gpu skip, got {:?}", other),
        }
        assert_eq!(
            summary(&outcomes)[3],
            (BackendKind::Cpu, "completed", Some(Precision::Double))
        );
    }

    #[test]
    fn test_skipped_precision_lets_other_run() {
        let plan = Plan {
            steps: vec![
                (Precision::Single, Decision::Run),
                (
                    Precision::Double,
                    Decision::Skip(SkipReason::MissingCapability(CapabilityFlag::Float64)),
                ),
            ],
        };
        let mut attempted = Vec::new();
        let outcomes = run_plan(BackendKind::Gpu, plan, |precision| {
            attempted.push(precision);
            Ok(precision)
        });

        assert_eq!(attempted, vec![Precision::Single]);
        assert_eq!(
            summary(&outcomes),
            vec![
                (BackendKind::Gpu, "completed", Some(Precision::Single)),
                (BackendKind::Gpu, "skipped", Some(Precision::Double)),
            ]
        );
    }

    #[test]
    fn test_failure_then_success_in_one_plan() {
        let plan = Plan {
            steps: vec![
                (Precision::Single, Decision::Run),
                (Precision::Double, Decision::Run),
            ],
        };
        let outcomes = run_plan(BackendKind::Cpu, plan, |precision| match precision {
            Precision::Single => Err(PrkError::LaunchFailed("boom".to_string())),
            Precision::Double => Ok(precision),
        });
        assert_eq!(
            summary(&outcomes),
            vec![
                (BackendKind::Cpu, "failed", Some(Precision::Single)),
                (BackendKind::Cpu, "completed", Some(Precision::Double)),
            ]
        );
    }
}
