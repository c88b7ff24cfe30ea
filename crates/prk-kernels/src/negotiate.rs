//! Capability negotiation.
//!
//! Decides, per backend and precision, whether a run is attempted. The
//! decisions are pure functions of the workload size and the probed
//! [`DeviceInfo`], so they can be checked without touching real devices.

use std::fmt;

use prk_core::{BackendKind, Capabilities, CapabilityFlag, DeviceInfo, Precision};

/// Element count at or above which the sequential reference is skipped.
pub const REFERENCE_SIZE_LIMIT: usize = 100_000;

/// Why a backend or a precision was not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The workload is too large for the sequential reference.
    TooLarge {
        /// Elements in the workload.
        elements: usize,
        /// Threshold.
        limit: usize,
    },
    /// The backend could not be reached.
    Unavailable(String),
    /// The device lacks a required feature.
    MissingCapability(CapabilityFlag),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooLarge { .. } => {
                write!(f, "Skipping host device since it is too slow for large problems")
            }
            SkipReason::Unavailable(msg) => write!(f, "Skipping device: {}", msg),
            SkipReason::MissingCapability(CapabilityFlag::KernelCompilation) => {
                write!(f, "GPU device lacks compute shader support.")
            }
            SkipReason::MissingCapability(CapabilityFlag::Float64) => {
                write!(f, "GPU device lacks FP64 support.")
            }
        }
    }
}

/// Outcome of negotiating one precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Attempt the run.
    Run,
    /// Do not attempt the run.
    Skip(SkipReason),
}

/// Per-precision decisions for one device, in run order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// One entry per precision.
    pub steps: Vec<(Precision, Decision)>,
}

impl Plan {
    /// Precisions that will run.
    pub fn runnable(&self) -> impl Iterator<Item = Precision> + '_ {
        self.steps
            .iter()
            .filter(|(_, d)| *d == Decision::Run)
            .map(|(p, _)| *p)
    }
}

/// Gate applied before a backend is probed at all.
pub fn admit(kind: BackendKind, elements: usize) -> Option<SkipReason> {
    if kind == BackendKind::Reference && elements >= REFERENCE_SIZE_LIMIT {
        return Some(SkipReason::TooLarge {
            elements,
            limit: REFERENCE_SIZE_LIMIT,
        });
    }
    None
}

/// Capabilities a device of `kind` needs to run at `precision`.
///
/// Accelerators must compile kernels. Each precision may add its own flag.
pub fn required(kind: BackendKind, precision: Precision) -> Capabilities {
    let mut required = Capabilities::new();
    if kind.is_accelerator() {
        required.add(CapabilityFlag::KernelCompilation);
    }
    if let Some(flag) = precision.required_capability() {
        required.add(flag);
    }
    required
}

/// Decide which precisions run on a probed device.
///
/// A precision is skipped for the first capability it misses.
pub fn decide(device: &DeviceInfo) -> Plan {
    let steps = Precision::ALL
        .iter()
        .map(|&precision| {
            let required = required(device.kind, precision);
            let decision = if device.capabilities.satisfies(&required) {
                Decision::Run
            } else {
                match device.capabilities.missing(&required).first() {
                    Some(&flag) => Decision::Skip(SkipReason::MissingCapability(flag)),
                    None => Decision::Run,
                }
            };
            (precision, decision)
        })
        .collect();

    Plan { steps }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(kind: BackendKind, flags: &[CapabilityFlag]) -> DeviceInfo {
        DeviceInfo::new(kind, "test", "test", Capabilities::with_flags(flags.iter().copied()))
    }

    #[test]
    fn test_reference_size_gate() {
        assert_eq!(admit(BackendKind::Reference, 99_999), None);
        assert!(matches!(
            admit(BackendKind::Reference, 100_000),
            Some(SkipReason::TooLarge { .. })
        ));
        assert_eq!(admit(BackendKind::Cpu, 10_000_000), None);
        assert_eq!(admit(BackendKind::Gpu, 10_000_000), None);
    }

    #[test]
    fn test_full_gpu_runs_both() {
        let gpu = device(
            BackendKind::Gpu,
            &[CapabilityFlag::KernelCompilation, CapabilityFlag::Float64],
        );
        let plan = decide(&gpu);
        assert_eq!(plan.runnable().collect::<Vec<_>>(), Precision::ALL.to_vec());
    }

    #[test]
    fn test_gpu_without_fp64() {
        let gpu = device(BackendKind::Gpu, &[CapabilityFlag::KernelCompilation]);
        let plan = decide(&gpu);
        assert_eq!(plan.runnable().collect::<Vec<_>>(), vec![Precision::Single]);
        assert_eq!(
            plan.steps[1],
            (
                Precision::Double,
                Decision::Skip(SkipReason::MissingCapability(CapabilityFlag::Float64))
            )
        );
        assert_eq!(
            SkipReason::MissingCapability(CapabilityFlag::Float64).to_string(),
            "GPU device lacks FP64 support."
        );
    }

    #[test]
    fn test_gpu_without_compute() {
        let gpu = device(BackendKind::Gpu, &[CapabilityFlag::Float64]);
        let plan = decide(&gpu);
        assert_eq!(plan.runnable().count(), 0);
        for (_, decision) in &plan.steps {
            assert_eq!(
                *decision,
                Decision::Skip(SkipReason::MissingCapability(CapabilityFlag::KernelCompilation))
            );
        }
    }

    #[test]
    fn test_bare_gpu_reports_compilation_first() {
        let gpu = device(BackendKind::Gpu, &[]);
        assert_eq!(
            decide(&gpu).steps[1].1,
            Decision::Skip(SkipReason::MissingCapability(CapabilityFlag::KernelCompilation))
        );
    }

    #[test]
    fn test_required_capabilities() {
        let gpu_f64 = required(BackendKind::Gpu, Precision::Double);
        assert!(gpu_f64.has(CapabilityFlag::KernelCompilation));
        assert!(gpu_f64.has(CapabilityFlag::Float64));
        assert!(required(BackendKind::Cpu, Precision::Single).is_empty());
        assert!(!required(BackendKind::Cpu, Precision::Double).has(CapabilityFlag::KernelCompilation));
    }

    #[test]
    fn test_host_needs_no_compilation() {
        let cpu = device(BackendKind::Cpu, &[CapabilityFlag::Float64]);
        assert_eq!(decide(&cpu).runnable().count(), 2);
    }
}
