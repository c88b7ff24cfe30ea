//! Backend kinds and probed device identity.

use std::fmt;
use std::str::FromStr;

use crate::capabilities::{Capabilities, CapabilityFlag};
use crate::error::PrkError;

/// Execution backend, in the fixed preference order runs are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// Sequential host reference. Only useful for small problems.
    Reference,
    /// General-purpose multi-threaded host backend.
    Cpu,
    /// Accelerator backend (WebGPU).
    Gpu,
}

impl BackendKind {
    /// All backends in preference order.
    pub const ALL: [BackendKind; 3] = [BackendKind::Reference, BackendKind::Cpu, BackendKind::Gpu];

    /// Short lowercase name, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Reference => "reference",
            BackendKind::Cpu => "cpu",
            BackendKind::Gpu => "gpu",
        }
    }

    /// Accelerator backends must report kernel compilation support before use.
    pub fn is_accelerator(self) -> bool {
        matches!(self, BackendKind::Gpu)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = PrkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "host" => Ok(BackendKind::Reference),
            "cpu" => Ok(BackendKind::Cpu),
            "gpu" | "wgpu" => Ok(BackendKind::Gpu),
            other => Err(PrkError::usage(format!("ERROR: unknown backend '{}'", other))),
        }
    }
}

/// Identity and feature set of a probed device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Backend this device belongs to.
    pub kind: BackendKind,
    /// Device name (adapter name for GPUs).
    pub name: String,
    /// Platform or driver description.
    pub platform: String,
    /// Features the device supports.
    pub capabilities: Capabilities,
}

impl DeviceInfo {
    /// Create device info.
    pub fn new(
        kind: BackendKind,
        name: impl Into<String>,
        platform: impl Into<String>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            platform: platform.into(),
            capabilities,
        }
    }

    /// Check a single capability.
    pub fn has(&self, flag: CapabilityFlag) -> bool {
        self.capabilities.has(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_order() {
        assert!(BackendKind::Reference < BackendKind::Cpu);
        assert!(BackendKind::Cpu < BackendKind::Gpu);
        assert!(BackendKind::Gpu.is_accelerator());
        assert!(!BackendKind::Cpu.is_accelerator());
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("cpu".parse::<BackendKind>().unwrap(), BackendKind::Cpu);
        assert_eq!(" GPU ".parse::<BackendKind>().unwrap(), BackendKind::Gpu);
        assert_eq!("host".parse::<BackendKind>().unwrap(), BackendKind::Reference);
        assert!("fpga".parse::<BackendKind>().unwrap_err().is_usage());
    }

    #[test]
    fn test_backend_display_roundtrip() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }
}
