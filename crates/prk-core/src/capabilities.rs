//! Device capability flags.
//!
//! Tracks which optional features a probed device supports so that
//! (backend, precision) pairs can be skipped before any kernel is submitted.

use std::collections::HashSet;

/// Capability flags for device features.
///
/// Flags order by how fundamental they are, so the first missing flag is the
/// one worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityFlag {
    /// Device can compile and dispatch compute kernels.
    KernelCompilation,
    /// 64-bit floating point (f64) arithmetic in kernels.
    Float64,
}

impl std::fmt::Display for CapabilityFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityFlag::KernelCompilation => write!(f, "kernel_compilation"),
            CapabilityFlag::Float64 => write!(f, "float64"),
        }
    }
}

/// Set of capabilities required or available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    flags: HashSet<CapabilityFlag>,
}

impl Capabilities {
    /// Create empty capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific flags.
    pub fn with_flags(flags: impl IntoIterator<Item = CapabilityFlag>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    /// Add a capability.
    pub fn add(&mut self, flag: CapabilityFlag) {
        self.flags.insert(flag);
    }

    /// Check if capability is present.
    pub fn has(&self, flag: CapabilityFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Check if all required capabilities are satisfied.
    pub fn satisfies(&self, required: &Capabilities) -> bool {
        required.flags.iter().all(|f| self.flags.contains(f))
    }

    /// Get missing capabilities, in flag order.
    pub fn missing(&self, required: &Capabilities) -> Vec<CapabilityFlag> {
        let mut missing: Vec<_> = required
            .flags
            .iter()
            .filter(|f| !self.flags.contains(f))
            .copied()
            .collect();
        missing.sort();
        missing
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
