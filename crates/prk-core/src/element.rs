//! Floating-point element types supported by the kernels.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::capabilities::CapabilityFlag;

/// Numeric precision of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precision {
    /// IEEE-754 binary32.
    Single,
    /// IEEE-754 binary64.
    Double,
}

impl Precision {
    /// Both precisions, in the order runs are attempted.
    pub const ALL: [Precision; 2] = [Precision::Single, Precision::Double];

    /// Element width in bits.
    pub fn bits(self) -> usize {
        match self {
            Precision::Single => 32,
            Precision::Double => 64,
        }
    }

    /// Element width in bytes.
    pub fn bytes(self) -> usize {
        self.bits() / 8
    }

    /// WGSL scalar type name.
    pub fn wgsl_type(self) -> &'static str {
        match self {
            Precision::Single => "f32",
            Precision::Double => "f64",
        }
    }

    /// Device capability an accelerator needs to run at this precision.
    pub fn required_capability(self) -> Option<CapabilityFlag> {
        match self {
            Precision::Single => None,
            Precision::Double => Some(CapabilityFlag::Float64),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wgsl_type())
    }
}

/// Element type of a grid or vector.
///
/// Conversions through f64 are exact for both implementations, so
/// checksums are always accumulated in double precision.
pub trait Element:
    bytemuck::Pod
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + 'static
{
    /// Precision tag of this type.
    const PRECISION: Precision;

    /// Convert from f64 (rounding for f32).
    fn from_f64(value: f64) -> Self;

    /// Widen to f64.
    fn to_f64(self) -> f64;

    /// Additive identity.
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    /// Multiplicative identity.
    fn one() -> Self {
        Self::from_f64(1.0)
    }
}

macro_rules! impl_element {
    ($ty:ty, $precision:expr) => {
        impl Element for $ty {
            const PRECISION: Precision = $precision;

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_element!(f32, Precision::Single);
impl_element!(f64, Precision::Double);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_widths() {
        assert_eq!(Precision::Single.bits(), 32);
        assert_eq!(Precision::Double.bits(), 64);
        assert_eq!(Precision::Double.bytes(), std::mem::size_of::<f64>());
        assert_eq!(<f32 as Element>::PRECISION, Precision::Single);
        assert_eq!(<f64 as Element>::PRECISION, Precision::Double);
    }

    #[test]
    fn test_required_capability() {
        assert_eq!(Precision::Single.required_capability(), None);
        assert_eq!(
            Precision::Double.required_capability(),
            Some(CapabilityFlag::Float64)
        );
    }

    #[test]
    fn test_identities() {
        assert_eq!(f32::zero(), 0.0);
        assert_eq!(f64::one(), 1.0);
        assert_eq!(f32::from_f64(0.125).to_f64(), 0.125);
    }
}
