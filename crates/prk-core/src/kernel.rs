//! Coefficient form of a stencil operator.
//!
//! A [`StencilKernel`] is the backend-facing description of a filter: a list
//! of taps, each an integer offset from the center point and a weight.
//! Backends only ever see this form; choosing which kernel to build is the
//! caller's concern.

use std::fmt;

use crate::error::{PrkError, Result};

/// Shape of a stencil footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Points on the row and column through the center.
    Star,
    /// The full square neighborhood.
    Grid,
}

impl Pattern {
    /// Number of points in the footprint of the given radius.
    pub fn stencil_size(self, radius: usize) -> usize {
        match self {
            Pattern::Star => 4 * radius + 1,
            Pattern::Grid => (2 * radius + 1) * (2 * radius + 1),
        }
    }

    /// Pattern name as typed on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::Star => "star",
            Pattern::Grid => "grid",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted point of a stencil.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Row offset from the center.
    pub di: isize,
    /// Column offset from the center.
    pub dj: isize,
    /// Coefficient.
    pub weight: f64,
}

impl Tap {
    /// Create a tap.
    pub const fn new(di: isize, dj: isize, weight: f64) -> Self {
        Self { di, dj, weight }
    }
}

/// Taps of a stencil of a given pattern and radius.
#[derive(Debug, Clone, PartialEq)]
pub struct StencilKernel {
    pattern: Pattern,
    radius: usize,
    taps: Vec<Tap>,
}

impl StencilKernel {
    /// Build a kernel, rejecting taps that fall outside the radius.
    pub fn new(pattern: Pattern, radius: usize, taps: Vec<Tap>) -> Result<Self> {
        if radius == 0 {
            return Err(PrkError::UnsupportedKernel(
                "stencil radius must be positive".to_string(),
            ));
        }
        let r = radius as isize;
        if let Some(tap) = taps.iter().find(|t| t.di.abs() > r || t.dj.abs() > r) {
            return Err(PrkError::UnsupportedKernel(format!(
                "tap ({}, {}) exceeds radius {}",
                tap.di, tap.dj, radius
            )));
        }
        Ok(Self {
            pattern,
            radius,
            taps,
        })
    }

    /// Footprint pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Maximum offset of any tap.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// All taps, center included.
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Points in the footprint.
    pub fn stencil_size(&self) -> usize {
        self.pattern.stencil_size(self.radius)
    }

    /// Dense `(2r+1) x (2r+1)` row-major weight matrix centered at `(r, r)`.
    pub fn weight_matrix(&self) -> Vec<f64> {
        let width = 2 * self.radius + 1;
        let r = self.radius as isize;
        let mut weights = vec![0.0; width * width];
        for tap in &self.taps {
            let row = (r + tap.di) as usize;
            let col = (r + tap.dj) as usize;
            weights[row * width + col] += tap.weight;
        }
        weights
    }

    /// Short identifier such as `star2`.
    pub fn label(&self) -> String {
        format!("{}{}", self.pattern, self.radius)
    }
}
