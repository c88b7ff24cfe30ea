//! Coefficient generation.
//!
//! The star stencil of radius `r` is a discrete divergence: along each axis,
//! tap `+k` has weight `1/(2kr)` and tap `-k` has weight `-1/(2kr)`. The
//! center weight is zero. Applied to the field `i + j` it yields exactly 2 at
//! every interior point, which is what the validation reference relies on.

use prk_core::{Pattern, Result, StencilKernel, Tap};

/// Weight of the tap at distance `k` of a star stencil of the given radius.
pub fn star_weight(k: usize, radius: usize) -> f64 {
    1.0 / (2.0 * k as f64 * radius as f64)
}

/// Build the star kernel of `radius`, center tap first.
pub fn star(radius: usize) -> Result<StencilKernel> {
    let mut taps = Vec::with_capacity(Pattern::Star.stencil_size(radius));
    taps.push(Tap::new(0, 0, 0.0));
    for k in 1..=radius {
        let w = star_weight(k, radius);
        let d = k as isize;
        taps.push(Tap::new(0, d, w));
        taps.push(Tap::new(0, -d, -w));
        taps.push(Tap::new(d, 0, w));
        taps.push(Tap::new(-d, 0, -w));
    }
    StencilKernel::new(Pattern::Star, radius, taps)
}
