//! Validated run parameters.
//!
//! Both configurations are built once from command-line values and never
//! change afterwards. Every rejection is a [`PrkError::Usage`] carrying the
//! exact line printed before exiting.

use prk_core::{GridShape, PrkError, Result};

use crate::stencil::{Pattern, StencilDescriptor};

/// Largest grid dimension whose square still fits in an `i32`.
pub const MAX_DIMENSION: usize = 46_340;

/// Tile size used when none is given.
pub const DEFAULT_TILE_SIZE: i64 = 32;

/// Stencil radius used when none is given.
pub const DEFAULT_RADIUS: i64 = 2;

/// Usage line of the stencil executable.
pub const STENCIL_USAGE: &str =
    "Usage: <# iterations> <array dimension> [<tile size> <star/grid> <stencil radius>]";

/// Usage line of the triad executable.
pub const NSTREAM_USAGE: &str = "Usage: <# iterations> <vector length> [<offset>]";

/// Parameters of a stencil run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    iterations: usize,
    n: usize,
    tile_size: usize,
    descriptor: StencilDescriptor,
}

impl RunConfig {
    /// Validate raw parameters.
    ///
    /// A non-positive tile size or one larger than the grid becomes `n`.
    pub fn new(iterations: i64, n: i64, tile_size: i64, pattern: Pattern, radius: i64) -> Result<Self> {
        if iterations < 1 {
            return Err(PrkError::usage("ERROR: iterations must be >= 1"));
        }
        if n < 1 {
            return Err(PrkError::usage("ERROR: grid dimension must be positive"));
        }
        if n as u64 > MAX_DIMENSION as u64 {
            return Err(PrkError::usage(
                "ERROR: grid dimension too large - overflow risk",
            ));
        }
        let n = n as usize;

        let tile_size = if tile_size <= 0 || tile_size as u64 > n as u64 {
            n
        } else {
            tile_size as usize
        };

        if radius < 1 || 2 * radius as i128 + 1 > n as i128 {
            return Err(PrkError::usage(
                "ERROR: Stencil radius negative or too large",
            ));
        }

        Ok(Self {
            iterations: iterations as usize,
            n,
            tile_size,
            descriptor: StencilDescriptor::new(pattern, radius as usize),
        })
    }

    /// Timed iterations. One extra warm-up iteration always runs first.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Linear grid dimension.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Loop blocking factor.
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Requested stencil.
    pub fn descriptor(&self) -> StencilDescriptor {
        self.descriptor
    }

    /// Grid geometry handed to backends.
    pub fn shape(&self) -> GridShape {
        GridShape::new(self.n, self.tile_size)
    }

    /// Points in the active region.
    pub fn active_points(&self) -> usize {
        let side = self.n - 2 * self.descriptor.radius;
        side * side
    }
}

/// Parameters of a triad run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriadConfig {
    iterations: usize,
    length: usize,
    offset: usize,
}

impl TriadConfig {
    /// Validate raw parameters.
    pub fn new(iterations: i64, length: i64, offset: i64) -> Result<Self> {
        if iterations < 1 {
            return Err(PrkError::usage("ERROR: iterations must be >= 1"));
        }
        if length <= 0 {
            return Err(PrkError::usage("ERROR: vector length must be positive"));
        }
        if offset < 0 {
            return Err(PrkError::usage("ERROR: offset must be nonnegative"));
        }
        Ok(Self {
            iterations: iterations as usize,
            length: length as usize,
            offset: offset as usize,
        })
    }

    /// Timed iterations.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Elements per vector.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Padding between vectors. Reported only; buffers are separate allocations.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage_message(err: PrkError) -> String {
        assert!(err.is_usage());
        err.to_string()
    }

    #[test]
    fn test_valid_config() {
        let config = RunConfig::new(10, 100, 16, Pattern::Star, 2).unwrap();
        assert_eq!(config.iterations(), 10);
        assert_eq!(config.n(), 100);
        assert_eq!(config.tile_size(), 16);
        assert_eq!(config.descriptor().radius, 2);
        assert_eq!(config.active_points(), 9216);
    }

    #[test]
    fn test_tile_size_clamping() {
        assert_eq!(RunConfig::new(1, 20, 0, Pattern::Star, 2).unwrap().tile_size(), 20);
        assert_eq!(RunConfig::new(1, 20, -4, Pattern::Star, 2).unwrap().tile_size(), 20);
        assert_eq!(RunConfig::new(1, 20, 32, Pattern::Star, 2).unwrap().tile_size(), 20);
        assert_eq!(RunConfig::new(1, 20, 5, Pattern::Star, 2).unwrap().tile_size(), 5);
    }

    #[test]
    fn test_rejections() {
        let cases = [
            (0, 10, 2, "ERROR: iterations must be >= 1"),
            (1, 0, 2, "ERROR: grid dimension must be positive"),
            (1, 46_341, 2, "ERROR: grid dimension too large - overflow risk"),
            (1, 10, 0, "ERROR: Stencil radius negative or too large"),
            (1, 10, -1, "ERROR: Stencil radius negative or too large"),
            (1, 4, 2, "ERROR: Stencil radius negative or too large"),
        ];
        for (iterations, n, radius, expected) in cases {
            let err = RunConfig::new(iterations, n, 32, Pattern::Star, radius).unwrap_err();
            assert_eq!(usage_message(err), expected);
        }
    }

    #[test]
    fn test_largest_footprint_accepted() {
        let config = RunConfig::new(1, 5, 32, Pattern::Star, 2).unwrap();
        assert_eq!(config.active_points(), 1);
        assert!(RunConfig::new(1, MAX_DIMENSION as i64, 32, Pattern::Star, 2).is_ok());
    }

    #[test]
    fn test_triad_config() {
        let config = TriadConfig::new(10, 1000, 0).unwrap();
        assert_eq!(config.length(), 1000);

        let cases = [
            (0, 10, 0, "ERROR: iterations must be >= 1"),
            (1, 0, 0, "ERROR: vector length must be positive"),
            (1, 10, -1, "ERROR: offset must be nonnegative"),
        ];
        for (iterations, length, offset, expected) in cases {
            let err = TriadConfig::new(iterations, length, offset).unwrap_err();
            assert_eq!(usage_message(err), expected);
        }
    }
}
