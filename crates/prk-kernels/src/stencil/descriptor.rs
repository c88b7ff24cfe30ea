use std::fmt;

use prk_core::Pattern;

/// A requested stencil: footprint pattern and radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilDescriptor {
    /// Footprint shape.
    pub pattern: Pattern,
    /// Maximum offset from the center.
    pub radius: usize,
}

impl StencilDescriptor {
    /// Create a descriptor.
    pub fn new(pattern: Pattern, radius: usize) -> Self {
        Self { pattern, radius }
    }

    /// Points in the footprint.
    pub fn stencil_size(&self) -> usize {
        self.pattern.stencil_size(self.radius)
    }
}

impl fmt::Display for StencilDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pattern, self.radius)
    }
}

/// Command-line pattern text. Exactly `grid` selects the grid pattern; anything else is a star.
pub fn parse_pattern(text: &str) -> Pattern {
    if text == "grid" {
        Pattern::Grid
    } else {
        Pattern::Star
    }
}
