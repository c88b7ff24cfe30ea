use std::io::Write;

use prk_core::{ComputeBackend, Element, Pattern, Result, StencilKernel};

use super::coefficients;
use super::descriptor::StencilDescriptor;
use super::MAX_RADIUS;
use crate::grid::DeviceGrid;

/// A stencil operator resolved from a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum StencilOperator {
    /// A generated star stencil.
    Star(StencilKernel),
    /// No operator exists for this descriptor. Applying it aborts.
    Unimplemented(StencilDescriptor),
}

impl StencilOperator {
    /// Resolve `descriptor` to an operator.
    pub fn lookup(descriptor: StencilDescriptor) -> Self {
        match (descriptor.pattern, descriptor.radius) {
            (Pattern::Star, radius @ 1..=MAX_RADIUS) => match coefficients::star(radius) {
                Ok(kernel) => StencilOperator::Star(kernel),
                Err(_) => StencilOperator::Unimplemented(descriptor),
            },
            _ => StencilOperator::Unimplemented(descriptor),
        }
    }

    /// True if applying this operator terminates the process.
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, StencilOperator::Unimplemented(_))
    }

    /// Coefficients, if the operator exists.
    pub fn kernel(&self) -> Option<&StencilKernel> {
        match self {
            StencilOperator::Star(kernel) => Some(kernel),
            StencilOperator::Unimplemented(_) => None,
        }
    }

    /// Accumulate the operator into the grid's output over the active region.
    pub fn apply<B: ComputeBackend, T: Element>(&self, grid: &mut DeviceGrid<'_, B, T>) -> Result<()> {
        match self {
            StencilOperator::Star(kernel) => grid.apply(kernel),
            StencilOperator::Unimplemented(_) => abort_unimplemented(),
        }
    }
}

fn abort_unimplemented() -> ! {
    println!("You are trying to use a stencil that does not exist.");
    println!("Please generate the new stencil using the code generator");
    println!("and add it to the case-switch in the driver.");
    let _ = std::io::stdout().flush();
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_star() {
        for radius in 1..=5 {
            let op = StencilOperator::lookup(StencilDescriptor::new(Pattern::Star, radius));
            let kernel = op.kernel().unwrap();
            assert_eq!(kernel.radius(), radius);
            assert_eq!(kernel.label(), format!("star{}", radius));
        }
    }

    #[test]
    fn test_lookup_unimplemented() {
        let grid = StencilDescriptor::new(Pattern::Grid, 2);
        assert!(StencilOperator::lookup(grid).is_unimplemented());

        let wide = StencilDescriptor::new(Pattern::Star, 6);
        assert_eq!(
            StencilOperator::lookup(wide),
            StencilOperator::Unimplemented(wide)
        );
    }
}
