//! Error types for the benchmark backends.

use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, PrkError>;

/// Errors raised while configuring or executing a benchmark run.
#[derive(Error, Debug)]
pub enum PrkError {
    /// Invalid command-line parameter. Displays as the bare diagnostic line.
    #[error("{0}")]
    Usage(String),

    /// The requested backend does not exist or cannot be reached.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Generic runtime failure inside a backend.
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Kernel source could not be compiled for the device.
    #[error("Kernel compilation failed: {0}")]
    CompilationFailed(String),

    /// Kernel submission or execution failed.
    #[error("Kernel launch failed: {0}")]
    LaunchFailed(String),

    /// Host/device data movement failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// A buffer does not hold the number of elements the operation expects.
    #[error("Buffer size mismatch: expected {expected} elements, found {actual}")]
    BufferSizeMismatch {
        /// Elements expected by the operation.
        expected: usize,
        /// Elements actually held by the buffer.
        actual: usize,
    },

    /// The backend has no implementation for the requested kernel.
    #[error("Unsupported kernel: {0}")]
    UnsupportedKernel(String),
}

impl PrkError {
    /// Shorthand for a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        PrkError::Usage(msg.into())
    }

    /// Returns true for command-line validation failures.
    pub fn is_usage(&self) -> bool {
        matches!(self, PrkError::Usage(_))
    }
}

/// Check that a buffer holds exactly `expected` elements.
pub fn ensure_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(PrkError::BufferSizeMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_displays_bare_message() {
        let err = PrkError::usage("ERROR: iterations must be >= 1");
        assert_eq!(err.to_string(), "ERROR: iterations must be >= 1");
        assert!(err.is_usage());
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len(16, 16).is_ok());
        match ensure_len(16, 9) {
            Err(PrkError::BufferSizeMismatch { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 9);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
