//! Error types for gemmly operations.
//!
//! Allocation failure is reported as a value instead of aborting through the
//! global allocation error handler, so the drivers can print a diagnostic and
//! exit cleanly.

use thiserror::Error;

/// Errors that can occur while allocating operands or running a kernel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GemmError {
    /// A configuration value is out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable error message.
        message: String,
    },
    /// Memory allocation failed.
    #[error(
        "Memory allocation failed: {message} (requested {requested_size} bytes with {requested_alignment} byte alignment)"
    )]
    AllocationError {
        /// The size that was requested to be allocated.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Invalid layout parameters were provided.
    #[error("Invalid memory layout: {message} (size: {size}, alignment: {alignment})")]
    LayoutError {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Operand validation error.
    #[error("Validation error: {message}")]
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// The worker pool could not be created.
    #[error("Thread pool error: {message}")]
    ThreadPoolError {
        /// Human-readable error message.
        message: String,
    },
    /// A benchmark report could not be written.
    #[error("Output error: {message}")]
    OutputError {
        /// Human-readable error message.
        message: String,
    },
}

impl From<std::io::Error> for GemmError {
    fn from(err: std::io::Error) -> Self {
        GemmError::OutputError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for gemmly operations.
pub type Result<T> = std::result::Result<T, GemmError>;

/// Creates an invalid argument error.
pub fn invalid_argument(message: impl Into<String>) -> GemmError {
    GemmError::InvalidArgument {
        message: message.into(),
    }
}

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> GemmError {
    GemmError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> GemmError {
    GemmError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> GemmError {
    GemmError::ValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_error_display() {
        let error = allocation_error(1024, 32, "out of memory");
        let display = format!("{}", error);
        assert!(display.contains("Memory allocation failed"));
        assert!(display.contains("1024 bytes"));
        assert!(display.contains("32 byte alignment"));
        assert!(display.contains("out of memory"));
    }

    #[test]
    fn test_layout_error_display() {
        let error = layout_error(usize::MAX, 32, "size exceeds isize::MAX");
        let display = format!("{}", error);
        assert!(display.contains("Invalid memory layout"));
        assert!(display.contains("alignment: 32"));
        assert!(display.contains("size exceeds isize::MAX"));
    }

    #[test]
    fn test_validation_and_argument_display() {
        let error = validation_error("A is 3x3 but C is 4x4");
        assert_eq!(error.to_string(), "Validation error: A is 3x3 but C is 4x4");

        let error = invalid_argument("worker count must be at least 1");
        assert_eq!(
            error.to_string(),
            "Invalid argument: worker count must be at least 1"
        );
    }

    #[test]
    fn test_io_error_becomes_output_error() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error = GemmError::from(io);
        assert_eq!(error.to_string(), "Output error: pipe closed");
    }

    #[test]
    fn test_error_equality() {
        let error1 = allocation_error(1024, 32, "test");
        let error2 = allocation_error(1024, 32, "test");
        let error3 = allocation_error(2048, 32, "test");

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = allocation_error(1024, 32, "test error");

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
