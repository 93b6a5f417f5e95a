//! Validation error types

use std::fmt;

/// Validation error for client input
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Value doesn't match the required format (e.g., UUID)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Request body could not be decoded
    MalformedBody { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::MalformedBody { reason } => write!(f, "malformed request body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::InvalidFormat {
            field: "id",
            reason: "invalid UUID format",
        };
        assert_eq!(err.to_string(), "id: invalid UUID format");

        let err = ValidationError::Empty { field: "message" };
        assert_eq!(err.to_string(), "message cannot be empty");
    }
}
