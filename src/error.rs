//! Error types for the strict boundary layer.
//!
//! The integrator itself never fails; these errors come from validation,
//! id lookups and configuration loading.

use std::fmt;

#[derive(Debug)]
pub enum SimError {
    /// A tunable or body field is outside its admissible range.
    InvalidParameter { name: &'static str, value: f64 },
    /// A body's position or velocity stopped being finite after a step.
    NumericalInstability { id: String, elapsed: f64 },
    /// No live body carries this id.
    UnknownBody(String),
    /// A body with this id is already live.
    DuplicateId(String),
    /// Failed to parse a parameter or scenario file.
    Config(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
            SimError::NumericalInstability { id, elapsed } => write!(
                f,
                "Body '{}' left the finite range at t = {} days",
                id, elapsed
            ),
            SimError::UnknownBody(id) => write!(f, "No body with id '{}'", id),
            SimError::DuplicateId(id) => write!(f, "A body with id '{}' already exists", id),
            SimError::Config(e) => write!(f, "Failed to parse configuration: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Config(e)
    }
}
