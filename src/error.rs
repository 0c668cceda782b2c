use std::io;
use thiserror::Error;

/// Errors produced while building, running or analyzing a decay simulation
#[derive(Debug, Error)]
pub enum BaryogenesisError {
    /// A construction input is outside its allowed domain
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// No matter or antimatter outcome was observed
    #[error("Degenerate sample: no valid decay outcomes among {total_shots} shots ({violating_shots} violating)")]
    DegenerateSample { total_shots: u64, violating_shots: u64 },

    /// Sampled configurations broke a conservation rule
    #[error("Conservation violated by {configurations} configuration(s) over {shots} shot(s)")]
    ConservationViolation { configurations: usize, shots: u64 },

    /// A register bitstring could not be parsed
    #[error("Invalid register configuration: {0}")]
    InvalidConfiguration(String),

    /// A gate touches a qubit outside the register, or the same qubit twice
    #[error("Gate {gate} references invalid qubit {qubit}")]
    QubitOutOfRange { gate: String, qubit: usize },

    /// An executor returned a different number of shots than requested
    #[error("Executor {executor} returned {actual} shots, {expected} requested")]
    ShotCountMismatch { executor: String, expected: u64, actual: u64 },

    /// The executor cannot run this gate
    #[error("Unsupported gate for this executor: {0}")]
    UnsupportedGate(String),

    /// Configuration loading failed
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BaryogenesisError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        BaryogenesisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for BaryogenesisError {
    fn from(err: serde_json::Error) -> Self {
        BaryogenesisError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BaryogenesisError>;
