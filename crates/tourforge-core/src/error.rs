//! Error types for TourForge

use thiserror::Error;

/// Main error type for TourForge operations.
///
/// Only [`TourForgeError::Config`], [`TourForgeError::InvalidData`] and
/// [`TourForgeError::Io`] are ever returned to callers. The remaining variants
/// describe conditions the orchestrator recovers from at a phase boundary;
/// they are carried in run reports and log lines.
#[derive(Debug, Error)]
pub enum TourForgeError {
    /// Invalid run parameters, rejected before any worker is spawned
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input data (e.g. an unreadable point file row)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A phase reached its deadline before every worker finished
    #[error("Phase {phase} timed out")]
    PhaseTimeout { phase: u8 },

    /// The run was aborted by an external request
    #[error("Run was cancelled")]
    Cancelled,

    /// A spawned unit of work terminated abnormally
    #[error("Worker failure: {0}")]
    WorkerFailure(String),
}

impl TourForgeError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn worker_failure(message: impl Into<String>) -> Self {
        Self::WorkerFailure(message.into())
    }

    /// Returns true for conditions the orchestrator handles itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PhaseTimeout { .. } | Self::WorkerFailure(_))
    }
}

/// Result type alias for TourForge operations
pub type Result<T> = std::result::Result<T, TourForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            TourForgeError::config("no points").to_string(),
            "Configuration error: no points"
        );
        assert_eq!(
            TourForgeError::PhaseTimeout { phase: 2 }.to_string(),
            "Phase 2 timed out"
        );
        assert_eq!(TourForgeError::Cancelled.to_string(), "Run was cancelled");
    }

    #[test]
    fn recoverable_classification() {
        assert!(TourForgeError::PhaseTimeout { phase: 1 }.is_recoverable());
        assert!(TourForgeError::worker_failure("panic").is_recoverable());
        assert!(!TourForgeError::Cancelled.is_recoverable());
        assert!(!TourForgeError::config("bad").is_recoverable());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TourForgeError = io.into();
        assert!(matches!(err, TourForgeError::Io(_)));
    }
}
