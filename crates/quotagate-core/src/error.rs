//! Shared error type across quotagate crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, QuotaGateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum QuotaGateError {
    /// Invalid configuration. Fatal: raised at startup, never at call time.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The quota authority was unreachable or returned a broken response.
    #[error("authority transport failure: {0}")]
    Transport(String),
    /// The quota authority did not answer within the per-call deadline.
    #[error("decision deadline exceeded after {timeout_ms}ms")]
    DeadlineExceeded { timeout_ms: u64 },
    /// The decision client has been shut down; outstanding calls resolve here.
    #[error("decision client is shut down")]
    Shutdown,
    /// Delivery to an outbound destination failed.
    #[error("sink delivery failed: {0}")]
    Sink(String),
}

impl QuotaGateError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QuotaGateError::Config(_) => "config",
            QuotaGateError::Transport(_) => "transport",
            QuotaGateError::DeadlineExceeded { .. } => "deadline",
            QuotaGateError::Shutdown => "shutdown",
            QuotaGateError::Sink(_) => "sink",
        }
    }

    /// Whether this failure means "no decision could be obtained".
    ///
    /// Deadline and transport failures are the recoverable pair: a client
    /// configured fail-open converts them into an allow decision. Shutdown
    /// is also decision-unavailable but is never recovered, so callers see
    /// the cancellation explicitly.
    pub fn is_decision_unavailable(&self) -> bool {
        matches!(
            self,
            QuotaGateError::Transport(_)
                | QuotaGateError::DeadlineExceeded { .. }
                | QuotaGateError::Shutdown
        )
    }
}
