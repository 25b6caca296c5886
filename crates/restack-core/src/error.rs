use std::time::Duration;

use thiserror::Error;

use crate::provider::ProviderError;
use restack_model::ModelError;

/// Errors surfaced by resolution, inspection or reconciliation.
///
/// Every error reaching the dispatcher boundary becomes exactly one Failure
/// delivery; nothing is swallowed and nothing is double-reported.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Input validation failed; no provider call was made.
    #[error("malformed parameter: {0}")]
    Parameter(#[from] ModelError),

    /// Talking to the provider failed (network, auth, throttling).
    ///
    /// Not retried internally; retry policy is a caller decision layered
    /// above this library.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The cloud-side operation transitioned to a failed terminal state or
    /// was rejected outright. The reason text is the provider's, verbatim.
    #[error("stack operation failed for '{stack}': {reason}")]
    Operation { stack: String, reason: String },

    /// The wait for a terminal state exceeded the configured deadline.
    #[error("timed out after {timeout:?} waiting for stack '{stack}'")]
    Timeout { stack: String, timeout: Duration },

    /// The caller canceled the reconciliation while it was waiting.
    #[error("reconciliation of stack '{stack}' was canceled")]
    Canceled { stack: String },

    /// Catch-all for anything else raised inside the worker.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}
