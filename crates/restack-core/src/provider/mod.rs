//! Provider seam: the asynchronous operations any cloud SDK must satisfy.
//!
//! Concrete backends implement [`StackProvider`] and are passed around as
//! `Arc<dyn StackProvider>`, constructed once and shared by reference across
//! in-flight reconciliations. Implementations must be safe for concurrent
//! use (stateless request/response clients are).
use async_trait::async_trait;
use thiserror::Error;

use restack_model::{StackOutputs, StackParameter, StackStatus};

/// Errors returned by a provider backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No stack with the given name exists.
    ///
    /// The inspector normalizes this to an absent state; it is not a
    /// failure on the inspection path.
    #[error("stack not found: {0}")]
    NotFound(String),

    /// Communication with the cloud API failed (network, auth, throttling).
    #[error("provider communication error: {0}")]
    Communication(String),

    /// The provider rejected the request synchronously, e.g. "No updates
    /// are to be performed." or a use-previous parameter on a create call.
    #[error("provider rejected request: {0}")]
    Rejected(String),
}

/// Asynchronous stack operations consumed by the reconciler.
///
/// `wait_until_terminal` is the only long-running call: it must not return
/// until the stack reaches a terminal state. It blocks the worker task,
/// never the submitting caller.
#[async_trait]
pub trait StackProvider: Send + Sync {
    /// Live status of the named stack.
    ///
    /// Returns [`ProviderError::NotFound`] if the stack does not exist;
    /// callers that prefer an absent status use the inspector.
    async fn describe_stack(&self, name: &str) -> Result<StackStatus, ProviderError>;

    /// Whether a stack with this name currently exists.
    async fn stack_exists(&self, name: &str) -> Result<bool, ProviderError> {
        match self.describe_stack(name).await {
            Ok(_) => Ok(true),
            Err(ProviderError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Submit a create operation. Parameters must all carry explicit values.
    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> Result<(), ProviderError>;

    /// Submit an update operation. Parameters may mix explicit values and
    /// use-previous entries.
    async fn update_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> Result<(), ProviderError>;

    /// Block until the stack reaches `Complete` or `Failed` and return that
    /// terminal status, including the provider's reason text on failure.
    async fn wait_until_terminal(&self, name: &str) -> Result<StackStatus, ProviderError>;

    /// Fetch the output mapping of the stack.
    async fn get_outputs(&self, name: &str) -> Result<StackOutputs, ProviderError>;
}
