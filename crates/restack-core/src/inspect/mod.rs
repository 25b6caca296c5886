//! Stack inspector: existence and status queries with "not found" normalized
//! to an absent state instead of an error.
use std::sync::Arc;

use tracing::trace;

use crate::provider::{ProviderError, StackProvider};
use restack_model::StackStatus;

/// Thin wrapper over the shared provider handle.
///
/// The inspector never retries; throttling, auth and other communication
/// errors propagate untouched so the caller can classify them.
pub struct StackInspector {
    provider: Arc<dyn StackProvider>,
}

impl StackInspector {
    /// Create an inspector over the given provider.
    pub fn new(provider: Arc<dyn StackProvider>) -> Self {
        Self { provider }
    }

    /// Whether a stack with this name currently exists.
    ///
    /// A "not found" response from the provider means `false`, not an error.
    pub async fn exists(&self, name: &str) -> Result<bool, ProviderError> {
        let exists = self.provider.stack_exists(name).await?;
        trace!(stack = name, exists, "stack existence checked");
        Ok(exists)
    }

    /// Live status of the named stack, with "not found" mapped to
    /// [`StackStatus::absent`].
    pub async fn describe(&self, name: &str) -> Result<StackStatus, ProviderError> {
        match self.provider.describe_stack(name).await {
            Ok(status) => Ok(status),
            Err(ProviderError::NotFound(_)) => Ok(StackStatus::absent()),
            Err(e) => Err(e),
        }
    }
}
