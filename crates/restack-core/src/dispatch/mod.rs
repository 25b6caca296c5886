//! Async execution wrapper: one worker task per reconciliation request,
//! exactly-once result delivery.
//!
//! `submit` returns immediately; resolution, inspection and reconciliation
//! all run inside the spawned worker so any error — including malformed
//! input and panics — comes back through the handle as a single Failure.
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::ReconcileError;
use crate::provider::StackProvider;
use crate::reconcile::{ReconcileConfig, StackReconciler};
use crate::resolve;
use restack_model::{StackOutputs, StackSpec};

/// Submits stack reconciliations onto background workers.
///
/// Cheap to clone-by-Arc internally; one dispatcher serves any number of
/// concurrent requests. Requests for different stacks are fully independent;
/// requests for the same stack are intentionally not serialized here (the
/// provider's concurrent-modification rejection is the only guard).
pub struct Dispatcher {
    reconciler: Arc<StackReconciler>,
}

impl Dispatcher {
    /// Create a dispatcher with default reconciler configuration.
    pub fn new(provider: Arc<dyn StackProvider>) -> Self {
        Self {
            reconciler: Arc::new(StackReconciler::new(provider)),
        }
    }

    /// Create a dispatcher with explicit reconciler configuration.
    pub fn with_config(provider: Arc<dyn StackProvider>, config: ReconcileConfig) -> Self {
        Self {
            reconciler: Arc::new(StackReconciler::new(provider).with_config(config)),
        }
    }

    /// Submit one reconciliation and return immediately.
    ///
    /// The returned handle carries exactly one result: await it with
    /// [`ReconcileHandle::wait`]. The worker is torn down after delivery.
    pub fn submit(&self, spec: StackSpec) -> ReconcileHandle {
        let stack = spec.stack.clone();
        info!(stack = %stack, "submitting stack reconciliation");

        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let reconciler = Arc::clone(&self.reconciler);

        tokio::spawn(async move {
            let result = run(reconciler, &spec, worker_cancel).await;
            match &result {
                Ok(outputs) => debug!(
                    stack = %spec.stack,
                    outputs = outputs.len(),
                    "reconciliation finished",
                ),
                Err(e) => debug!(stack = %spec.stack, error = %e, "reconciliation failed"),
            }
            // The receiver may have been dropped; delivery is best-effort
            // but never repeated.
            let _ = tx.send(result);
        });

        ReconcileHandle { stack, rx, cancel }
    }
}

/// Resolve the raw spec, then reconcile. Runs entirely on the worker.
async fn run(
    reconciler: Arc<StackReconciler>,
    spec: &StackSpec,
    cancel: CancellationToken,
) -> Result<StackOutputs, ReconcileError> {
    let request = resolve::resolve(spec)?;
    reconciler.reconcile(&request, cancel).await
}

/// Handle to one in-flight reconciliation.
///
/// Consuming [`wait`](Self::wait) is the only way to observe the result, so
/// delivery is exactly-once by construction.
pub struct ReconcileHandle {
    stack: String,
    rx: oneshot::Receiver<Result<StackOutputs, ReconcileError>>,
    cancel: CancellationToken,
}

impl ReconcileHandle {
    /// Name of the stack this handle tracks.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Request cancellation of the in-flight wait.
    ///
    /// The worker delivers [`ReconcileError::Canceled`] through the handle;
    /// an operation already submitted to the provider keeps running on the
    /// cloud side.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Await the single result of this reconciliation.
    ///
    /// If the worker died without delivering (a panic anywhere inside
    /// resolution or reconciliation), this yields
    /// [`ReconcileError::Unexpected`] rather than hanging or crashing the
    /// awaiting task.
    pub async fn wait(self) -> Result<StackOutputs, ReconcileError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(ReconcileError::Unexpected(format!(
                "worker for stack '{}' exited without delivering a result",
                self.stack
            ))),
        }
    }
}
