//! Stack reconciler: the create-vs-update state machine.
//!
//! Per request: inspect existence, submit the matching operation, wait for a
//! terminal state (the only blocking section, on the worker task), then fetch
//! outputs or surface the provider's failure reason verbatim.
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::ReconcileError;
use crate::inspect::StackInspector;
use crate::provider::{ProviderError, StackProvider};
use restack_model::{StackOutputs, StackRequest, StackState, StackStatus};

/// Reconciler settings.
#[derive(Debug, Clone, Default)]
pub struct ReconcileConfig {
    /// Deadline for the terminal-state wait.
    ///
    /// `None` waits unbounded, matching the historical behavior; a `Some`
    /// deadline surfaces [`ReconcileError::Timeout`] when exceeded.
    pub wait_timeout: Option<Duration>,
}

/// Decides create vs. update for a named stack and drives the operation to a
/// terminal state.
///
/// Holds the shared provider handle. Concurrent reconciliations of different
/// stacks are independent; two reconciliations racing on the *same* name are
/// not coordinated here and rely on the provider's own concurrent-modification
/// rejection.
pub struct StackReconciler {
    provider: Arc<dyn StackProvider>,
    config: ReconcileConfig,
}

impl StackReconciler {
    /// Create a reconciler with default configuration (unbounded wait).
    pub fn new(provider: Arc<dyn StackProvider>) -> Self {
        Self {
            provider,
            config: ReconcileConfig::default(),
        }
    }

    /// Replace the configuration and return the updated reconciler.
    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one reconciliation to its terminal result.
    ///
    /// Steps:
    /// 1. Check whether the stack exists.
    /// 2. Absent: submit a create with the override parameters only
    ///    (keep entries are never sent on creation).
    ///    Present: submit an update with overrides plus keep entries.
    /// 3. Wait until the stack reaches `Complete` or `Failed`, honoring the
    ///    cancellation token and the configured deadline.
    /// 4. On `Complete`, fetch and return the full output mapping; on
    ///    `Failed`, surface the provider's reason.
    #[instrument(level = "debug", skip(self, request, cancel), fields(stack = %request.name))]
    pub async fn reconcile(
        &self,
        request: &StackRequest,
        cancel: CancellationToken,
    ) -> Result<StackOutputs, ReconcileError> {
        let name = request.name.as_str();
        let inspector = StackInspector::new(Arc::clone(&self.provider));
        let exists = inspector.exists(name).await?;

        if exists {
            info!("updating stack");
            let parameters = request.parameters.for_update();
            self.provider
                .update_stack(name, &request.template_body, &parameters)
                .await
                .map_err(|e| classify_submit(name, e))?;
        } else {
            info!("creating stack");
            self.provider
                .create_stack(name, &request.template_body, request.parameters.for_create())
                .await
                .map_err(|e| classify_submit(name, e))?;
        }

        let status = self.wait_terminal(name, &cancel).await?;
        match status.state {
            StackState::Complete => {
                debug!("stack reached complete state; fetching outputs");
                let outputs = self.provider.get_outputs(name).await?;
                info!(outputs = outputs.len(), "stack reconciliation complete");
                Ok(outputs)
            }
            StackState::Failed => Err(ReconcileError::Operation {
                stack: name.to_string(),
                reason: status
                    .reason
                    .unwrap_or_else(|| "stack entered a failed state".to_string()),
            }),
            other => Err(ReconcileError::Unexpected(format!(
                "provider reported non-terminal state {other:?} from wait"
            ))),
        }
    }

    async fn wait_terminal(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<StackStatus, ReconcileError> {
        let wait = self.provider.wait_until_terminal(name);

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("cancellation requested; abandoning wait");
                Err(ReconcileError::Canceled {
                    stack: name.to_string(),
                })
            }
            res = async {
                match self.config.wait_timeout {
                    Some(timeout) => match tokio::time::timeout(timeout, wait).await {
                        Ok(res) => res.map_err(ReconcileError::from),
                        Err(_) => Err(ReconcileError::Timeout {
                            stack: name.to_string(),
                            timeout,
                        }),
                    },
                    None => wait.await.map_err(ReconcileError::from),
                }
            } => res,
        }
    }
}

/// Map a submit-time provider error: a synchronous rejection (e.g. "No
/// updates are to be performed.") is an operation failure carrying the
/// provider's reason; everything else is a communication failure.
fn classify_submit(stack: &str, err: ProviderError) -> ReconcileError {
    match err {
        ProviderError::Rejected(reason) => ReconcileError::Operation {
            stack: stack.to_string(),
            reason,
        },
        other => ReconcileError::Provider(other),
    }
}

#[cfg(test)]
mod tests {
    use super::{ReconcileConfig, StackReconciler};
    use crate::error::ReconcileError;
    use crate::provider::{ProviderError, StackProvider};

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use restack_model::{
        ParameterSet, StackOutputs, StackParameter, StackRequest, StackStatus,
    };

    /// Calls observed by the spy provider, with the exact parameter vectors.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Describe(String),
        Create(String, Vec<StackParameter>),
        Update(String, Vec<StackParameter>),
        Wait(String),
        Outputs(String),
    }

    /// Scriptable spy provider for reconciler unit tests.
    struct Spy {
        exists: bool,
        reject_update: Option<String>,
        terminal: StackStatus,
        outputs: StackOutputs,
        hang_wait: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl Spy {
        fn new(exists: bool) -> Self {
            Self {
                exists,
                reject_update: None,
                terminal: StackStatus::complete(),
                outputs: StackOutputs::new(),
                hang_wait: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl StackProvider for Spy {
        async fn describe_stack(&self, name: &str) -> Result<StackStatus, ProviderError> {
            self.record(Call::Describe(name.to_string()));
            if self.exists {
                Ok(StackStatus::complete())
            } else {
                Err(ProviderError::NotFound(name.to_string()))
            }
        }

        async fn create_stack(
            &self,
            name: &str,
            _template_body: &str,
            parameters: &[StackParameter],
        ) -> Result<(), ProviderError> {
            self.record(Call::Create(name.to_string(), parameters.to_vec()));
            Ok(())
        }

        async fn update_stack(
            &self,
            name: &str,
            _template_body: &str,
            parameters: &[StackParameter],
        ) -> Result<(), ProviderError> {
            self.record(Call::Update(name.to_string(), parameters.to_vec()));
            match &self.reject_update {
                Some(reason) => Err(ProviderError::Rejected(reason.clone())),
                None => Ok(()),
            }
        }

        async fn wait_until_terminal(&self, name: &str) -> Result<StackStatus, ProviderError> {
            self.record(Call::Wait(name.to_string()));
            if self.hang_wait {
                std::future::pending::<()>().await;
            }
            Ok(self.terminal.clone())
        }

        async fn get_outputs(&self, name: &str) -> Result<StackOutputs, ProviderError> {
            self.record(Call::Outputs(name.to_string()));
            Ok(self.outputs.clone())
        }
    }

    fn request(overrides: &[&str], keep: &[&str]) -> StackRequest {
        StackRequest::new(
            "foo",
            "{}",
            ParameterSet::from_raw(overrides, keep).unwrap(),
        )
    }

    #[tokio::test]
    async fn absent_stack_is_created_with_overrides_only() {
        let spy = Arc::new(Spy::new(false));
        let reconciler = StackReconciler::new(Arc::clone(&spy) as Arc<dyn StackProvider>);

        let outputs = reconciler
            .reconcile(&request(&["a=1"], &["b"]), CancellationToken::new())
            .await
            .unwrap();
        assert!(outputs.is_empty());

        let calls = spy.calls();
        assert!(
            calls.contains(&Call::Create(
                "foo".into(),
                vec![StackParameter::new("a", "1")]
            )),
            "create not observed with override-only parameters: {calls:?}"
        );
        assert!(
            !calls.iter().any(|c| matches!(c, Call::Update(..))),
            "update must never be reached for an absent stack"
        );
    }

    #[tokio::test]
    async fn existing_stack_is_updated_with_overrides_and_keep() {
        let spy = Arc::new(Spy::new(true));
        let reconciler = StackReconciler::new(Arc::clone(&spy) as Arc<dyn StackProvider>);

        reconciler
            .reconcile(&request(&["a=1"], &["b"]), CancellationToken::new())
            .await
            .unwrap();

        let calls = spy.calls();
        assert!(
            calls.contains(&Call::Update(
                "foo".into(),
                vec![StackParameter::new("a", "1"), StackParameter::previous("b")]
            )),
            "update not observed with merged parameters: {calls:?}"
        );
        assert!(!calls.iter().any(|c| matches!(c, Call::Create(..))));
    }

    #[tokio::test]
    async fn update_rejection_surfaces_provider_reason_verbatim() {
        let mut spy = Spy::new(true);
        spy.reject_update = Some("No updates are to be performed.".into());
        let reconciler = StackReconciler::new(Arc::new(spy));

        let err = reconciler
            .reconcile(&request(&[], &[]), CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ReconcileError::Operation { stack, reason } => {
                assert_eq!(stack, "foo");
                assert_eq!(reason, "No updates are to be performed.");
            }
            other => panic!("expected Operation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_terminal_state_surfaces_reason() {
        let mut spy = Spy::new(false);
        spy.terminal = StackStatus::failed("rollback complete");
        let spy = Arc::new(spy);
        let reconciler = StackReconciler::new(Arc::clone(&spy) as Arc<dyn StackProvider>);

        let err = reconciler
            .reconcile(&request(&[], &[]), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::Operation { reason, .. } if reason == "rollback complete"
        ));
        // outputs are only fetched on success
        assert!(!spy.calls().iter().any(|c| matches!(c, Call::Outputs(_))));
    }

    #[tokio::test]
    async fn success_returns_stack_outputs() {
        let mut spy = Spy::new(false);
        spy.outputs = [("Url", "https://x")].into_iter().collect();
        let reconciler = StackReconciler::new(Arc::new(spy));

        let outputs = reconciler
            .reconcile(&request(&[], &[]), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outputs.get("Url"), Some("https://x"));
    }

    #[tokio::test]
    async fn wait_deadline_surfaces_timeout() {
        let mut spy = Spy::new(false);
        spy.hang_wait = true;
        let reconciler = StackReconciler::new(Arc::new(spy)).with_config(ReconcileConfig {
            wait_timeout: Some(Duration::from_millis(20)),
        });

        let err = reconciler
            .reconcile(&request(&[], &[]), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Timeout { stack, .. } if stack == "foo"));
    }

    #[tokio::test]
    async fn cancellation_aborts_the_wait() {
        let mut spy = Spy::new(false);
        spy.hang_wait = true;
        let reconciler = StackReconciler::new(Arc::new(spy));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = reconciler
            .reconcile(&request(&[], &[]), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Canceled { stack } if stack == "foo"));
    }
}
