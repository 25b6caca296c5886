use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::trace;

use restack_core::provider::{ProviderError, StackProvider};
use restack_model::{StackOutputs, StackParameter, StackState, StackStatus};

/// One observed provider call, with the exact arguments that crossed the
/// seam. Create/update carry the full parameter vectors so tests can assert
/// what was (and was not) sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(String),
    Create {
        stack: String,
        parameters: Vec<StackParameter>,
    },
    Update {
        stack: String,
        parameters: Vec<StackParameter>,
    },
    Wait(String),
    Outputs(String),
}

/// Simulated stack record.
#[derive(Debug, Clone)]
struct Record {
    status: StackStatus,
    outputs: StackOutputs,
}

#[derive(Default)]
struct Inner {
    stacks: HashMap<String, Record>,
    /// Outputs installed on a stack once its next apply completes.
    staged_outputs: HashMap<String, StackOutputs>,
    /// Scripted terminal failure per stack: the wait ends in Failed with
    /// this reason instead of Complete.
    fail_in_flight: HashMap<String, String>,
    reject_create: Option<String>,
    reject_update: Option<String>,
    hang_in_flight: bool,
    calls: Vec<Call>,
}

/// Thread-safe in-memory provider.
///
/// Behaves like a minimal cloud: creates insert a record in
/// `CreateInProgress`, updates flip an existing record to
/// `UpdateInProgress`, and the wait drives the in-flight operation to its
/// terminal state. A use-previous parameter on a create call is rejected,
/// as the real cloud rejects it.
#[derive(Default)]
pub struct MemoryProvider {
    inner: Mutex<Inner>,
}

impl MemoryProvider {
    /// Create an empty simulated cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-provision a stack in `Complete` state with stored outputs.
    pub fn with_existing(self, name: impl Into<String>, outputs: StackOutputs) -> Self {
        self.inner.lock().unwrap().stacks.insert(
            name.into(),
            Record {
                status: StackStatus::complete(),
                outputs,
            },
        );
        self
    }

    /// Stage outputs to be installed once the next apply of `name` completes.
    pub fn outputs_after_apply(self, name: impl Into<String>, outputs: StackOutputs) -> Self {
        self.inner
            .lock()
            .unwrap()
            .staged_outputs
            .insert(name.into(), outputs);
        self
    }

    /// Script a synchronous rejection for every create call.
    pub fn reject_create(self, reason: impl Into<String>) -> Self {
        self.inner.lock().unwrap().reject_create = Some(reason.into());
        self
    }

    /// Script a synchronous rejection for every update call.
    pub fn reject_update(self, reason: impl Into<String>) -> Self {
        self.inner.lock().unwrap().reject_update = Some(reason.into());
        self
    }

    /// Script the next apply of `name` to end in a failed terminal state.
    pub fn fail_in_flight(self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .fail_in_flight
            .insert(name.into(), reason.into());
        self
    }

    /// Make every wait hang forever. For timeout and cancellation tests.
    pub fn hang_in_flight(self) -> Self {
        self.inner.lock().unwrap().hang_in_flight = true;
        self
    }

    /// Snapshot of every call observed so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Total number of calls observed.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    fn record_call(inner: &mut Inner, call: Call) {
        trace!(?call, "memory provider call");
        inner.calls.push(call);
    }
}

#[async_trait]
impl StackProvider for MemoryProvider {
    async fn describe_stack(&self, name: &str) -> Result<StackStatus, ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, Call::Describe(name.to_string()));
        match inner.stacks.get(name) {
            Some(record) => Ok(record.status.clone()),
            None => Err(ProviderError::NotFound(name.to_string())),
        }
    }

    async fn create_stack(
        &self,
        name: &str,
        _template_body: &str,
        parameters: &[StackParameter],
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(
            &mut inner,
            Call::Create {
                stack: name.to_string(),
                parameters: parameters.to_vec(),
            },
        );

        if let Some(reason) = &inner.reject_create {
            return Err(ProviderError::Rejected(reason.clone()));
        }
        if let Some(p) = parameters.iter().find(|p| p.uses_previous()) {
            return Err(ProviderError::Rejected(format!(
                "parameter '{}' requests a previous value, but stack '{name}' has none",
                p.key()
            )));
        }
        if inner.stacks.contains_key(name) {
            return Err(ProviderError::Rejected(format!(
                "stack '{name}' already exists"
            )));
        }

        inner.stacks.insert(
            name.to_string(),
            Record {
                status: StackStatus::new(StackState::CreateInProgress),
                outputs: StackOutputs::new(),
            },
        );
        Ok(())
    }

    async fn update_stack(
        &self,
        name: &str,
        _template_body: &str,
        parameters: &[StackParameter],
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(
            &mut inner,
            Call::Update {
                stack: name.to_string(),
                parameters: parameters.to_vec(),
            },
        );

        if let Some(reason) = &inner.reject_update {
            return Err(ProviderError::Rejected(reason.clone()));
        }
        match inner.stacks.get_mut(name) {
            Some(record) => {
                record.status = StackStatus::new(StackState::UpdateInProgress);
                Ok(())
            }
            None => Err(ProviderError::NotFound(name.to_string())),
        }
    }

    async fn wait_until_terminal(&self, name: &str) -> Result<StackStatus, ProviderError> {
        let hang = {
            let mut inner = self.inner.lock().unwrap();
            Self::record_call(&mut inner, Call::Wait(name.to_string()));
            inner.hang_in_flight
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let mut inner = self.inner.lock().unwrap();
        let failure = inner.fail_in_flight.remove(name);
        let staged = inner.staged_outputs.remove(name);
        let record = inner
            .stacks
            .get_mut(name)
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))?;

        record.status = match failure {
            Some(reason) => StackStatus::failed(reason),
            None => {
                if let Some(outputs) = staged {
                    record.outputs = outputs;
                }
                StackStatus::complete()
            }
        };
        Ok(record.status.clone())
    }

    async fn get_outputs(&self, name: &str) -> Result<StackOutputs, ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        Self::record_call(&mut inner, Call::Outputs(name.to_string()));
        match inner.stacks.get(name) {
            Some(record) => Ok(record.outputs.clone()),
            None => Err(ProviderError::NotFound(name.to_string())),
        }
    }
}
