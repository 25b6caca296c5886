use serde::{Deserialize, Serialize};

/// Declarative input for one stack reconciliation.
///
/// `StackSpec` is the raw, caller-facing form: parameter overrides are still
/// `key=value` strings and keep entries plain keys. Resolution into a
/// validated [`StackRequest`](crate::StackRequest) happens inside the worker,
/// so malformed input surfaces through the same failure channel as every
/// other error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSpec {
    /// Name of the stack to create or update.
    pub stack: String,
    /// Template body describing the desired resources.
    ///
    /// Already read from wherever it is stored; this library never touches
    /// the filesystem.
    pub template_body: String,
    /// Raw `key=value` parameter overrides.
    ///
    /// Values may contain `=`; splitting happens at the first occurrence
    /// only. An entry without `=` fails resolution.
    #[serde(default)]
    pub parameter_overrides: Vec<String>,
    /// Keys whose previously stored value should be kept on update.
    ///
    /// Ignored on the creation path: a stack that does not exist yet has no
    /// previous values to keep.
    #[serde(default)]
    pub keep_parameters: Vec<String>,
}

impl StackSpec {
    /// Create a spec with no parameters.
    pub fn new<N, T>(stack: N, template_body: T) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            stack: stack.into(),
            template_body: template_body.into(),
            parameter_overrides: Vec::new(),
            keep_parameters: Vec::new(),
        }
    }

    /// Builder-style helper adding one `key=value` override.
    pub fn with_override(mut self, raw: impl Into<String>) -> Self {
        self.parameter_overrides.push(raw.into());
        self
    }

    /// Builder-style helper adding one keep key.
    pub fn with_keep(mut self, key: impl Into<String>) -> Self {
        self.keep_parameters.push(key.into());
        self
    }
}
