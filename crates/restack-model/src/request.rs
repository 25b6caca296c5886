use serde::{Deserialize, Serialize};

use crate::params::ParameterSet;

/// Resolved, immutable stack request.
///
/// Built from a [`StackSpec`](crate::StackSpec) once parameter resolution has
/// succeeded, consumed exactly once by the reconciler and discarded after the
/// terminal result is delivered. Requests are never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackRequest {
    /// Name of the stack to create or update.
    pub name: String,
    /// Template body describing the desired resources.
    pub template_body: String,
    /// Validated parameter set.
    pub parameters: ParameterSet,
}

impl StackRequest {
    /// Create a request from already-resolved parts.
    pub fn new<N, T>(name: N, template_body: T, parameters: ParameterSet) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            template_body: template_body.into(),
            parameters,
        }
    }
}
