//! Mapping layer from the raw caller-facing [`StackSpec`] to a validated
//! [`StackRequest`].
use tracing::trace;

use crate::error::ReconcileError;
use restack_model::{ParameterSet, StackRequest, StackSpec};

/// Resolve a raw spec into an immutable request.
///
/// Pure: parses and deduplicates parameters, makes no provider call. A
/// malformed override aborts here, before any cloud interaction.
pub fn resolve(spec: &StackSpec) -> Result<StackRequest, ReconcileError> {
    let parameters =
        ParameterSet::from_raw(&spec.parameter_overrides, &spec.keep_parameters)?;

    trace!(
        stack = %spec.stack,
        overrides = parameters.override_len(),
        keep = parameters.keep_len(),
        "parameter set resolved",
    );

    Ok(StackRequest::new(
        &spec.stack,
        &spec.template_body,
        parameters,
    ))
}
