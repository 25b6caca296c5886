use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::param::StackParameter;

/// Resolved parameter set for one stack request.
///
/// Override parameters and keep parameters are stored separately because the
/// two reconciliation paths need different views: creation sends overrides
/// only ("previous value" is undefined for a stack that does not exist yet),
/// while an update sends overrides plus keep entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    /// Parameters with explicit values.
    overrides: Vec<StackParameter>,
    /// Parameters that keep their previously stored value.
    keep: Vec<StackParameter>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parameter set from raw caller input.
    ///
    /// `overrides` are `key=value` strings split on the first `=`; a string
    /// without `=` fails with [`ModelError::MalformedParameter`](crate::ModelError)
    /// before anything else happens. `keep` entries are plain keys converted
    /// to use-previous parameters.
    ///
    /// Keys are deduplicated last-wins within each list, and a keep key that
    /// also appears as an override is dropped: an explicit value always wins
    /// over reuse.
    pub fn from_raw<S: AsRef<str>>(overrides: &[S], keep: &[S]) -> ModelResult<Self> {
        let mut parsed = Vec::with_capacity(overrides.len());
        for raw in overrides {
            parsed.push(StackParameter::parse_override(raw.as_ref())?);
        }
        let parsed = dedup_last_wins(parsed);

        let kept = dedup_last_wins(
            keep.iter()
                .map(|k| StackParameter::previous(k.as_ref()))
                .collect(),
        );
        let kept = kept
            .into_iter()
            .filter(|k| !parsed.iter().any(|o| o.key() == k.key()))
            .collect();

        Ok(Self {
            overrides: parsed,
            keep: kept,
        })
    }

    /// Parameters submitted on the creation path: overrides only.
    ///
    /// Keep entries must never reach a create call; the provider rejects
    /// use-previous parameters for a stack that has no previous values.
    pub fn for_create(&self) -> &[StackParameter] {
        &self.overrides
    }

    /// Parameters submitted on the update path: overrides followed by keep
    /// entries, order preserved.
    pub fn for_update(&self) -> Vec<StackParameter> {
        let mut out = self.overrides.clone();
        out.extend(self.keep.iter().cloned());
        out
    }

    /// Number of override parameters.
    pub fn override_len(&self) -> usize {
        self.overrides.len()
    }

    /// Number of keep parameters.
    pub fn keep_len(&self) -> usize {
        self.keep.len()
    }

    /// Returns `true` if the set holds no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.keep.is_empty()
    }
}

/// Keep only the last occurrence of each key, preserving the order in which
/// the surviving entries first appeared.
fn dedup_last_wins(params: Vec<StackParameter>) -> Vec<StackParameter> {
    let mut out: Vec<StackParameter> = Vec::with_capacity(params.len());
    for p in params {
        if let Some(existing) = out.iter_mut().find(|e| e.key() == p.key()) {
            *existing = p;
        } else {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::ParameterSet;
    use crate::error::ModelError;
    use crate::param::StackParameter;

    #[test]
    fn from_raw_parses_overrides_and_keep() {
        let set = ParameterSet::from_raw(&["a=1", "b=2"], &["c"]).unwrap();
        assert_eq!(
            set.for_create(),
            &[StackParameter::new("a", "1"), StackParameter::new("b", "2")]
        );
        assert_eq!(
            set.for_update(),
            vec![
                StackParameter::new("a", "1"),
                StackParameter::new("b", "2"),
                StackParameter::previous("c"),
            ]
        );
    }

    #[test]
    fn from_raw_fails_on_missing_separator() {
        let err = ParameterSet::from_raw(&["a=1", "oops"], &[]).unwrap_err();
        assert!(matches!(err, ModelError::MalformedParameter(raw) if raw == "oops"));
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let set = ParameterSet::from_raw::<&str>(&[], &[]).unwrap();
        assert!(set.is_empty());
        assert!(set.for_create().is_empty());
        assert!(set.for_update().is_empty());
    }

    #[test]
    fn duplicate_override_keys_last_wins() {
        let set = ParameterSet::from_raw(&["a=1", "b=2", "a=3"], &[]).unwrap();
        assert_eq!(
            set.for_create(),
            &[StackParameter::new("a", "3"), StackParameter::new("b", "2")]
        );
    }

    #[test]
    fn override_shadows_same_key_keep_entry() {
        let set = ParameterSet::from_raw(&["a=1"], &["a", "b"]).unwrap();
        assert_eq!(set.keep_len(), 1);
        assert_eq!(
            set.for_update(),
            vec![StackParameter::new("a", "1"), StackParameter::previous("b")]
        );
    }

    #[test]
    fn for_create_never_contains_keep_entries() {
        let set = ParameterSet::from_raw(&["Env=prod"], &["Region"]).unwrap();
        assert_eq!(set.for_create(), &[StackParameter::new("Env", "prod")]);
        assert!(set.for_create().iter().all(|p| !p.uses_previous()));
    }
}
