use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Single stack parameter in one of two modes: an explicit value, or
/// "use previous value" (keep whatever the stack currently stores).
///
/// Exactly one mode is active per parameter; a use-previous parameter
/// carries no value. Fields are private so the invariant holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackParameter {
    /// Parameter key as known to the stack template.
    key: String,
    /// Explicit value; `None` when `use_previous` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    /// Keep the value currently stored on the stack.
    #[serde(default)]
    use_previous: bool,
}

impl StackParameter {
    /// Create a parameter with an explicit value.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: Some(value.into()),
            use_previous: false,
        }
    }

    /// Create a parameter that reuses the value currently stored on the stack.
    pub fn previous<K: Into<String>>(key: K) -> Self {
        Self {
            key: key.into(),
            value: None,
            use_previous: true,
        }
    }

    /// Parse a raw `key=value` override string.
    ///
    /// Splits on the FIRST `=` only, so values may themselves contain `=`.
    /// A string without any `=` is a fatal input error. An empty key
    /// (`"=v"`) is accepted; only the missing separator is rejected.
    pub fn parse_override(raw: &str) -> ModelResult<Self> {
        match raw.split_once('=') {
            Some((key, value)) => Ok(Self::new(key, value)),
            None => Err(ModelError::MalformedParameter(raw.to_string())),
        }
    }

    /// Get the parameter key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the explicit value, if this parameter carries one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns `true` if this parameter keeps the previously stored value.
    pub fn uses_previous(&self) -> bool {
        self.use_previous
    }
}

impl From<(&str, &str)> for StackParameter {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}
