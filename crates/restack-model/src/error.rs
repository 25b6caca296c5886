use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing '=' in parameter '{0}'")]
    MalformedParameter(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
