use thiserror::Error;

/// Errors raised by the modelling layer and the solver backends.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MipError {
    #[error("unsupported provider: {name} (supported: {supported})")]
    UnknownProvider { name: String, supported: String },

    #[error("invalid solve option: {0}")]
    InvalidOption(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("solver backend failed: {0}")]
    Backend(String),
}
