use tangram_model::{ModelError, TemplateError};
use thiserror::Error;

/// Common error type that can hold any tangram error
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl From<String> for CommonError {
    fn from(s: String) -> Self {
        CommonError::Generic(s)
    }
}

impl From<&str> for CommonError {
    fn from(s: &str) -> Self {
        CommonError::Generic(s.to_string())
    }
}
