use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct HiHippoError {
    pub code: String,
    pub message: String,
}

impl HiHippoError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bridge_io(error: impl std::fmt::Display) -> Self {
        Self::new("BRIDGE_IO", error.to_string())
    }
}
