use thiserror::Error;

/// Errors raised while constructing atmosphere models.
///
/// Queries never fail; out-of-range altitudes are absorbed by the clamp and
/// vacuum regimes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtmosphereError {
    #[error("atmosphere model kind `{0}` is not supported here")]
    UnsupportedModelKind(String),
    #[error("invalid atmosphere configuration: {0}")]
    InvalidConfiguration(String),
}

impl AtmosphereError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AtmosphereError::InvalidConfiguration(message.into())
    }
}
