use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosterError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Inference error: {0}")]
    InferenceError(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PosterError {
    /// True for failures raised by one of the AWS backends.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            PosterError::InferenceError(_) | PosterError::StorageError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_cause() {
        let err = PosterError::InferenceError("dispatch failure".into());
        assert_eq!(err.to_string(), "Inference error: dispatch failure");

        let err = PosterError::MissingField("prompt".into());
        assert_eq!(err.to_string(), "Missing required field: prompt");
    }

    #[test]
    fn test_backend_classification() {
        assert!(PosterError::StorageError("denied".into()).is_backend());
        assert!(PosterError::InferenceError("throttled".into()).is_backend());
        assert!(!PosterError::MissingField("prompt".into()).is_backend());
        assert!(!PosterError::ConfigError("bad".into()).is_backend());
    }
}
