//! Embedding model capability, encoder and error taxonomy.

pub mod config;
pub mod encoder;
pub mod model;
pub mod vector;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use config::ModelConfig;
pub use encoder::EmbeddingEncoder;
pub use model::{EmbeddingModel, ModelFactory, ModelInfo};
pub use vector::{cosine_similarity, l2_norm, l2_normalize};

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Errors that can occur while loading a model or encoding text
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The request payload could not be turned into encodable text.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The model capability could not be invoked at all.
    #[error("Model unavailable: {model_name} - {reason}")]
    ModelUnavailable { model_name: String, reason: String },

    /// The model was invoked but produced no usable vector.
    #[error("Encoding failed: {error}")]
    EncodingFailure { error: String },

    #[error("Model load failed: {error}")]
    ModelLoadFailed { error: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {error}")]
    IoError { error: std::io::Error },

    #[error("TOML parsing error: {error}")]
    TomlError { error: toml::de::Error },
}

impl EmbeddingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        EmbeddingError::InvalidInput { message: message.into() }
    }

    pub fn unavailable(model_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EmbeddingError::ModelUnavailable {
            model_name: model_name.into(),
            reason: reason.into(),
        }
    }

    pub fn encoding(error: impl Into<String>) -> Self {
        EmbeddingError::EncodingFailure { error: error.into() }
    }

    /// Stable machine-readable code used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            EmbeddingError::InvalidInput { .. } => "INVALID_INPUT",
            EmbeddingError::ModelUnavailable { .. } => "MODEL_UNAVAILABLE",
            EmbeddingError::EncodingFailure { .. } => "ENCODING_FAILURE",
            EmbeddingError::ModelLoadFailed { .. } => "MODEL_LOAD_FAILED",
            EmbeddingError::ConfigError { .. } => "CONFIG_ERROR",
            EmbeddingError::IoError { .. } => "IO_ERROR",
            EmbeddingError::TomlError { .. } => "CONFIG_PARSE_ERROR",
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(error: std::io::Error) -> Self {
        EmbeddingError::IoError { error }
    }
}

impl From<toml::de::Error> for EmbeddingError {
    fn from(error: toml::de::Error) -> Self {
        EmbeddingError::TomlError { error }
    }
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for EmbeddingError {
    fn from(error: ort::Error) -> Self {
        EmbeddingError::ModelLoadFailed { error: error.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmbeddingError::unavailable("all-MiniLM-L6-v2", "not loaded");
        assert!(err.to_string().contains("Model unavailable"));
        assert!(err.to_string().contains("not loaded"));

        let err = EmbeddingError::encoding("zero vector");
        assert_eq!(err.to_string(), "Encoding failed: zero vector");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EmbeddingError::invalid_input("x").code(), "INVALID_INPUT");
        assert_eq!(EmbeddingError::unavailable("m", "r").code(), "MODEL_UNAVAILABLE");
        assert_eq!(EmbeddingError::encoding("e").code(), "ENCODING_FAILURE");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EmbeddingError = io_err.into();
        assert!(matches!(err, EmbeddingError::IoError { .. }));
    }
}
