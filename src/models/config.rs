//! Configuration for the embedding model
//!
//! Lives under the `[model]` table of the server configuration file.

use serde::{Deserialize, Serialize};

use crate::models::{EmbeddingError, EmbeddingResult};

/// Configuration for the single loaded model
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name reported in health and info responses
    pub name: String,

    /// File paths
    pub model_path: String,
    pub tokenizer_path: String,

    /// Model parameters
    pub embedding_dimension: usize,
    pub max_sequence_length: usize,

    /// Intra-op thread count for inference
    pub num_threads: usize,

    /// ONNX Runtime shared library; empty lets the runtime resolve it
    pub onnx_runtime_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "all-MiniLM-L6-v2".to_string(),
            model_path: "ml_models/all-MiniLM-L6-v2/model.onnx".to_string(),
            tokenizer_path: "ml_models/all-MiniLM-L6-v2/tokenizer.json".to_string(),
            embedding_dimension: 384,
            max_sequence_length: 256,
            num_threads: 4,
            onnx_runtime_path: String::new(),
        }
    }
}

impl ModelConfig {
    /// Validate the configuration
    pub fn validate(&self) -> EmbeddingResult<()> {
        if self.name.trim().is_empty() {
            return Err(config_error("model.name cannot be empty"));
        }
        if self.model_path.trim().is_empty() {
            return Err(config_error("model.model_path cannot be empty"));
        }
        if self.tokenizer_path.trim().is_empty() {
            return Err(config_error("model.tokenizer_path cannot be empty"));
        }
        if self.embedding_dimension == 0 {
            return Err(config_error("model.embedding_dimension must be greater than 0"));
        }
        if self.max_sequence_length == 0 {
            return Err(config_error("model.max_sequence_length must be greater than 0"));
        }
        if self.num_threads == 0 {
            return Err(config_error("model.num_threads must be greater than 0"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> EmbeddingError {
    EmbeddingError::ConfigError { message: message.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.embedding_dimension, 384);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ModelConfig = toml::from_str(
            r#"
            name = "custom"
            num_threads = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "custom");
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.max_sequence_length, 256);
    }

    #[test]
    fn test_invalid_values() {
        let config = ModelConfig {
            embedding_dimension: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EmbeddingError::ConfigError { .. })));

        let config = ModelConfig {
            tokenizer_path: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
