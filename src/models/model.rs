//! Model definitions and traits
//!
//! `EmbeddingModel` is the capability the encoder depends on: a sequence of
//! strings in, one fixed-length vector per string out. The ONNX
//! implementation lives here; tests inject their own.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::config::ModelConfig;
use crate::models::{Embedding, EmbeddingResult};

/// Information about a model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
    /// Model file path
    pub model_path: String,
    /// Tokenizer path
    pub tokenizer_path: String,
}

impl ModelInfo {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            name: config.name.clone(),
            dimension: config.embedding_dimension,
            max_sequence_length: config.max_sequence_length,
            model_path: config.model_path.clone(),
            tokenizer_path: config.tokenizer_path.clone(),
        }
    }
}

/// Core embedding model trait
///
/// Implementations must be safe for concurrent read-only use; the loaded
/// model is shared by every in-flight request.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Check if the model can currently be invoked
    fn is_ready(&self) -> bool;

    /// Generate one embedding per input text, unit-normalized when `normalize` is set
    async fn embed_batch(&self, texts: &[String], normalize: bool) -> EmbeddingResult<Vec<Embedding>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize {
        self.info().dimension
    }
}

/// ONNX-based embedding model implementation
#[cfg(feature = "onnx")]
pub mod onnx {
    use super::*;
    use crate::models::EmbeddingError;
    use crate::onnx::{OnnxConfig, OnnxEmbeddingEngine};
    use std::sync::Mutex;
    use tracing::info;

    /// ONNX embedding model
    ///
    /// The session needs exclusive access while running, so the engine sits
    /// behind a mutex and inference runs on the blocking thread pool.
    pub struct OnnxEmbeddingModel {
        info: ModelInfo,
        engine: Arc<Mutex<OnnxEmbeddingEngine>>,
    }

    impl OnnxEmbeddingModel {
        /// Load the ONNX session and tokenizer. Blocking.
        pub fn load(config: &ModelConfig) -> EmbeddingResult<Self> {
            let onnx_config = OnnxConfig::from_model_config(config);
            let engine = OnnxEmbeddingEngine::new(
                &config.model_path,
                &config.tokenizer_path,
                &onnx_config,
            )?;
            info!("✅ Model '{}' loaded ({} dimensions)", config.name, config.embedding_dimension);

            Ok(Self {
                info: ModelInfo::from_config(config),
                engine: Arc::new(Mutex::new(engine)),
            })
        }
    }

    #[async_trait]
    impl EmbeddingModel for OnnxEmbeddingModel {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn is_ready(&self) -> bool {
            !self.engine.is_poisoned()
        }

        async fn embed_batch(&self, texts: &[String], normalize: bool) -> EmbeddingResult<Vec<Embedding>> {
            let engine = Arc::clone(&self.engine);
            let texts = texts.to_vec();
            let model_name = self.info.name.clone();

            tokio::task::spawn_blocking(move || {
                let mut engine = engine.lock().map_err(|_| {
                    EmbeddingError::unavailable(&model_name, "engine lock poisoned by an earlier panic")
                })?;
                engine.embed_texts(&texts, normalize)
            })
            .await
            .map_err(|e| {
                EmbeddingError::unavailable(&self.info.name, format!("inference worker failed: {}", e))
            })?
        }
    }
}

/// Factory for creating embedding models
pub struct ModelFactory;

impl ModelFactory {
    /// Load the configured model. Called once at startup; blocking.
    pub fn load(config: &ModelConfig) -> EmbeddingResult<Arc<dyn EmbeddingModel>> {
        config.validate()?;

        #[cfg(feature = "onnx")]
        {
            let model = onnx::OnnxEmbeddingModel::load(config)?;
            Ok(Arc::new(model))
        }

        #[cfg(not(feature = "onnx"))]
        {
            Err(crate::models::EmbeddingError::ModelLoadFailed {
                error: format!(
                    "cannot load '{}': built without the `onnx` feature",
                    config.name
                ),
            })
        }
    }
}
