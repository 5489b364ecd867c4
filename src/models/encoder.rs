//! Embedding Encoder
//!
//! Turns one canonical text into one unit-normalized vector using the
//! injected model. Holds no request state; the model is shared read-only.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::model::{EmbeddingModel, ModelInfo};
use crate::models::{l2_norm, l2_normalize, Embedding, EmbeddingError, EmbeddingResult};

/// Allowed deviation of the output norm from 1
pub const UNIT_NORM_TOLERANCE: f32 = 1e-5;

/// Encoder over a loaded model
#[derive(Clone)]
pub struct EmbeddingEncoder {
    model: Arc<dyn EmbeddingModel>,
}

impl EmbeddingEncoder {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self { model }
    }

    pub fn model_info(&self) -> &ModelInfo {
        self.model.info()
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_ready()
    }

    /// Encode a single text into a unit-normalized embedding.
    ///
    /// Fails with `ModelUnavailable` when the model cannot be invoked and
    /// with `EncodingFailure` when it returns nothing usable. Never retries.
    pub async fn encode(&self, text: &str) -> EmbeddingResult<Embedding> {
        let info = self.model.info();
        if !self.model.is_ready() {
            return Err(EmbeddingError::unavailable(&info.name, "model is not ready"));
        }

        let mut vectors = self.model.embed_batch(&[text.to_string()], true).await?;
        if vectors.len() != 1 {
            return Err(EmbeddingError::encoding(format!(
                "expected 1 vector from '{}', got {}",
                info.name,
                vectors.len()
            )));
        }
        let mut vector = vectors.remove(0);

        if vector.len() != info.dimension {
            return Err(EmbeddingError::encoding(format!(
                "expected {} dimensions from '{}', got {}",
                info.dimension,
                info.name,
                vector.len()
            )));
        }

        if vector.iter().any(|x| !x.is_finite()) {
            return Err(EmbeddingError::encoding("model produced non-finite values"));
        }

        let norm = l2_norm(&vector);
        if (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
            debug!("Re-normalizing output of '{}' (norm {})", info.name, norm);
            if !l2_normalize(&mut vector) {
                warn!("Model '{}' produced a zero vector", info.name);
                return Err(EmbeddingError::encoding("cannot normalize a zero vector"));
            }
        }

        Ok(vector)
    }
}
