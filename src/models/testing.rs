//! Fake models injected by tests in place of the ONNX model.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::models::model::{EmbeddingModel, ModelInfo};
use crate::models::{l2_normalize, Embedding, EmbeddingError, EmbeddingResult};

fn fake_info(name: &str, dimension: usize) -> ModelInfo {
    ModelInfo {
        name: name.to_string(),
        dimension,
        max_sequence_length: 256,
        model_path: "fake/model.onnx".to_string(),
        tokenizer_path: "fake/tokenizer.json".to_string(),
    }
}

/// Deterministic model: sinusoids seeded from a hash of the text.
///
/// Output is unnormalized unless asked, and `ignore_normalize` lets a test
/// simulate a capability that never normalizes internally.
pub(crate) struct HashingModel {
    info: ModelInfo,
    ignore_normalize: bool,
}

impl HashingModel {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            info: fake_info("hashing-test-model", dimension),
            ignore_normalize: false,
        }
    }

    pub(crate) fn ignoring_normalize(dimension: usize) -> Self {
        Self {
            info: fake_info("hashing-test-model", dimension),
            ignore_normalize: true,
        }
    }

    fn raw_vector(&self, text: &str) -> Embedding {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        (0..self.info.dimension)
            .map(|i| (((seed >> (i % 48)) & 0xffff) as f32 * 0.01 + i as f32).sin() * 3.0)
            .collect()
    }
}

#[async_trait]
impl EmbeddingModel for HashingModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn embed_batch(&self, texts: &[String], normalize: bool) -> EmbeddingResult<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = self.raw_vector(text);
                if normalize && !self.ignore_normalize {
                    l2_normalize(&mut vector);
                }
                vector
            })
            .collect())
    }
}

/// Model that was never loaded.
pub(crate) struct UnavailableModel {
    info: ModelInfo,
}

impl UnavailableModel {
    pub(crate) fn new() -> Self {
        Self {
            info: fake_info("unavailable-test-model", 8),
        }
    }
}

#[async_trait]
impl EmbeddingModel for UnavailableModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn is_ready(&self) -> bool {
        false
    }

    async fn embed_batch(&self, _texts: &[String], _normalize: bool) -> EmbeddingResult<Vec<Embedding>> {
        Err(EmbeddingError::unavailable(&self.info.name, "not loaded"))
    }
}

/// Model that answers with a fixed (possibly malformed) batch.
pub(crate) struct FixedModel {
    info: ModelInfo,
    output: Vec<Embedding>,
}

impl FixedModel {
    pub(crate) fn new(dimension: usize, output: Vec<Embedding>) -> Self {
        Self {
            info: fake_info("fixed-test-model", dimension),
            output,
        }
    }
}

#[async_trait]
impl EmbeddingModel for FixedModel {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn embed_batch(&self, _texts: &[String], _normalize: bool) -> EmbeddingResult<Vec<Embedding>> {
        Ok(self.output.clone())
    }
}
