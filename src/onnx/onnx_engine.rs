//! # ONNX Embedding Engine
//!
//! Sentence embeddings with ONNX Runtime and a HuggingFace tokenizer,
//! defaulting to all-MiniLM-L6-v2.
//!
//! Pipeline per text: tokenize (truncated, unpadded) → run the graph →
//! mean-pool `last_hidden_state` over the attention mask → optionally
//! L2-normalize.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = OnnxConfig::from_model_config(&ModelConfig::default());
//! let mut engine = OnnxEmbeddingEngine::new("model.onnx", "tokenizer.json", &config)?;
//! let embeddings = engine.embed_texts(&["hello world".to_string()], true)?;
//! ```

use ndarray::ArrayViewD;
#[cfg(feature = "onnx")]
use ort::session::{builder::GraphOptimizationLevel, Session};
#[cfg(feature = "onnx")]
use ort::value::Tensor;
#[cfg(feature = "onnx")]
use tokenizers::{Tokenizer, TruncationParams};
#[cfg(feature = "onnx")]
use tracing::{debug, info, instrument};

use crate::models::config::ModelConfig;
use crate::models::{l2_normalize, Embedding, EmbeddingError, EmbeddingResult};

/// Name of the token-level output produced by BERT-style exports
pub const HIDDEN_STATE_OUTPUT: &str = "last_hidden_state";

/// Configuration for ONNX Runtime
#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// Path to ONNX Runtime library (DLL/so/dylib); empty means resolve automatically
    pub library_path: String,
    /// Thread pool size for inference
    pub thread_pool_size: usize,
    /// Tokens kept per text; longer inputs are truncated
    pub max_seq_length: usize,
}

impl OnnxConfig {
    pub fn from_model_config(config: &ModelConfig) -> Self {
        Self {
            library_path: config.onnx_runtime_path.clone(),
            thread_pool_size: config.num_threads,
            max_seq_length: config.max_sequence_length,
        }
    }
}

/// ONNX-based embedding engine for generating text embeddings
#[cfg(feature = "onnx")]
#[derive(Debug)]
pub struct OnnxEmbeddingEngine {
    /// ONNX Runtime session for model inference
    session: Session,
    /// HuggingFace tokenizer for text preprocessing
    tokenizer: Tokenizer,
    /// Whether the graph declares a `token_type_ids` input
    uses_token_type_ids: bool,
    /// Output tensor that holds per-token hidden states
    output_name: String,
}

#[cfg(feature = "onnx")]
impl OnnxEmbeddingEngine {
    /// Create a new ONNX embedding engine
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file (model.onnx)
    /// * `tokenizer_path` - Path to the tokenizer configuration file (tokenizer.json)
    /// * `onnx_config` - ONNX Runtime configuration
    pub fn new(model_path: &str, tokenizer_path: &str, onnx_config: &OnnxConfig) -> EmbeddingResult<Self> {
        info!("Initializing ONNX embedding engine with model: {}", model_path);

        // Check files before touching the runtime so a bad path fails cleanly
        for (kind, path) in [("model", model_path), ("tokenizer", tokenizer_path)] {
            if !std::path::Path::new(path).is_file() {
                return Err(load_failed(format!("{} file not found: {}", kind, path)));
            }
        }

        if !onnx_config.library_path.is_empty() {
            std::env::set_var("ORT_DYLIB_PATH", &onnx_config.library_path);
            debug!("Set ORT_DYLIB_PATH to: {}", onnx_config.library_path);
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_failed)?
            .with_intra_threads(onnx_config.thread_pool_size)
            .map_err(load_failed)?
            .commit_from_file(model_path)
            .map_err(|e| load_failed(format!("Failed to load ONNX model: {}", e)))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| load_failed(format!("Failed to load tokenizer: {}", e)))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: onnx_config.max_seq_length,
                ..Default::default()
            }))
            .map_err(|e| load_failed(format!("Failed to configure truncation: {}", e)))?;

        let uses_token_type_ids = session.inputs.iter().any(|input| input.name == "token_type_ids");
        let output_name = if session.outputs.iter().any(|o| o.name == HIDDEN_STATE_OUTPUT) {
            HIDDEN_STATE_OUTPUT.to_string()
        } else {
            session
                .outputs
                .first()
                .map(|o| o.name.clone())
                .ok_or_else(|| load_failed("ONNX model declares no outputs"))?
        };

        info!(
            "ONNX embedding engine ready ({} threads, output '{}', token_type_ids: {})",
            onnx_config.thread_pool_size, output_name, uses_token_type_ids
        );
        Ok(Self {
            session,
            tokenizer,
            uses_token_type_ids,
            output_name,
        })
    }

    /// Generate one embedding per text. Blocking.
    #[instrument(skip(self, texts), fields(text_count = texts.len()))]
    pub fn embed_texts(&mut self, texts: &[String], normalize: bool) -> EmbeddingResult<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| EmbeddingError::encoding(format!("Tokenization failed: {}", e)))?;

            let attention_mask = encoding.get_attention_mask();
            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
            let mask: Vec<i64> = attention_mask.iter().map(|&x| x as i64).collect();
            let seq_len = input_ids.len() as i64;

            let mut inputs = vec![
                ("input_ids", to_tensor(seq_len, input_ids)?),
                ("attention_mask", to_tensor(seq_len, mask)?),
            ];
            if self.uses_token_type_ids {
                inputs.push(("token_type_ids", to_tensor(seq_len, vec![0i64; seq_len as usize])?));
            }

            let outputs = self
                .session
                .run(inputs)
                .map_err(|e| EmbeddingError::encoding(format!("ONNX inference failed: {}", e)))?;

            let (shape, data) = outputs[self.output_name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(|e| EmbeddingError::encoding(format!("Failed to extract output tensor: {}", e)))?;

            let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
            let hidden = ndarray::ArrayView::from_shape(dims.as_slice(), data)
                .map_err(|e| EmbeddingError::encoding(format!("Failed to view output tensor: {:?}", e)))?;

            let mut embedding = mean_pooling(&hidden, attention_mask)?;
            if normalize && !l2_normalize(&mut embedding) {
                return Err(EmbeddingError::encoding("Cannot normalize zero vector"));
            }

            embeddings.push(embedding);
        }

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }
}

#[cfg(feature = "onnx")]
fn to_tensor(seq_len: i64, values: Vec<i64>) -> EmbeddingResult<Tensor<i64>> {
    Tensor::from_array(([1i64, seq_len], values))
        .map_err(|e| EmbeddingError::encoding(format!("Failed to create input tensor: {}", e)))
}

#[cfg(feature = "onnx")]
fn load_failed(error: impl std::fmt::Display) -> EmbeddingError {
    EmbeddingError::ModelLoadFailed { error: error.to_string() }
}

/// Mean-pool token embeddings `[1, seq_len, hidden]` over tokens whose mask is 1.
pub(crate) fn mean_pooling(hidden: &ArrayViewD<f32>, attention_mask: &[u32]) -> EmbeddingResult<Embedding> {
    let shape = hidden.shape();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(EmbeddingError::encoding(format!(
            "Expected output shape [1, seq_len, hidden], got {:?}",
            shape
        )));
    }

    let (seq_len, hidden_size) = (shape[1], shape[2]);
    if attention_mask.len() != seq_len {
        return Err(EmbeddingError::encoding(format!(
            "Attention mask length {} doesn't match sequence length {}",
            attention_mask.len(),
            seq_len
        )));
    }

    let mut pooled = vec![0.0f32; hidden_size];
    let mut valid_tokens = 0usize;
    for (seq_idx, &mask) in attention_mask.iter().enumerate() {
        if mask == 1 {
            for (hidden_idx, value) in pooled.iter_mut().enumerate() {
                *value += hidden[[0, seq_idx, hidden_idx]];
            }
            valid_tokens += 1;
        }
    }

    if valid_tokens == 0 {
        return Err(EmbeddingError::encoding("No valid tokens found in attention mask"));
    }

    let count = valid_tokens as f32;
    for value in &mut pooled {
        *value /= count;
    }
    Ok(pooled)
}
