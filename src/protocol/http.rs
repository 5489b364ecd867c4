//! HTTP JSON protocol
//!
//! - Endpoint: POST /embed
//! - Request body: {"text": "..."} (`text` optional, absent or null means "")
//! - Response body: {"embeddings": [[0.1, 0.2, ...]]}

use serde::{Deserialize, Serialize};

use crate::models::{Embedding, EmbeddingError, EmbeddingResult};
use crate::text::normalize;

/// HTTP embedding request
///
/// Unknown fields are ignored. A `text` of any type other than string or
/// null is rejected rather than coerced.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedRequest {
    /// Text to embed
    #[serde(default)]
    pub text: Option<String>,
}

impl EmbedRequest {
    /// Parse a request body
    pub fn from_json(body: &[u8]) -> EmbeddingResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| EmbeddingError::invalid_input(format!("Invalid JSON: {}", e)))?;

        // Derived struct impls would also accept a JSON array
        if !value.is_object() {
            return Err(EmbeddingError::invalid_input("Request body must be a JSON object"));
        }

        serde_json::from_value(value)
            .map_err(|e| EmbeddingError::invalid_input(format!("`text` must be a string: {}", e)))
    }

    /// The text the encoder should see
    pub fn canonical_text(&self) -> String {
        normalize(self.text.as_deref())
    }
}

/// HTTP embedding response
///
/// Always a list holding exactly one vector per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Embedding>,
}

impl EmbedResponse {
    pub fn single(embedding: Embedding) -> Self {
        Self {
            embeddings: vec![embedding],
        }
    }
}

/// HTTP Error Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error message
    pub error: String,

    /// Error code (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Additional details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            details: None,
        }
    }

    /// Create error with code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Create error with details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Map an encoder or request failure onto the wire
    pub fn from_error(error: &EmbeddingError) -> Self {
        let summary = match error {
            EmbeddingError::InvalidInput { .. } => "Invalid request",
            EmbeddingError::ModelUnavailable { .. } => "Embedding model is unavailable, please try again later",
            EmbeddingError::EncodingFailure { .. } => "Embedding generation failed",
            _ => "Internal server error",
        };
        Self::new(summary)
            .with_code(error.code())
            .with_details(error.to_string())
    }

    pub fn payload_too_large(limit: usize) -> Self {
        Self::new(format!("Request body exceeds {} bytes", limit)).with_code("PAYLOAD_TOO_LARGE")
    }

    pub fn model_not_ready() -> Self {
        Self::new("Embedding model is not ready").with_code("MODEL_NOT_READY")
    }

    pub fn not_found() -> Self {
        Self::new("Not Found").with_code("NOT_FOUND")
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
    pub embedding_dimension: usize,
}

impl HealthResponse {
    pub fn healthy(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            model: model.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            embedding_dimension: dimension,
        }
    }
}
