//! Text Embedding Server Library
//!
//! HTTP service that turns one text into one unit-normalized embedding:
//! normalize the text, run the model, return `{"embeddings": [[...]]}`.

pub mod models;
pub mod onnx;
pub mod protocol;
pub mod server;
pub mod text;

// Re-exports
pub use models::{cosine_similarity, Embedding, EmbeddingEncoder, EmbeddingError, EmbeddingModel, ModelFactory};
pub use protocol::{EmbedRequest, EmbedResponse};
pub use server::{start_hyper_http_server, ServerConfig};
pub use text::normalize;
