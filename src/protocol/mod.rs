//! Wire protocol for the embedding server

pub mod http;

pub use http::{EmbedRequest, EmbedResponse, HealthResponse, HttpErrorResponse};
