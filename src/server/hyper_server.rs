//! Hyper-based HTTP server
//!
//! Routes are matched by hand on (method, path); there is no framework
//! layer between hyper and the handlers.

use hyper::body::HttpBody;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpSocket;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{EmbeddingEncoder, EmbeddingError};
use crate::protocol::http::{EmbedRequest, EmbedResponse, HealthResponse, HttpErrorResponse};
use crate::server::config::ServerConfig;

/// Text encoded by the health probe
const HEALTH_PROBE_TEXT: &str = "test";

/// Shared state for the server: read-only, cloned into every connection
#[derive(Clone)]
pub struct ServerState {
    encoder: EmbeddingEncoder,
    config: Arc<ServerConfig>,
}

impl ServerState {
    pub fn new(encoder: EmbeddingEncoder, config: Arc<ServerConfig>) -> Self {
        Self { encoder, config }
    }
}

/// Bind and serve until the process stops (or Ctrl+C, when enabled)
pub async fn start_hyper_http_server(
    config: Arc<ServerConfig>,
    encoder: EmbeddingEncoder,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr()?;

    info!("🚀 Starting HTTP embedding server");
    info!("📡 Binding to {}", addr);

    let state = ServerState::new(encoder, Arc::clone(&config));

    let make_svc = make_service_fn(move |_| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = state.clone();
                handle_request(req, state)
            }))
        }
    });

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    // Small JSON responses; Nagle only adds latency here
    socket.set_nodelay(true)?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(1024)?;

    let server = Server::from_tcp(listener.into_std()?)?
        .http1_keepalive(true)
        .tcp_nodelay(true)
        .tcp_sleep_on_accept_errors(true)
        .serve(make_svc);

    info!("✅ HTTP server listening on {}", addr);
    info!("📍 Endpoints:");
    info!("   POST /embed      - Generate an embedding");
    info!("   GET  /health     - Health check");
    info!("   GET  /           - Server info");

    if config.network.shutdown_on_ctrl_c {
        server.with_graceful_shutdown(shutdown_signal()).await?;
    } else {
        server.await?;
    }

    info!("👋 HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("❌ Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received, draining connections");
}

/// Route a request and attach CORS headers
pub(crate) async fn handle_request(
    req: Request<Body>,
    state: ServerState,
) -> Result<Response<Body>, Infallible> {
    let origin = req
        .headers()
        .get(ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = match (&method, path.as_str()) {
        (&Method::POST, "/embed") => handle_embed(req, &state).await,
        (&Method::GET, "/health") => handle_health(&state).await,
        (&Method::GET, "/") => handle_root(&state),
        (&Method::OPTIONS, _) => handle_options(),
        (_, "/embed") => handle_method_not_allowed("POST, OPTIONS"),
        _ => json_response(StatusCode::NOT_FOUND, &HttpErrorResponse::not_found()),
    };

    let headers = response.headers_mut();
    headers.insert("access-control-allow-origin", origin);
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );

    Ok(response)
}

/// OPTIONS handler for CORS preflight
fn handle_options() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

fn handle_method_not_allowed(allow: &'static str) -> Response<Body> {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &HttpErrorResponse::new("Method Not Allowed").with_code("METHOD_NOT_ALLOWED"),
    );
    response.headers_mut().insert(ALLOW, HeaderValue::from_static(allow));
    response
}

/// Root endpoint - server info
fn handle_root(state: &ServerState) -> Response<Body> {
    let model = state.encoder.model_info();
    let info = serde_json::json!({
        "name": "Text Embedding Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "embed": {
                "method": "POST",
                "path": "/embed",
                "description": "Embed {\"text\": \"...\"} into {\"embeddings\": [[...]]}"
            },
            "health": {
                "method": "GET",
                "path": "/health",
                "description": "Health check endpoint"
            }
        },
        "model": model.name,
        "embedding_dimension": model.dimension,
        "max_sequence_length": model.max_sequence_length,
    });

    json_response(StatusCode::OK, &info)
}

/// Health check endpoint
async fn handle_health(state: &ServerState) -> Response<Body> {
    debug!("🏥 Health check requested");

    let model_name = &state.encoder.model_info().name;
    match state.encoder.encode(HEALTH_PROBE_TEXT).await {
        Ok(embedding) => json_response(
            StatusCode::OK,
            &HealthResponse::healthy(model_name, embedding.len()),
        ),
        Err(e) => {
            error!("❌ Health check failed: {}", e);
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &HttpErrorResponse::model_not_ready().with_details(e.to_string()),
            )
        }
    }
}

/// Embedding endpoint
async fn handle_embed(req: Request<Body>, state: &ServerState) -> Response<Body> {
    let request_id = Uuid::new_v4();
    let span = info_span!("embed", %request_id);
    embed_inner(req, state).instrument(span).await
}

async fn embed_inner(req: Request<Body>, state: &ServerState) -> Response<Body> {
    let timings = state.config.monitoring.log_request_timings;
    let limit = state.config.network.max_body_bytes;
    let start_time = Instant::now();

    let read_start = Instant::now();
    let body = match read_body_limited(req, limit).await {
        Ok(body) => body,
        Err(BodyError::TooLarge) => {
            warn!("Request body over {} bytes rejected", limit);
            return json_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                &HttpErrorResponse::payload_too_large(limit),
            );
        }
        Err(BodyError::Read(e)) => {
            warn!("Failed to read request body: {}", e);
            return error_response(&EmbeddingError::invalid_input("Failed to read request body"));
        }
    };
    if timings {
        debug!("⏱️  Body read took: {:?}", read_start.elapsed());
    }

    let parse_start = Instant::now();
    let request = match EmbedRequest::from_json(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected request: {}", e);
            return error_response(&e);
        }
    };
    if timings {
        debug!("⏱️  JSON parse took: {:?}", parse_start.elapsed());
    }
    let text = request.canonical_text();
    debug!("🔤 Embedding request for canonical text of {} bytes", text.len());

    let embed_start = Instant::now();
    let embedding = match state.encoder.encode(&text).await {
        Ok(embedding) => embedding,
        Err(e) => {
            error!("❌ Embedding generation failed: {}", e);
            return error_response(&e);
        }
    };
    if timings {
        debug!("⏱️  Embedding generation took: {:?}", embed_start.elapsed());
    }

    let serialize_start = Instant::now();
    let response = json_response(StatusCode::OK, &EmbedResponse::single(embedding));
    if timings {
        debug!("⏱️  JSON serialization took: {:?}", serialize_start.elapsed());
        debug!("⏱️  TOTAL request took: {:?}", start_time.elapsed());
    }
    response
}

enum BodyError {
    TooLarge,
    Read(hyper::Error),
}

/// Collect the request body, stopping as soon as it exceeds `limit` bytes
async fn read_body_limited(req: Request<Body>, limit: usize) -> Result<Vec<u8>, BodyError> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.map_or(false, |len| len > limit) {
        return Err(BodyError::TooLarge);
    }

    let mut body = req.into_body();
    let mut buf = Vec::with_capacity(declared.unwrap_or(0));
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(BodyError::Read)?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// HTTP status for a failure kind
pub fn status_for(error: &EmbeddingError) -> StatusCode {
    match error {
        EmbeddingError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        EmbeddingError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &EmbeddingError) -> Response<Body> {
    json_response(status_for(error), &HttpErrorResponse::from_error(error))
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            error!("❌ Failed to serialize response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"Internal server error"}"#.to_vec(),
            )
        }
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
