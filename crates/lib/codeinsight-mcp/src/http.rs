//! Plain JSON HTTP surface for the query tools.
//!
//! `POST /tools/{name}` takes the tool arguments as a JSON object body (an
//! empty body counts as no arguments) and routes them through the dispatcher.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use codeinsight_core::control::{ToolArgs, ToolDispatcher, ToolError, ToolName, ToolOutput};
use codeinsight_core::embed::Embedder;
use codeinsight_core::store::GraphStore;
use serde::Serialize;
use tracing::warn;

struct AppState<S: GraphStore, E: Embedder> {
    dispatcher: Arc<ToolDispatcher<S, E>>,
}

impl<S: GraphStore, E: Embedder> Clone for AppState<S, E> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ToolDescription {
    name: &'static str,
    description: &'static str,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_argument",
            message: message.into(),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        let status = match err {
            ToolError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
            ToolError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ToolError::EmbeddingFailure(_) | ToolError::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
            kind: self.kind,
        });
        (self.status, payload).into_response()
    }
}

/// Builds the `/tools` routes over a shared dispatcher.
pub fn router<S: GraphStore, E: Embedder>(dispatcher: Arc<ToolDispatcher<S, E>>) -> Router {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/:name", post(call_tool::<S, E>))
        .with_state(AppState { dispatcher })
}

async fn list_tools() -> Json<Vec<ToolDescription>> {
    Json(
        ToolName::ALL
            .into_iter()
            .map(|tool| ToolDescription {
                name: tool.as_str(),
                description: tool.description(),
            })
            .collect(),
    )
}

async fn call_tool<S: GraphStore, E: Embedder>(
    State(state): State<AppState<S, E>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolOutput>, ApiError> {
    let args = parse_args(&body)?;
    let output = state.dispatcher.dispatch(&name, &args).await.map_err(|err| {
        warn!(tool = %name, kind = err.kind(), error = %err, "tool call failed");
        ApiError::from(err)
    })?;
    Ok(Json(output))
}

fn parse_args(body: &[u8]) -> Result<ToolArgs, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ToolArgs::new());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("arguments must be a JSON object: {err}")))
}
