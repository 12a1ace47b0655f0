use crate::error::GatewayError;
use crate::gateway::{CommandRequest, ExecutionResult, FailureKind, Gateway};
use crate::git::CommitEntry;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub commits: Vec<CommitEntry>,
}

/// `POST /api/terminal/execute` with `{"command": "..."}`
pub async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return server_error(rejection.body_text()),
    };

    let Some(command) = body.get("command").and_then(Value::as_str) else {
        return reply(StatusCode::BAD_REQUEST, ExecutionResult::failed("Invalid command"));
    };

    match state.gateway.execute(&CommandRequest::shell(command)).await {
        Ok(result) => reply(StatusCode::OK, result),
        Err(err) => {
            let status = terminal_status(&err);
            reply(status, ExecutionResult::from(err))
        }
    }
}

/// `POST /api/git/commit` with `{"message": "..."}`
pub async fn commit(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return server_error(rejection.body_text()),
    };

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match state.gateway.execute(&CommandRequest::commit(message)).await {
        Ok(result) => reply(StatusCode::OK, result),
        Err(err @ GatewayError::InvalidInput(_)) => {
            reply(StatusCode::BAD_REQUEST, ExecutionResult::from(err))
        }
        Err(err) => reply(StatusCode::OK, ExecutionResult::from(err)),
    }
}

/// `POST /api/git/push`
pub async fn push(State(state): State<AppState>) -> Response {
    let result = state.gateway.execute_normalized(&CommandRequest::push()).await;
    reply(StatusCode::OK, result)
}

/// `GET /api/git/history`, always reported as a success
pub async fn history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let commits = state.gateway.history().await;
    Json(HistoryResponse {
        success: true,
        commits,
    })
}

/// `GET /api/health`
pub async fn health() -> &'static str {
    "OK"
}

/// Only the terminal endpoint distinguishes rejections by status code
fn terminal_status(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GatewayError::Forbidden { .. } => StatusCode::FORBIDDEN,
        GatewayError::ExecutionFailed(info) if matches!(info.kind, FailureKind::Host(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        GatewayError::ExecutionFailed(_) => StatusCode::OK,
    }
}

fn reply(status: StatusCode, result: ExecutionResult) -> Response {
    (status, Json(result)).into_response()
}

fn server_error(message: String) -> Response {
    error!("Malformed request body: {}", message);
    reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        ExecutionResult::failed(format!("Server error: {}", message)),
    )
}
