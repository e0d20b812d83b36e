//! axum server for the dispatch endpoint.
//!
//! Maps `EmailDispatchResult` onto the public JSON contract:
//! 200 success body, 400 `{error}` for validation, 500 `{error, details}` otherwise.

use crate::domain::classify::{SENT_MESSAGE, generic_fault};
use crate::domain::{DispatchErrorKind, EmailDispatchRequest, EmailDispatchResult};
use crate::usecases::DispatchService;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const SEND_EMAIL_PATH: &str = "/api/send-email";

#[derive(Clone)]
pub struct AppState {
    pub dispatch: Arc<DispatchService>,
}

/// 200 body.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailSuccess {
    pub success: bool,
    pub message: String,
    pub message_id: String,
    pub file_name: String,
    pub file_size: String,
}

/// 400/500 body. `details` is omitted for validation failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(SEND_EMAIL_PATH, post(send_email))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(listen_addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(addr = %listen_addr, "dispatch server listening");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown requested");
        })
        .await
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailDispatchRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "unreadable dispatch request");
            return result_response(generic_fault(&rejection.body_text()));
        }
    };

    result_response(state.dispatch.dispatch(&request).await)
}

fn result_response(result: EmailDispatchResult) -> Response {
    match result {
        EmailDispatchResult::Sent {
            message_id,
            file_name,
            file_size_kb,
        } => (
            StatusCode::OK,
            Json(SendEmailSuccess {
                success: true,
                message: SENT_MESSAGE.to_string(),
                message_id,
                file_name,
                file_size: format!("{} KB", file_size_kb),
            }),
        )
            .into_response(),
        EmailDispatchResult::Failed {
            kind: DispatchErrorKind::ValidationError,
            human_message,
            ..
        } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: human_message,
                details: None,
            }),
        )
            .into_response(),
        EmailDispatchResult::Failed {
            human_message,
            raw_detail,
            ..
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: human_message,
                details: Some(raw_detail),
            }),
        )
            .into_response(),
    }
}
