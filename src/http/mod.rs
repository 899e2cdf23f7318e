//! HTTP transport for the pet service.
//!
//! | method | path             | body                                  |
//! |--------|------------------|---------------------------------------|
//! | GET    | `/pet/status`    | -                                     |
//! | POST   | `/pet/update`    | `{"action", "value"?, "name"?}`       |
//! | POST   | `/reset`         | -                                     |
//! | GET    | `/mcp/discovery` | -                                     |
//!
//! Rejected actions and malformed bodies answer 400 with `{"detail": "..."}`; storage
//! faults answer 500.

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use log::{debug, error, info};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::pet::{ActionRequest, PetError, PetRecord, PetResult};
use crate::service::{Discovery, PetService};

type SharedService = Arc<PetService>;

/// Error surfaced to HTTP callers.
#[derive(Debug)]
pub enum ApiError {
    Pet(PetError),
    /// Body that is not a well-formed action request.
    BadRequest(String),
    Internal(String),
}

impl From<PetError> for ApiError {
    fn from(e: PetError) -> Self {
        ApiError::Pet(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Pet(e) if e.is_rejection() => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Pet(e) => {
                error!("pet service failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Build the router over a shared service.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/pet/status", get(get_status))
        .route("/pet/update", post(update_status))
        .route("/reset", post(reset))
        .route("/mcp/discovery", get(discovery))
        .with_state(service)
}

/// Bind `config.listen_addr()` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, service: SharedService) -> Result<()> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!("Pet service listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;
    Ok(())
}

// Store I/O is blocking, keep it off the async workers
async fn run_blocking<T, F>(service: SharedService, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&PetService) -> PetResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))?
        .map_err(ApiError::from)
}

async fn get_status(State(service): State<SharedService>) -> Result<Json<PetRecord>, ApiError> {
    debug!("GET /pet/status");
    let pet = run_blocking(service, |s| s.get_status(Utc::now())).await?;
    Ok(Json(pet))
}

async fn update_status(
    State(service): State<SharedService>,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<PetRecord>, ApiError> {
    let Json(request) = body?;
    debug!("POST /pet/update action={}", crate::logutil::escape_log(&request.action));
    let pet = run_blocking(service, move |s| s.update_status(&request, Utc::now())).await?;
    Ok(Json(pet))
}

async fn reset(State(service): State<SharedService>) -> Result<Json<PetRecord>, ApiError> {
    debug!("POST /reset");
    let pet = run_blocking(service, |s| s.reset(Utc::now())).await?;
    Ok(Json(pet))
}

async fn discovery(State(service): State<SharedService>) -> Json<Discovery> {
    Json(service.discovery_info())
}
