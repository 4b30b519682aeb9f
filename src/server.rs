//! HTTP layer.
//!
//! Routes:
//! - `POST /generate-proposal` — report text in, proposal PDF out
//! - `GET /health` — liveness probe
//!
//! The report arrives either as a `report_text` query parameter or as an
//! uploaded `file` in a multipart form. Exactly one source must be present;
//! supplying both or neither is rejected before the orchestrator runs.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::core::proposal::{ProposalError, ProposalService};

#[derive(Debug, Deserialize)]
struct GenerateParams {
    report_text: Option<String>,
}

/// Build the application router.
pub fn router(service: Arc<ProposalService>) -> Router {
    Router::new()
        .route("/generate-proposal", post(generate_proposal))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, service: Arc<ProposalService>) -> std::io::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

fn error_response(status: StatusCode, class: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": {
                "type": class,
                "message": message,
            }
        })),
    )
        .into_response()
}

fn status_for(error: &ProposalError) -> StatusCode {
    match error {
        ProposalError::Input(_) => StatusCode::BAD_REQUEST,
        ProposalError::Exhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
        ProposalError::FatalBackend(_) => StatusCode::BAD_GATEWAY,
        ProposalError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Pull the report out of the request: query text or uploaded file,
/// exactly one of the two.
async fn extract_report_content(
    report_text: Option<String>,
    multipart: Option<Multipart>,
) -> Result<String, String> {
    let mut form_text: Option<String> = None;
    let mut file_content: Option<String> = None;

    if let Some(mut multipart) = multipart {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| format!("Error reading upload: {e}"))?
        {
            match field.name() {
                Some("file") => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| format!("Error reading file: {e}"))?;
                    let text = String::from_utf8(bytes.to_vec())
                        .map_err(|_| "Uploaded file is not valid UTF-8 text".to_string())?;
                    file_content = Some(text);
                }
                Some("report_text") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| format!("Error reading field: {e}"))?;
                    form_text = Some(text);
                }
                _ => {}
            }
        }
    }

    let text = report_text.or(form_text);
    match (text, file_content) {
        (Some(_), Some(_)) => Err(
            "Provide either report_text or a file upload, not both".to_string(),
        ),
        (Some(text), None) => Ok(text),
        (None, Some(file)) => Ok(file),
        (None, None) => Err(
            "Please provide report_text or upload a file".to_string(),
        ),
    }
}

async fn generate_proposal(
    State(service): State<Arc<ProposalService>>,
    Query(params): Query<GenerateParams>,
    multipart: Option<Multipart>,
) -> Response {
    let content = match extract_report_content(params.report_text, multipart).await {
        Ok(content) => content,
        Err(message) => {
            tracing::warn!(%message, "rejected request");
            return error_response(StatusCode::BAD_REQUEST, "input_error", &message);
        }
    };

    match service.generate(&content).await {
        Ok(pdf) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=funding_proposal.pdf",
                ),
            ],
            pdf,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(class = e.class(), error = %e, "proposal generation failed");
            error_response(status_for(&e), e.class(), &e.to_string())
        }
    }
}
