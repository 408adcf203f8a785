//! HTTP request handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::analysis::AnalysisProfile;
use crate::llm::CompletionBackend;
use crate::pipeline::{PipelineError, Source};

use super::AppState;

/// Build the axum router with all routes.
pub fn router<B: CompletionBackend + 'static>(state: Arc<AppState<B>>) -> Result<axum::Router> {
    use axum::routing::{get, post};
    use tower_http::trace::TraceLayer;

    let cors = cors_layer(&state.cors_origins)?;

    Ok(axum::Router::new()
        .route("/", post(analyze::<B>))
        .route("/report", get(get_report::<B>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody { error: message }))
}

// -- POST / --

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    url: String,
    /// Short code "1".."7"; anything else means the default profile.
    #[serde(default)]
    analysis_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    status: &'static str,
    report_path: String,
}

async fn analyze<B: CompletionBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, (StatusCode, Json<ErrorBody>)> {
    let profile = AnalysisProfile::from_code(request.analysis_type.as_deref());
    tracing::info!(
        "Review requested for {} (profile {})",
        request.url,
        profile
    );

    match state
        .pipeline
        .run(Source::Remote(request.url.trim().to_string()), profile)
        .await
    {
        Ok(summary) => Ok(Json(AnalysisResponse {
            status: "OK",
            report_path: report_name(&summary.report_path),
        })),
        Err(err) => {
            tracing::error!("Review failed: {}", err);
            let status = match err {
                PipelineError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err(error_response(status, err.to_string()))
        }
    }
}

/// Report path as shown to clients: the file name only.
fn report_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// -- GET /report --

async fn get_report<B: CompletionBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let path = state.pipeline.report_path();
    let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    match tokio::fs::read(path).await {
        Ok(body) => Ok((
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Report file at path {} does not exist.", shown.display()),
        )),
        Err(e) => {
            tracing::error!("Failed to read report {}: {}", shown.display(), e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read report: {}", e),
            ))
        }
    }
}
