//! HTTP server for the static demo documents.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

use crate::contract::scenario::DEMO_OUTPUTS_PREFIX;
use crate::error::FetchError;
use crate::source::{DirSource, DocumentSource};

pub const SERVICE_NAME: &str = "lifecycle-wizard-fixtures";

#[derive(Clone)]
struct AppState {
    documents: Arc<DirSource>,
}

/// Build the router serving `/health` and `/demo_outputs/{name}` from `dir`.
pub fn fixture_routes(dir: impl Into<PathBuf>) -> Router {
    let state = AppState {
        documents: Arc::new(DirSource::new(dir)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(&format!("{DEMO_OUTPUTS_PREFIX}/{{name}}"), get(document))
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

async fn document(Path(name): Path<String>, State(state): State<AppState>) -> Response {
    if !name.ends_with(".json") {
        return not_found(&name);
    }

    let path = format!("{DEMO_OUTPUTS_PREFIX}/{name}");
    match state.documents.get(&path).await {
        Ok(body) => {
            debug!(document = %name, "Serving document");
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(FetchError::Status { status: 404, .. }) => not_found(&name),
        Err(e) => {
            warn!(document = %name, error = %e, "Failed to read document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "document unavailable" })),
            )
                .into_response()
        }
    }
}

fn not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("no such document: {name}") })),
    )
        .into_response()
}
