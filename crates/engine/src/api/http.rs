//! HTTP routes.

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tf2bdd_domain::PlayerList;

use crate::app::App;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/v1/steamids", get(steam_ids))
}

async fn health() -> &'static str {
    "OK"
}

/// The registry as a player list document.
async fn steam_ids(State(app): State<Arc<App>>) -> Result<Json<PlayerList>, ApiError> {
    let list = app.use_cases.export.execute().await?;
    Ok(Json(list))
}

#[derive(Debug)]
pub enum ApiError {
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                )
                    .into_response()
            }
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
