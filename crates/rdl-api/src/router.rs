use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use crate::{
    error::ErrorBody, middleware::cors::create_cors_layer, profile, riddle, state::ApiState,
};

/// All routes wrapped in CORS
pub fn router() -> Router<ApiState> {
    routes().layer(create_cors_layer())
}

/// All routes without CORS.
///
/// The binaries stack the rate limiter on these and add CORS outermost, so
/// preflights skip the limiter and `429` responses stay readable in browsers.
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .merge(riddle::routes())
        .merge(profile::routes())
        .fallback(handler_404)
}

/// Liveness
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness, the store must answer
async fn ready(State(state): State<ApiState>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "The requested resource was not found".to_string(),
        }),
    )
}
