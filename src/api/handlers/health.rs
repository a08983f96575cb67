use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.analyzer.engine().is_ready();

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "message": "Wallet fraud detection API is running",
            "model_loaded": model_loaded,
            "endpoints": {
                "analyze": "/api/analyze",
                "health": "/health",
                "metrics": "/metrics"
            }
        })),
    )
}
