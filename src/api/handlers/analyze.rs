use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::AnalysisReport;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub address: Option<String>,
}

pub async fn analyze_post(
    State(state): State<AppState>,
    body: Option<Json<AnalyzeRequest>>,
) -> Result<Json<AnalysisReport>, AppError> {
    let address = body
        .and_then(|Json(req)| req.address)
        .ok_or_else(|| AppError::BadRequest("Missing address in request body".into()))?;

    analyze(&state, &address).await
}

pub async fn analyze_get(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AnalysisReport>, AppError> {
    analyze(&state, &address).await
}

async fn analyze(state: &AppState, address: &str) -> Result<Json<AnalysisReport>, AppError> {
    let address = validate_address(address)?;
    Ok(Json(state.analyzer.analyze(address).await))
}

/// `0x` followed by 40 hex digits.
pub fn validate_address(address: &str) -> Result<&str, AppError> {
    let address = address.trim();
    let valid = address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(address)
    } else {
        Err(AppError::BadRequest("Invalid Ethereum address format".into()))
    }
}
