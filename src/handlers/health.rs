use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub remover: String,
    pub version: String,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let remover_status = if state.remover.health_check().await {
        "available"
    } else {
        "unavailable"
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Conversion API running".to_string(),
        remover: remover_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
