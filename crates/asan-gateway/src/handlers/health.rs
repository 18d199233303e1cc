use crate::model::{HealthResponse, PingResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage: state.db().mode().to_string(),
    })
}

pub async fn ping_handler(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        now: state.now_millis(),
    })
}
