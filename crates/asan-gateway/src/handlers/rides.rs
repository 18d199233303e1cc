use crate::error::{AppError, Result};
use crate::model::{GeneratePinsRequest, TrackResponse};
use crate::state::AppState;
use asan_core::collection::{PINS, RIDES};
use asan_storage::{Fields, Record};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

/// Issues a pickup and a drop PIN (four digits each) for a ride.
pub async fn generate_pins_handler(
    State(state): State<AppState>,
    Json(request): Json<GeneratePinsRequest>,
) -> Result<Json<Record>> {
    let mut fields = Fields::new();
    if let Some(ride_id) = request.ride_id {
        fields.insert("rideId".into(), ride_id);
    }
    if let Some(user_id) = request.user_id {
        fields.insert("userId".into(), user_id);
    }
    fields.insert("pickup".into(), Value::from(random_pin()));
    fields.insert("drop".into(), Value::from(random_pin()));

    Ok(Json(state.db().add(PINS, fields).await?))
}

/// Reports a ride's last known location, or the origin if none was recorded.
pub async fn track_handler(
    State(state): State<AppState>,
    Path(ride_id): Path<String>,
) -> Result<Json<TrackResponse>> {
    let ride = state
        .db()
        .find(RIDES, |ride| ride.id() == Some(ride_id.as_str()))
        .await?
        .ok_or(AppError::NotFound(None))?;

    let location = ride
        .get("location")
        .filter(|location| !location.is_null())
        .cloned()
        .unwrap_or_else(|| json!({ "lat": 0, "lng": 0 }));

    Ok(Json(TrackResponse { ride_id, location }))
}

fn random_pin() -> u32 {
    rand::random_range(1_000..10_000)
}
