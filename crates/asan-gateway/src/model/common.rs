use asan_storage::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: String,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub now: i64,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Optional `?userId=` filter on list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePinsRequest {
    pub ride_id: Option<Value>,
    pub user_id: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub ride_id: String,
    pub location: Value,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: Record,
}
