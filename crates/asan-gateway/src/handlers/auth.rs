use super::{non_blank, public_user};
use crate::error::{AppError, Result};
use crate::model::{
    LoginRequest, RegisterRequest, SendOtpRequest, SendOtpResponse, UserResponse,
    VerifyOtpRequest, VerifyOtpResponse,
};
use crate::state::AppState;
use asan_core::collection::{OTPS, USERS};
use asan_storage::Fields;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use tracing::info;

/// How long a one-time password stays valid.
const OTP_TTL_MILLIS: i64 = 5 * 60 * 1000;
/// Name given to users created through OTP sign-in.
const DEFAULT_USER_NAME: &str = "Guardian";

pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    let (Some(email), Some(password)) = (non_blank(request.email), non_blank(request.password))
    else {
        return Err(AppError::bad_request("email and password required"));
    };

    let exists = state
        .db()
        .find(USERS, |user| user.get_str("email") == Some(email.as_str()))
        .await?;
    if exists.is_some() {
        return Err(AppError::bad_request("user already exists"));
    }

    let mut fields = Fields::new();
    fields.insert("email".into(), Value::String(email));
    fields.insert("password".into(), Value::String(password));
    if let Some(name) = request.name {
        fields.insert("name".into(), Value::String(name));
    }

    let user = state.db().add(USERS, fields).await?;
    info!(user_id = ?user.id(), "user registered");
    Ok(Json(UserResponse {
        user: public_user(user),
    }))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let (Some(email), Some(password)) = (non_blank(request.email), non_blank(request.password))
    else {
        return Err(AppError::unauthorized("invalid credentials"));
    };

    let user = state
        .db()
        .find(USERS, |user| {
            user.get_str("email") == Some(email.as_str())
                && user.get_str("password") == Some(password.as_str())
        })
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    Ok(Json(UserResponse {
        user: public_user(user),
    }))
}

pub async fn send_otp_handler(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>> {
    let Some(phone) = non_blank(request.phone) else {
        return Err(AppError::bad_request("phone required"));
    };

    let otp = rand::random_range(100_000..1_000_000_u32).to_string();
    let expires = state.now_millis() + OTP_TTL_MILLIS;

    let mut fields = Fields::new();
    fields.insert("phone".into(), Value::String(phone));
    fields.insert("otp".into(), Value::String(otp.clone()));
    fields.insert("expires".into(), Value::from(expires));
    state.db().add(OTPS, fields).await?;

    Ok(Json(SendOtpResponse { ok: true, otp }))
}

pub async fn verify_otp_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    let (Some(phone), Some(otp)) = (non_blank(request.phone), non_blank(request.otp)) else {
        return Err(AppError::bad_request("phone and otp required"));
    };

    let now = state.now_millis();
    let matched = state
        .db()
        .find(OTPS, |record| {
            record.get_str("phone") == Some(phone.as_str())
                && record.get_str("otp") == Some(otp.as_str())
                && record
                    .get("expires")
                    .and_then(Value::as_i64)
                    .is_some_and(|expires| expires > now)
        })
        .await?;
    if matched.is_none() {
        return Err(AppError::unauthorized("invalid or expired otp"));
    }

    let existing = state
        .db()
        .find(USERS, |user| user.get_str("phone") == Some(phone.as_str()))
        .await?;
    let user = match existing {
        Some(user) => user,
        None => {
            let mut fields = Fields::new();
            fields.insert("phone".into(), Value::String(phone));
            fields.insert("name".into(), Value::String(DEFAULT_USER_NAME.to_owned()));
            let user = state.db().add(USERS, fields).await?;
            info!(user_id = ?user.id(), "user created from otp sign-in");
            user
        }
    };

    Ok(Json(VerifyOtpResponse {
        ok: true,
        user: public_user(user),
    }))
}
