use asan_storage::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendOtpRequest {
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct SendOtpResponse {
    pub ok: bool,
    /// Returned for development clients; there is no SMS delivery.
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: Option<String>,
    pub otp: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub ok: bool,
    pub user: Record,
}
