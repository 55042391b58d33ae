use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// Session token claims. `sub` is the username, `jti` identifies the
/// session so it can be revoked on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub username: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub logged_in: bool,
    pub username: String,
}

// -- Advice --

#[derive(Debug, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub report_id: i64,
    pub advice: String,
}

// -- Reports --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: i64,
    pub username: String,
    pub report: String,
    pub created_at: String,
}
