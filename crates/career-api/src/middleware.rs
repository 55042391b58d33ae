use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::error;
use uuid::Uuid;

use career_types::api::Claims;

use crate::auth::AppState;
use crate::session::Session;

/// Sessions last 30 days unless revoked by logout.
const SESSION_DAYS: i64 = 30;

pub fn create_token(secret: &str, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        jti: Uuid::new_v4(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Extract and validate JWT from Authorization header, reject revoked
/// sessions, and attach the logged-in [`Session`] plus its [`Claims`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = decode_token(&state.jwt_secret, token).ok_or(StatusCode::UNAUTHORIZED)?;

    let st = state.clone();
    let jti = claims.jti.to_string();
    let revoked = tokio::task::spawn_blocking(move || st.db.is_session_revoked(&jti))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("Revocation lookup failed: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;
    if revoked {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let mut session = Session::new();
    session.log_in(claims.sub.clone());

    req.extensions_mut().insert(session);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
