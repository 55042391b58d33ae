use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, info, warn};

use career_advisor::AdviceGenerator;
use career_db::Database;
use career_types::api::{
    AuthResponse, Claims, LoginRequest, RegisterRequest, ResetPasswordRequest, SessionResponse,
};

use crate::credentials;
use crate::middleware::create_token;
use crate::session::Session;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub advisor: AdviceGenerator,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if is_blank(&req.username) || is_blank(&req.email) || req.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // Hashing is CPU-bound; keep it and the write off the async runtime
    let st = state.clone();
    let username = req.username.clone();
    tokio::task::spawn_blocking(move || {
        credentials::register(&st.db, &username, &req.email, &req.password)
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
    .map_err(|e| { error!("Register failed: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    let token = create_token(&state.jwt_secret, &req.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            username: req.username,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let username = req.username.clone();
    let user = tokio::task::spawn_blocking(move || {
        credentials::authenticate(&st.db, &username, &req.password)
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
    .map_err(|e| { error!("Login lookup failed: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    let Some(user) = user else {
        warn!("Failed login for {}", req.username);
        return Err(StatusCode::UNAUTHORIZED);
    };

    let token = create_token(&state.jwt_secret, &user.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    info!("{} logged in", user.username);
    Ok(Json(AuthResponse {
        username: user.username,
        token,
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode, StatusCode> {
    if is_blank(&req.username) || req.new_password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    tokio::task::spawn_blocking(move || {
        credentials::reset_password(&state.db, &req.username, &req.new_password)
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
    .map_err(|e| { error!("Password reset failed: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(mut session): Extension<Session>,
) -> Result<Json<SessionResponse>, StatusCode> {
    let st = state.clone();
    tokio::task::spawn_blocking(move || {
        st.db.revoke_session(&claims.jti.to_string(), claims.exp as i64)?;

        // Housekeeping: revocations past their token's expiry are dead weight
        if let Err(e) = st.db.prune_revoked_sessions(chrono::Utc::now().timestamp()) {
            warn!("Pruning revoked sessions failed: {}", e);
        }
        Ok::<_, anyhow::Error>(())
    })
    .await
    .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
    .map_err(|e| { error!("Revoking session failed: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    info!("{} logged out", session.current_user());
    session.log_out();
    Ok(session_response(&session))
}

fn session_response(session: &Session) -> Json<SessionResponse> {
    Json(SessionResponse {
        logged_in: session.is_logged_in(),
        username: session.current_user().to_string(),
    })
}

pub async fn current_session(Extension(session): Extension<Session>) -> Json<SessionResponse> {
    session_response(&session)
}
