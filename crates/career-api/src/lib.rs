pub mod advice;
pub mod auth;
pub mod credentials;
pub mod middleware;
pub mod reports;
pub mod session;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::auth::AppState;
use crate::middleware::require_auth;

/// Build the full route table. Layers such as tracing and CORS are added by
/// the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::current_session))
        .route("/advice", post(advice::generate_advice))
        .route("/reports", get(reports::list_reports))
        .route("/reports/{report_id}", delete(reports::delete_report))
        .route("/reports/{report_id}/download", get(reports::download_report))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// GET /health — liveness check (no auth).
pub async fn health() -> &'static str {
    "ok"
}
