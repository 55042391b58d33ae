use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, warn};

use career_advisor::AdvisorError;
use career_types::api::AdviceResponse;
use career_types::models::Profile;

use crate::auth::AppState;
use crate::session::Session;

fn status_for(e: &AdvisorError) -> StatusCode {
    match e {
        AdvisorError::Busy { .. } => StatusCode::CONFLICT,
        AdvisorError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        AdvisorError::MissingApiKey | AdvisorError::InvalidApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        AdvisorError::Transport(_) | AdvisorError::Status { .. } | AdvisorError::EmptyResponse => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// POST /advice — generate advice for the submitted profile and store it as
/// a report for the current user. Nothing is stored if generation fails.
pub async fn generate_advice(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(profile): Json<Profile>,
) -> Result<impl IntoResponse, StatusCode> {
    if !profile.has_skills() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let username = session.current_user().to_string();

    let advice = state.advisor.generate(&username, &profile).await.map_err(|e| {
        match &e {
            AdvisorError::Busy { .. } => warn!("{}", e),
            _ => error!("Advice generation for {} failed: {}", username, e),
        }
        status_for(&e)
    })?;

    let st = state.clone();
    let owner = username.clone();
    let body = advice.clone();
    let report_id = tokio::task::spawn_blocking(move || st.db.insert_report(&owner, &body))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("DB insert_report error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    Ok((StatusCode::CREATED, Json(AdviceResponse { report_id, advice })))
}
