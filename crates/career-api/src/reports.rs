use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, info, warn};

use career_db::models::{DeleteOutcome, ReportRow};
use career_types::api::ReportResponse;

use crate::auth::AppState;
use crate::session::Session;

fn to_response(row: ReportRow) -> ReportResponse {
    ReportResponse {
        id: row.id,
        username: row.username,
        report: row.report,
        created_at: row.created_at,
    }
}

/// File name offered when a report is downloaded.
pub fn download_filename(report_id: i64) -> String {
    format!("career_report_{}.txt", report_id)
}

/// GET /reports — the caller's reports, newest first.
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let owner = session.current_user().to_string();
    let rows = tokio::task::spawn_blocking(move || st.db.get_reports_for_user(&owner))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("DB get_reports_for_user error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    let reports: Vec<ReportResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(reports))
}

/// GET /reports/{report_id}/download — the report body as a plain-text
/// attachment.
pub async fn download_report(
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let row = tokio::task::spawn_blocking(move || st.db.get_report(report_id))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("DB get_report error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .ok_or(StatusCode::NOT_FOUND)?;

    if row.username != session.current_user() {
        warn!("{} tried to download report {} owned by {}", session.current_user(), report_id, row.username);
        return Err(StatusCode::FORBIDDEN);
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_filename(report_id)),
            ),
        ],
        row.report,
    ))
}

/// DELETE /reports/{report_id} — remove one of the caller's reports.
/// Unknown ids succeed; other users' reports are refused.
pub async fn delete_report(
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
    Extension(session): Extension<Session>,
) -> Result<StatusCode, StatusCode> {
    let requester = session.current_user();

    let st = state.clone();
    let owner = requester.to_string();
    let outcome = tokio::task::spawn_blocking(move || st.db.delete_report(report_id, &owner))
        .await
        .map_err(|e| { error!("spawn_blocking join error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?
        .map_err(|e| { error!("DB delete_report error: {}", e); StatusCode::INTERNAL_SERVER_ERROR })?;

    match outcome {
        DeleteOutcome::Deleted => {
            info!("Report {} deleted by {}", report_id, requester);
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteOutcome::Missing => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Forbidden => {
            warn!("{} tried to delete report {} they do not own", requester, report_id);
            Err(StatusCode::FORBIDDEN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_report_id() {
        assert_eq!(download_filename(42), "career_report_42.txt");
    }
}
