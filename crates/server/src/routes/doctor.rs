//! Doctor-facing views over assigned patients.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::User;
use services::services::stats::{self, MoodSummary, StatsService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    routes::stats::WindowQuery,
    state::AppState,
};

pub async fn list_patients(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    user.require_doctor()?;
    let patients = User::find_patients_of(&state.db.pool, user.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(patients)))
}

pub async fn patient_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<WindowQuery>,
) -> Result<ResponseJson<ApiResponse<MoodSummary>>, ApiError> {
    user.require_doctor()?;

    let patient = User::find_by_id(&state.db.pool, patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("patient not found".to_string()))?;
    if patient.doctor_id != Some(user.user_id) {
        return Err(ApiError::Forbidden);
    }

    let (from, to) = stats::window(query.days);
    let summary = StatsService::summary(&state.db.pool, patient_id, from, to).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub async fn assign_patient(
    State(state): State<AppState>,
    user: AuthUser,
    Path(patient_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    user.require_doctor()?;

    let assigned = User::assign_doctor(&state.db.pool, patient_id, user.user_id).await?;
    if assigned == 0 {
        // Missing, not a patient, or already claimed by someone.
        return Err(ApiError::Conflict(
            "patient not found or already assigned".to_string(),
        ));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/doctor/patients",
        Router::new()
            .route("/", get(list_patients))
            .route("/{id}/summary", get(patient_summary))
            .route("/{id}/assign", post(assign_patient)),
    )
}
