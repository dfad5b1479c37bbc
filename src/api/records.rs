//! 疾病记录接口

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::extract::{AppJson, AppPath};
use super::{created, ok, ApiResponse};
use crate::domains::records::DiseaseRequest;
use crate::error::AppResult;
use crate::storage::Disease;
use crate::AppState;

pub async fn create_disease(
    State(state): State<AppState>,
    AppJson(req): AppJson<DiseaseRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Disease>>)> {
    let disease = state.records.create_disease(req).await?;
    Ok(created("Disease created", disease))
}

pub async fn update_disease(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<DiseaseRequest>,
) -> AppResult<Json<ApiResponse<Disease>>> {
    let disease = state.records.update_disease(id, req).await?;
    Ok(ok("Disease updated", disease))
}

pub async fn delete_disease(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<i64>>> {
    state.records.delete_disease(id).await?;
    Ok(ok("Disease deleted", id))
}

pub async fn medical_record(
    State(state): State<AppState>,
    AppPath(appointment_id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<Disease>>>> {
    let diseases = state.records.medical_record(appointment_id).await?;
    Ok(ok("Medical record retrieved", diseases))
}
