//! 诊所接口

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::extract::{AppJson, AppPath};
use super::{created, ok, ApiResponse};
use crate::domains::clinics::{ClinicRequest, ClinicStats};
use crate::error::AppResult;
use crate::storage::Clinic;
use crate::AppState;

pub async fn add_clinic(
    State(state): State<AppState>,
    AppJson(req): AppJson<ClinicRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Clinic>>)> {
    let clinic = state.clinics.add_clinic(req).await?;
    Ok(created("Clinic added", clinic))
}

pub async fn list_clinics(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Clinic>>>> {
    let clinics = state.clinics.list_clinics().await?;
    Ok(ok("Clinics retrieved", clinics))
}

pub async fn get_clinic_by_name(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> AppResult<Json<ApiResponse<Clinic>>> {
    let clinic = state.clinics.get_clinic_by_name(&name).await?;
    Ok(ok("Clinic retrieved", clinic))
}

pub async fn update_clinic(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<ClinicRequest>,
) -> AppResult<Json<ApiResponse<Clinic>>> {
    let clinic = state.clinics.update_clinic(id, req).await?;
    Ok(ok("Clinic updated", clinic))
}

pub async fn delete_clinic(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<i64>>> {
    state.clinics.delete_clinic(id).await?;
    Ok(ok("Clinic deleted", id))
}

pub async fn disease_stats(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ClinicStats>>>> {
    let stats = state.clinics.disease_stats().await?;
    Ok(ok("Clinic disease statistics", stats))
}
