//! 时段与预约接口

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::extract::{AppJson, AppPath, AppQuery};
use super::{created, ok, ApiResponse};
use crate::domains::booking::{
    BookRequest, EditSlotRequest, OfferSlotRequest, SlotSearchQuery, StatusRequest,
};
use crate::error::AppResult;
use crate::storage::{Appointment, AppointmentTime};
use crate::AppState;

pub async fn offer_slot(
    State(state): State<AppState>,
    AppPath(doctor_id): AppPath<i64>,
    AppJson(req): AppJson<OfferSlotRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AppointmentTime>>)> {
    let slot = state.booking.offer_slot(doctor_id, req).await?;
    Ok(created("Appointment time created", slot))
}

pub async fn list_doctor_slots(
    State(state): State<AppState>,
    AppPath(doctor_id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<AppointmentTime>>>> {
    let slots = state.booking.list_doctor_slots(doctor_id).await?;
    Ok(ok("Appointment times retrieved", slots))
}

pub async fn edit_slot(
    State(state): State<AppState>,
    AppPath((doctor_id, slot_id)): AppPath<(i64, i64)>,
    AppJson(req): AppJson<EditSlotRequest>,
) -> AppResult<Json<ApiResponse<AppointmentTime>>> {
    let slot = state.booking.edit_slot(doctor_id, slot_id, req).await?;
    Ok(ok("Appointment time updated", slot))
}

pub async fn delete_slot(
    State(state): State<AppState>,
    AppPath((doctor_id, slot_id)): AppPath<(i64, i64)>,
) -> AppResult<Json<ApiResponse<i64>>> {
    state.booking.delete_slot(doctor_id, slot_id).await?;
    Ok(ok("Appointment time deleted", slot_id))
}

pub async fn search_slots(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SlotSearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<AppointmentTime>>>> {
    let slots = state.booking.search_slots(query).await?;
    Ok(ok("Appointment times found", slots))
}

pub async fn book(
    State(state): State<AppState>,
    AppJson(req): AppJson<BookRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Appointment>>)> {
    let appointment = state.booking.book(req).await?;
    Ok(created("Appointment created", appointment))
}

pub async fn cancel(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    let appointment = state.booking.cancel(id).await?;
    Ok(ok("Appointment cancelled", appointment))
}

pub async fn update_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<StatusRequest>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    let appointment = state.booking.update_status(id, req).await?;
    Ok(ok("Appointment status updated", appointment))
}

pub async fn list_by_patient(
    State(state): State<AppState>,
    AppPath(patient_id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<Appointment>>>> {
    let appointments = state.booking.list_by_patient(patient_id).await?;
    Ok(ok("Appointments retrieved", appointments))
}
