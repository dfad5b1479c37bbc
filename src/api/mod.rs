//! HTTP 接口模块
//!
//! 将领域管理器暴露为 REST 接口，按功能分组：
//! - accounts: 注册、登录、用户管理
//! - clinics: 诊所管理和疾病统计
//! - booking: 医生时段和预约
//! - records: 疾病记录和病历
//! - telemetry: 智能眼镜样本和日统计

pub mod accounts;
pub mod booking;
pub mod clinics;
pub mod extract;
pub mod records;
pub mod telemetry;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

/// 成功响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

/// 200 响应
pub fn ok<T: Serialize>(message: &str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        message: message.to_string(),
        data,
    })
}

/// 201 响应
pub fn created<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(message, data))
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    database: String,
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    ok(
        "ok",
        HealthStatus {
            status: "up",
            database: state.repo.db_type().to_string(),
        },
    )
}

/// 构建全部路由
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // 账户
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/users/:id", put(accounts::update_user))
        .route("/admin/users/:id", delete(accounts::delete_user))
        // 诊所（GET 按名称，PUT/DELETE 按数字 ID）
        .route(
            "/admin/clinics",
            post(clinics::add_clinic).get(clinics::list_clinics),
        )
        .route(
            "/admin/clinics/:clinic",
            get(clinics::get_clinic_by_name)
                .put(clinics::update_clinic)
                .delete(clinics::delete_clinic),
        )
        .route("/clinic-stats", get(clinics::disease_stats))
        // 医生时段
        .route(
            "/doctor/:doctor_id/appointment_times",
            post(booking::offer_slot).get(booking::list_doctor_slots),
        )
        .route(
            "/doctor/:doctor_id/appointment_times/:appointment_time_id",
            put(booking::edit_slot).delete(booking::delete_slot),
        )
        .route("/appointment-times/search", get(booking::search_slots))
        // 预约
        .route("/appointments", post(booking::book))
        .route("/appointments/:id", delete(booking::cancel))
        .route("/appointments/:id/status", put(booking::update_status))
        .route(
            "/appointments/patient/:patient_id",
            get(booking::list_by_patient),
        )
        // 病历
        .route("/diseases", post(records::create_disease))
        .route(
            "/diseases/:id",
            put(records::update_disease).delete(records::delete_disease),
        )
        .route("/medical-record/:appointment_id", get(records::medical_record))
        // 智能眼镜
        .route("/smart-glasses", post(telemetry::record_sample))
        .route("/smart-glasses/statistics", get(telemetry::statistics))
}
