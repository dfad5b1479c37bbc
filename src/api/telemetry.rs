//! 智能眼镜接口

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::extract::{AppJson, AppQuery};
use super::{created, ok, ApiResponse};
use crate::analysis::TelemetryStatistics;
use crate::domains::telemetry::{RecordSampleRequest, StatisticsQuery};
use crate::error::AppResult;
use crate::storage::SmartGlassesSample;
use crate::AppState;

pub async fn record_sample(
    State(state): State<AppState>,
    AppJson(req): AppJson<RecordSampleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SmartGlassesSample>>)> {
    let sample = state.telemetry.record_sample(req).await?;
    Ok(created("Data recorded", sample))
}

pub async fn statistics(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StatisticsQuery>,
) -> AppResult<Json<ApiResponse<TelemetryStatistics>>> {
    let stats = state.telemetry.statistics(query).await?;
    Ok(ok("Statistics computed", stats))
}
