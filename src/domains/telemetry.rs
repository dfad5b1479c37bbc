// 遥测领域管理器
//
// 负责智能眼镜样本的写入和日统计查询

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::{compute_daily_statistics, normalize_reading, TelemetryStatistics};
use crate::error::{AppError, AppResult};
use crate::models::TelemetryConfig;
use crate::storage::{utc_day_bounds, DatabaseRepository, SmartGlassesSample};
use crate::utils::{parse_date, validate_id};

/// 设备上报的样本，0 表示未测量
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordSampleRequest {
    pub user_id: Option<i64>,
    pub posture_angle: Option<f64>,
    pub eye_strain: Option<f64>,
}

/// 日统计查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsQuery {
    pub user_id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
}

/// 遥测领域管理器
#[derive(Clone)]
pub struct TelemetryDomain {
    repo: Arc<dyn DatabaseRepository>,
    config: TelemetryConfig,
}

impl TelemetryDomain {
    /// 创建新的遥测领域管理器
    pub fn new(repo: Arc<dyn DatabaseRepository>, config: TelemetryConfig) -> Self {
        Self { repo, config }
    }

    /// 确定受试者：请求未指定时使用配置中的默认受试者
    async fn resolve_subject(&self, user_id: Option<i64>) -> AppResult<i64> {
        let subject = user_id
            .or(self.config.default_subject_id)
            .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
        validate_id("user_id", subject)?;

        if self.repo.get_user(subject).await?.is_none() {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        Ok(subject)
    }

    /// 写入一条样本，时间戳取服务器当前时间
    pub async fn record_sample(&self, req: RecordSampleRequest) -> AppResult<SmartGlassesSample> {
        let user_id = self.resolve_subject(req.user_id).await?;

        let mut sample = SmartGlassesSample {
            id: None,
            user_id,
            posture_angle: normalize_reading(req.posture_angle),
            eye_strain: normalize_reading(req.eye_strain),
            timestamp: Utc::now(),
        };
        sample.id = Some(self.repo.insert_smart_glasses_sample(&sample).await?);

        debug!(
            "写入遥测样本 {:?}: user={}, angle={:?}, signal={:?}",
            sample.id, user_id, sample.posture_angle, sample.eye_strain
        );
        Ok(sample)
    }

    /// 查询受试者某天（UTC）的统计结果
    pub async fn statistics(&self, query: StatisticsQuery) -> AppResult<TelemetryStatistics> {
        let day = parse_date(query.date.as_deref().unwrap_or_default())?;
        let user_id = self.resolve_subject(query.user_id).await?;

        let (start, end) = utc_day_bounds(day);
        let samples = self
            .repo
            .get_smart_glasses_samples(user_id, start, end)
            .await?;

        let stats = compute_daily_statistics(&samples, day, &self.config);
        info!(
            "用户 {} 在 {} 的统计: {} 个样本, {:?}",
            user_id,
            day,
            samples.len(),
            stats
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::test_support::{open_repo, seed_user};
    use chrono::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_record_maps_zero_to_missing() {
        let temp_dir = tempdir().unwrap();
        let repo = open_repo(&temp_dir).await;
        let user_id = seed_user(repo.as_ref(), "patient", "glasses@example.com").await;
        let telemetry = TelemetryDomain::new(repo, TelemetryConfig::default());

        let sample = telemetry
            .record_sample(RecordSampleRequest {
                user_id: Some(user_id),
                posture_angle: Some(0.0),
                eye_strain: Some(250.0),
            })
            .await
            .unwrap();
        assert_eq!(sample.posture_angle, None);
        assert_eq!(sample.eye_strain, Some(250.0));
    }

    #[tokio::test]
    async fn test_subject_resolution() {
        let temp_dir = tempdir().unwrap();
        let repo = open_repo(&temp_dir).await;
        let user_id = seed_user(repo.as_ref(), "patient", "subject@example.com").await;

        let no_default = TelemetryDomain::new(repo.clone(), TelemetryConfig::default());
        assert!(matches!(
            no_default.record_sample(RecordSampleRequest::default()).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            no_default
                .record_sample(RecordSampleRequest {
                    user_id: Some(5555),
                    ..Default::default()
                })
                .await,
            Err(AppError::NotFound(_))
        ));

        let with_default = TelemetryDomain::new(
            repo,
            TelemetryConfig {
                default_subject_id: Some(user_id),
                ..TelemetryConfig::default()
            },
        );
        let sample = with_default
            .record_sample(RecordSampleRequest {
                posture_angle: Some(12.0),
                eye_strain: Some(300.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(sample.user_id, user_id);
    }

    #[tokio::test]
    async fn test_statistics_over_stored_samples() {
        let temp_dir = tempdir().unwrap();
        let repo = open_repo(&temp_dir).await;
        let user_id = seed_user(repo.as_ref(), "patient", "stats@example.com").await;
        let telemetry = TelemetryDomain::new(repo.clone(), TelemetryConfig::default());

        let day = chrono::NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let (start, _) = utc_day_bounds(day);
        let t0 = start + Duration::hours(9);
        for (offset, angle) in [(0, 50.0), (10, 50.0), (15, 10.0)] {
            repo.insert_smart_glasses_sample(&SmartGlassesSample {
                id: None,
                user_id,
                posture_angle: Some(angle),
                eye_strain: Some(500.0),
                timestamp: t0 + Duration::seconds(offset),
            })
            .await
            .unwrap();
        }

        let stats = telemetry
            .statistics(StatisticsQuery {
                user_id: Some(user_id),
                date: Some("2024-12-01".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(stats.time_head_tilt_exceeds_threshold, 15.0);
        assert_eq!(stats.time_low_signal, 0.0);

        let other_day = telemetry
            .statistics(StatisticsQuery {
                user_id: Some(user_id),
                date: Some("2024-12-02".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(other_day, TelemetryStatistics::default());

        let bad_date = telemetry
            .statistics(StatisticsQuery {
                user_id: Some(user_id),
                date: Some("01/12/2024".to_string()),
            })
            .await;
        assert!(matches!(bad_date, Err(AppError::Format(_))));
    }
}
