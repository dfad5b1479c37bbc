// 病历领域管理器
//
// 负责疾病记录的创建、修改、删除，以及按预约查询病历

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::DiseaseStatus;
use crate::storage::{DatabaseRepository, Disease};
use crate::utils::{require_text, validate_id};

/// 新增/修改疾病记录请求，修改时未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiseaseRequest {
    pub appointment_id: Option<i64>,
    pub disease_name: Option<String>,
    pub description: Option<String>,
    /// RFC 3339，缺省为当前时间
    pub diagnosis_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

fn parse_status(raw: Option<&str>) -> AppResult<Option<DiseaseStatus>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => DiseaseStatus::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("invalid status: {}", value))),
        None => Ok(None),
    }
}

/// 病历领域管理器
#[derive(Clone)]
pub struct RecordsDomain {
    repo: Arc<dyn DatabaseRepository>,
}

impl RecordsDomain {
    /// 创建新的病历领域管理器
    pub fn new(repo: Arc<dyn DatabaseRepository>) -> Self {
        Self { repo }
    }

    async fn ensure_appointment(&self, appointment_id: i64) -> AppResult<()> {
        validate_id("appointment_id", appointment_id)?;
        if self.repo.get_appointment(appointment_id).await?.is_none() {
            return Err(AppError::NotFound("appointment not found".to_string()));
        }
        Ok(())
    }

    /// 新增疾病记录
    pub async fn create_disease(&self, req: DiseaseRequest) -> AppResult<Disease> {
        let disease_name = require_text("disease_name", req.disease_name.as_deref())?;
        let status = parse_status(req.status.as_deref())?.unwrap_or_default();

        if let Some(appointment_id) = req.appointment_id {
            self.ensure_appointment(appointment_id).await?;
        }

        let mut disease = Disease {
            id: None,
            appointment_id: req.appointment_id,
            disease_name: disease_name.to_string(),
            description: req.description.unwrap_or_default(),
            diagnosis_date: req.diagnosis_date.unwrap_or_else(Utc::now),
            status: status.as_str().to_string(),
        };
        disease.id = Some(self.repo.insert_disease(&disease).await?);

        info!(
            "新增疾病记录 {:?}: {} (预约 {:?})",
            disease.id, disease.disease_name, disease.appointment_id
        );
        Ok(disease)
    }

    /// 修改疾病记录
    pub async fn update_disease(&self, disease_id: i64, req: DiseaseRequest) -> AppResult<Disease> {
        validate_id("disease_id", disease_id)?;
        let mut disease = self
            .repo
            .get_disease(disease_id)
            .await?
            .ok_or_else(|| AppError::NotFound("disease not found".to_string()))?;

        if let Some(appointment_id) = req.appointment_id {
            self.ensure_appointment(appointment_id).await?;
            disease.appointment_id = Some(appointment_id);
        }
        if let Some(name) = req.disease_name.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            disease.disease_name = name.to_string();
        }
        if let Some(description) = req.description {
            disease.description = description;
        }
        if let Some(diagnosis_date) = req.diagnosis_date {
            disease.diagnosis_date = diagnosis_date;
        }
        if let Some(status) = parse_status(req.status.as_deref())? {
            disease.status = status.as_str().to_string();
        }

        self.repo.update_disease(&disease).await?;
        info!("疾病记录已更新: id={}", disease_id);
        Ok(disease)
    }

    /// 删除疾病记录
    pub async fn delete_disease(&self, disease_id: i64) -> AppResult<()> {
        validate_id("disease_id", disease_id)?;
        if self.repo.delete_disease(disease_id).await? == 0 {
            return Err(AppError::NotFound("disease not found".to_string()));
        }
        info!("疾病记录已删除: id={}", disease_id);
        Ok(())
    }

    /// 获取预约的病历
    pub async fn medical_record(&self, appointment_id: i64) -> AppResult<Vec<Disease>> {
        validate_id("appointment_id", appointment_id)?;
        let diseases = self.repo.get_diseases_by_appointment(appointment_id).await?;
        if diseases.is_empty() {
            return Err(AppError::NotFound("no medical records found".to_string()));
        }
        Ok(diseases)
    }
}
