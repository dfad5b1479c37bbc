// 诊所领域管理器
//
// 负责诊所的增删改查和按诊所的疾病统计

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::storage::{Clinic, ClinicDiseaseCountRow, DatabaseRepository};
use crate::utils::{require_text, validate_id};

/// 新增/修改诊所请求，修改时未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinicRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

/// 单个疾病的病例数
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiseaseCount {
    pub disease: String,
    pub count: i64,
}

/// 一个诊所的疾病统计，保持病例数降序
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClinicStats {
    pub clinic: String,
    pub stats: Vec<DiseaseCount>,
}

/// 将按诊所名排序的原始行分组
pub fn group_disease_stats(rows: Vec<ClinicDiseaseCountRow>) -> Vec<ClinicStats> {
    let mut grouped: Vec<ClinicStats> = Vec::new();

    for row in rows {
        let entry = DiseaseCount {
            disease: row.disease_name,
            count: row.disease_count,
        };
        match grouped.last_mut() {
            Some(last) if last.clinic == row.clinic_name => last.stats.push(entry),
            _ => grouped.push(ClinicStats {
                clinic: row.clinic_name,
                stats: vec![entry],
            }),
        }
    }

    grouped
}

/// 诊所领域管理器
#[derive(Clone)]
pub struct ClinicsDomain {
    repo: Arc<dyn DatabaseRepository>,
}

impl ClinicsDomain {
    /// 创建新的诊所领域管理器
    pub fn new(repo: Arc<dyn DatabaseRepository>) -> Self {
        Self { repo }
    }

    /// 新增诊所
    pub async fn add_clinic(&self, req: ClinicRequest) -> AppResult<Clinic> {
        let name = require_text("name", req.name.as_deref())?;
        let address = require_text("address", req.address.as_deref())?;
        let location = require_text("location", req.location.as_deref())?;

        let now = Utc::now();
        let mut clinic = Clinic {
            id: None,
            name: name.to_string(),
            address: address.to_string(),
            phone: req
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            location: location.to_string(),
            created_at: now,
            updated_at: now,
        };
        clinic.id = Some(self.repo.insert_clinic(&clinic).await?);

        info!("新增诊所: id={:?}, name={}", clinic.id, clinic.name);
        Ok(clinic)
    }

    /// 获取所有诊所
    pub async fn list_clinics(&self) -> AppResult<Vec<Clinic>> {
        Ok(self.repo.get_all_clinics().await?)
    }

    /// 按名称获取诊所
    pub async fn get_clinic_by_name(&self, name: &str) -> AppResult<Clinic> {
        let name = require_text("name", Some(name))?;
        self.repo
            .get_clinic_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound("clinic not found".to_string()))
    }

    /// 按 ID 获取诊所
    pub async fn get_clinic(&self, clinic_id: i64) -> AppResult<Clinic> {
        validate_id("clinic_id", clinic_id)?;
        self.repo
            .get_clinic(clinic_id)
            .await?
            .ok_or_else(|| AppError::NotFound("clinic not found".to_string()))
    }

    /// 修改诊所
    pub async fn update_clinic(&self, clinic_id: i64, req: ClinicRequest) -> AppResult<Clinic> {
        let mut clinic = self.get_clinic(clinic_id).await?;

        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if let Some(name) = non_empty(req.name) {
            clinic.name = name;
        }
        if let Some(address) = non_empty(req.address) {
            clinic.address = address;
        }
        if let Some(phone) = non_empty(req.phone) {
            clinic.phone = Some(phone);
        }
        if let Some(location) = non_empty(req.location) {
            clinic.location = location;
        }
        clinic.updated_at = Utc::now();

        self.repo.update_clinic(&clinic).await?;
        info!("诊所已更新: id={}", clinic_id);
        Ok(clinic)
    }

    /// 删除诊所
    pub async fn delete_clinic(&self, clinic_id: i64) -> AppResult<()> {
        validate_id("clinic_id", clinic_id)?;
        if self.repo.delete_clinic(clinic_id).await? == 0 {
            return Err(AppError::NotFound("clinic not found".to_string()));
        }
        Ok(())
    }

    /// 各诊所的疾病统计
    pub async fn disease_stats(&self) -> AppResult<Vec<ClinicStats>> {
        let rows = self.repo.get_clinic_disease_stats().await?;
        Ok(group_disease_stats(rows))
    }
}
