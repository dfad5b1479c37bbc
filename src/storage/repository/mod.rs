// Repository 抽象层 - 定义数据库操作接口

pub mod mariadb;
pub mod sqlite;

use super::models::*;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 判断错误是否为唯一约束冲突（SQLite 与 MariaDB 通用）
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// 数据库操作接口 - 所有数据库实现必须实现此 trait
///
/// 查找单条记录返回 `Option`，由调用方决定"不存在"的语义
#[async_trait]
pub trait DatabaseRepository: Send + Sync {
    // ========== 用户操作 ==========

    /// 插入新用户
    async fn insert_user(&self, user: &User) -> Result<i64>;

    /// 按 ID 获取用户
    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    /// 按邮箱获取用户
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// 保存用户（整行更新）
    async fn update_user(&self, user: &User) -> Result<()>;

    /// 删除用户，返回删除行数
    async fn delete_user(&self, user_id: i64) -> Result<u64>;

    // ========== 诊所操作 ==========

    /// 插入新诊所
    async fn insert_clinic(&self, clinic: &Clinic) -> Result<i64>;

    /// 按 ID 获取诊所
    async fn get_clinic(&self, clinic_id: i64) -> Result<Option<Clinic>>;

    /// 按名称获取诊所
    async fn get_clinic_by_name(&self, name: &str) -> Result<Option<Clinic>>;

    /// 获取所有诊所
    async fn get_all_clinics(&self) -> Result<Vec<Clinic>>;

    /// 保存诊所（整行更新）
    async fn update_clinic(&self, clinic: &Clinic) -> Result<()>;

    /// 删除诊所，返回删除行数
    async fn delete_clinic(&self, clinic_id: i64) -> Result<u64>;

    /// 按诊所和疾病名统计病例数（按诊所名、数量降序）
    async fn get_clinic_disease_stats(&self) -> Result<Vec<ClinicDiseaseCountRow>>;

    // ========== 预约时段 ==========

    /// 插入新时段
    async fn insert_appointment_time(&self, slot: &AppointmentTime) -> Result<i64>;

    /// 按 ID 获取时段
    async fn get_appointment_time(&self, slot_id: i64) -> Result<Option<AppointmentTime>>;

    /// 获取属于指定医生的时段
    async fn get_doctor_appointment_time(
        &self,
        slot_id: i64,
        doctor_id: i64,
    ) -> Result<Option<AppointmentTime>>;

    /// 获取医生的所有时段
    async fn get_appointment_times_by_doctor(&self, doctor_id: i64)
        -> Result<Vec<AppointmentTime>>;

    /// 按医生和/或精确时间（UTC）搜索时段
    async fn search_appointment_times(
        &self,
        doctor_id: Option<i64>,
        available_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<AppointmentTime>>;

    /// 保存时段（整行更新）
    async fn update_appointment_time(&self, slot: &AppointmentTime) -> Result<()>;

    /// 删除时段，返回删除行数
    async fn delete_appointment_time(&self, slot_id: i64) -> Result<u64>;

    // ========== 预约 ==========

    /// 原子预订：仅当时段可用时将其置为已预订并创建 pending 预约
    async fn book_appointment_time(
        &self,
        slot_id: i64,
        patient_id: i64,
        reason: &str,
    ) -> Result<BookingOutcome>;

    /// 原子取消：释放时段并删除预约
    async fn cancel_appointment(&self, appointment_id: i64) -> Result<CancelOutcome>;

    /// 按 ID 获取预约
    async fn get_appointment(&self, appointment_id: i64) -> Result<Option<Appointment>>;

    /// 获取患者的所有预约
    async fn get_appointments_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>>;

    /// 更新预约状态，返回更新行数
    async fn update_appointment_status(&self, appointment_id: i64, status: &str) -> Result<u64>;

    // ========== 疾病记录 ==========

    /// 插入疾病记录
    async fn insert_disease(&self, disease: &Disease) -> Result<i64>;

    /// 按 ID 获取疾病记录
    async fn get_disease(&self, disease_id: i64) -> Result<Option<Disease>>;

    /// 获取预约的所有疾病记录
    async fn get_diseases_by_appointment(&self, appointment_id: i64) -> Result<Vec<Disease>>;

    /// 保存疾病记录（整行更新）
    async fn update_disease(&self, disease: &Disease) -> Result<()>;

    /// 删除疾病记录，返回删除行数
    async fn delete_disease(&self, disease_id: i64) -> Result<u64>;

    // ========== 智能眼镜遥测 ==========

    /// 插入遥测样本
    async fn insert_smart_glasses_sample(&self, sample: &SmartGlassesSample) -> Result<i64>;

    /// 获取用户在 [start, end) 范围内的样本（按时间升序）
    async fn get_smart_glasses_samples(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SmartGlassesSample>>;

    // ========== 数据库初始化和元数据 ==========

    /// 初始化数据库表结构
    async fn initialize_tables(&self) -> Result<()>;

    /// 获取数据库类型标识
    fn db_type(&self) -> &str;
}
