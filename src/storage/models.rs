// 数据模型定义 - 数据库实体结构

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 用户数据结构（患者、管理员、医生共用一张表）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: String, // patient, admin, doctor
    pub created_at: DateTime<Utc>,
}

/// 诊所数据结构
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Clinic {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub location: String, // 地理位置描述
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 医生可预约时段
///
/// `is_booked` 仅在有一条预约引用该时段时为 true
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AppointmentTime {
    pub id: Option<i64>,
    pub doctor_id: i64,
    pub clinic_id: i64,
    pub available_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 预约记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: Option<i64>,
    pub appointment_time_id: i64,
    pub patient_id: i64,
    pub status: String, // pending, confirmed, cancelled, completed
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// 疾病（病历）记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Disease {
    pub id: Option<i64>,
    pub appointment_id: Option<i64>,
    pub disease_name: String,
    pub description: String,
    pub diagnosis_date: DateTime<Utc>,
    pub status: String, // active, inactive
}

/// 智能眼镜遥测样本
///
/// 缺失的测量值以 None 存储（NULL 列）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SmartGlassesSample {
    pub id: Option<i64>,
    pub user_id: i64,
    pub posture_angle: Option<f64>,
    pub eye_strain: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// 诊所疾病统计的原始行
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClinicDiseaseCountRow {
    pub clinic_name: String,
    pub disease_name: String,
    pub disease_count: i64,
}

/// 时段的可变字段（编辑时段时使用，None 表示保持不变）
#[derive(Debug, Clone, Default)]
pub struct AppointmentTimeChanges {
    pub available_time: Option<DateTime<Utc>>,
    pub is_booked: Option<bool>,
    pub clinic_id: Option<i64>,
}

/// 预约时段的原子预订结果
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    /// 时段已从可用转为已预订，并创建了预约
    Booked(Appointment),
    /// 时段不存在
    SlotMissing,
    /// 时段已被预订
    AlreadyBooked,
}

/// 原子取消预约的结果
#[derive(Debug, Clone)]
pub enum CancelOutcome {
    /// 预约已删除，时段已释放
    Cancelled(Appointment),
    /// 预约不存在
    AppointmentMissing,
    /// 预约引用的时段不存在
    SlotMissing,
}

/// 计算某天（UTC）的起止时间，区间为 [start, end)
pub fn utc_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}
