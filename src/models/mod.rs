// 数据模型定义 - 应用配置与领域枚举

use serde::{Deserialize, Serialize};

use crate::storage::{DatabaseConfig, User};

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Admin,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Admin => "admin",
            Role::Doctor => "doctor",
        }
    }

    /// 解析角色名（不区分大小写）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "patient" => Some(Role::Patient),
            "admin" => Some(Role::Admin),
            "doctor" => Some(Role::Doctor),
            _ => None,
        }
    }
}

/// 检查用户是否拥有指定角色
///
/// 所有需要医生/管理员身份的操作都通过这里判断
pub fn has_role(user: &User, role: Role) -> bool {
    user.role == role.as_str()
}

/// 预约状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }
}

/// 疾病记录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseStatus {
    #[default]
    Active,
    Inactive,
}

impl DiseaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseStatus::Active => "active",
            DiseaseStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(DiseaseStatus::Active),
            "inactive" => Some(DiseaseStatus::Inactive),
            _ => None,
        }
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志目录（按天轮转）
    pub log_dir: String,
    /// 日志级别：trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

/// 智能眼镜统计阈值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// 头部倾斜角度阈值（度）
    pub posture_angle_threshold: f64,
    /// 光照过低阈值
    pub low_signal_threshold: f64,
    /// 光照过高阈值
    pub high_signal_threshold: f64,
    /// 请求未指定 user_id 时使用的受试者
    pub default_subject_id: Option<i64>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            posture_angle_threshold: 45.0,
            low_signal_threshold: 100.0,
            high_signal_threshold: 1000.0,
            default_subject_id: None,
        }
    }
}

/// 持久化的应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP 服务
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 日志
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 智能眼镜统计
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(role: &str) -> User {
        User {
            id: Some(1),
            name: "Olena".to_string(),
            email: "olena@example.com".to_string(),
            password_hash: String::new(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_role() {
        let doctor = user_with_role("doctor");
        assert!(has_role(&doctor, Role::Doctor));
        assert!(!has_role(&doctor, Role::Admin));

        let patient = user_with_role("patient");
        assert!(!has_role(&patient, Role::Doctor));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server":{"bind_addr":"127.0.0.1:8080"}}"#).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.telemetry, TelemetryConfig::default());
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"telemetry":{"default_subject_id":4},"logging":{"level":"debug"},"server":{}}"#,
        )
        .unwrap();
        assert_eq!(config.telemetry.default_subject_id, Some(4));
        assert_eq!(config.telemetry.posture_angle_threshold, 45.0);
        assert_eq!(config.telemetry.high_signal_threshold, 1000.0);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.log_dir, "logs");
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_status_serde_names() {
        let status: AppointmentStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(status, AppointmentStatus::Completed);
        assert!(serde_json::from_str::<AppointmentStatus>(r#""unknown""#).is_err());
        assert_eq!(DiseaseStatus::default().as_str(), "active");
        assert_eq!(AppointmentStatus::parse(" Confirmed"), Some(AppointmentStatus::Confirmed));
        assert_eq!(Role::parse("DOCTOR"), Some(Role::Doctor));
        assert_eq!(Role::parse("nurse"), None);
        assert_eq!(DiseaseStatus::parse("inactive"), Some(DiseaseStatus::Inactive));
    }
}
