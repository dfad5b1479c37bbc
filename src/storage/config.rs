// 存储配置定义

use serde::{Deserialize, Serialize};

/// 数据库配置类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DatabaseConfig {
    /// SQLite 配置
    #[serde(rename = "sqlite")]
    SQLite {
        /// 数据库文件路径
        db_path: String,
    },
    /// MariaDB 配置
    #[serde(rename = "mariadb")]
    MariaDB {
        /// 主机地址
        host: String,
        /// 端口
        port: u16,
        /// 数据库名
        database: String,
        /// 用户名
        username: String,
        /// 密码
        password: String,
    },
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::SQLite {
            db_path: "data/ortho-vision.db".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// 用于日志输出的描述（不包含密码）
    pub fn describe(&self) -> String {
        match self {
            DatabaseConfig::SQLite { db_path } => format!("sqlite:{}", db_path),
            DatabaseConfig::MariaDB {
                host,
                port,
                database,
                username,
                ..
            } => format!("mariadb:{}@{}:{}/{}", username, host, port, database),
        }
    }
}
