// 数据库入口 - 根据配置创建具体的仓库实现

use super::config::DatabaseConfig;
use super::repository::{mariadb::MariaDbRepository, sqlite::SqliteRepository, DatabaseRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// 数据库工厂
pub struct Database;

impl Database {
    /// 按配置连接数据库并初始化表结构
    pub async fn from_config(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseRepository>> {
        info!("连接数据库: {}", config.describe());

        let repo: Arc<dyn DatabaseRepository> = match config {
            DatabaseConfig::SQLite { db_path } => Arc::new(SqliteRepository::new(db_path).await?),
            DatabaseConfig::MariaDB {
                host,
                port,
                database,
                username,
                password,
            } => Arc::new(
                MariaDbRepository::new(host, *port, database, username, password).await?,
            ),
        };

        info!("数据库初始化成功，类型: {}", repo.db_type());
        Ok(repo)
    }
}
