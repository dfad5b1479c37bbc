use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::AppConfig;

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "ORTHO_VISION_CONFIG";

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/ortho-vision.json";

pub struct SettingsManager {
    path: PathBuf,
    data: AppConfig,
}

impl SettingsManager {
    /// 读取配置文件；文件不存在或为空时写入默认配置
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice::<AppConfig>(&bytes)
                .with_context(|| format!("配置文件格式错误: {:?}", path))?,
            _ => {
                let default = AppConfig::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                info!("已写入默认配置: {:?}", path);
                default
            }
        };

        Ok(Self { path, data })
    }

    /// 按环境变量或默认路径加载
    pub async fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::new(PathBuf::from(path)).await
    }

    pub fn get(&self) -> &AppConfig {
        &self.data
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
