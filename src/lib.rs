// 骨科诊所预约与智能眼镜遥测服务 - 主库

// 声明模块
pub mod analysis;
pub mod api;
pub mod domains;
pub mod error;
pub mod logger;
pub mod models;
pub mod settings;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

use domains::{AccountsDomain, BookingDomain, ClinicsDomain, RecordsDomain, TelemetryDomain};
use models::TelemetryConfig;
use settings::SettingsManager;
use storage::{Database, DatabaseRepository};

/// 应用状态（按领域分组）
///
/// 每个领域管理器持有同一个数据库仓库
/// - 账户领域：注册、登录、用户管理
/// - 诊所领域：诊所管理和疾病统计
/// - 预约领域：医生时段和预约
/// - 病历领域：疾病记录
/// - 遥测领域：智能眼镜样本和统计
#[derive(Clone)]
pub struct AppState {
    /// 账户领域管理器
    pub accounts: Arc<AccountsDomain>,
    /// 诊所领域管理器
    pub clinics: Arc<ClinicsDomain>,
    /// 预约领域管理器
    pub booking: Arc<BookingDomain>,
    /// 病历领域管理器
    pub records: Arc<RecordsDomain>,
    /// 遥测领域管理器
    pub telemetry: Arc<TelemetryDomain>,
    /// 数据库仓库（健康检查用）
    pub repo: Arc<dyn DatabaseRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn DatabaseRepository>, telemetry: TelemetryConfig) -> Self {
        Self {
            accounts: Arc::new(AccountsDomain::new(repo.clone())),
            clinics: Arc::new(ClinicsDomain::new(repo.clone())),
            booking: Arc::new(BookingDomain::new(repo.clone())),
            records: Arc::new(RecordsDomain::new(repo.clone())),
            telemetry: Arc::new(TelemetryDomain::new(repo.clone(), telemetry)),
            repo,
        }
    }
}

/// 构建带状态的路由
pub fn build_router(state: AppState) -> Router {
    api::router().with_state(state)
}

/// 启动服务：加载配置、初始化日志、连接数据库、监听端口
pub async fn run() -> Result<()> {
    let settings = SettingsManager::from_env().await?;
    let config = settings.get().clone();

    // guard 必须存活到进程结束
    let _log_guard = logger::init(&config.logging)?;
    info!("配置文件: {:?}", settings.path());

    let repo = Database::from_config(&config.database).await?;
    let state = AppState::new(repo, config.telemetry.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("无法监听地址: {}", config.server.bind_addr))?;
    info!("HTTP 服务已启动: {}", config.server.bind_addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("收到退出信号，正在关闭服务");
        })
        .await
        .context("HTTP 服务异常退出")?;

    Ok(())
}
