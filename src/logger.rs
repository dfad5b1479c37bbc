// 日志系统初始化 - 同时输出到控制台和按天轮转的文件

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::models::LoggingConfig;

/// 解析日志级别，无法识别时回退到 INFO
pub fn parse_level(level: &str) -> tracing::Level {
    tracing::Level::from_str(level.trim()).unwrap_or(tracing::Level::INFO)
}

/// 初始化日志系统
///
/// 返回的 guard 必须在整个程序生命周期内持有，否则文件日志会丢失
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let log_dir = PathBuf::from(&config.log_dir);

    // 创建日志目录
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("无法创建日志目录: {:?}", log_dir))?;

    // 配置日志输出到文件（每天轮转）
    let file_appender = tracing_appender::rolling::daily(log_dir.clone(), "ortho-vision.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 同时输出到控制台和文件
    let writer = std::io::stdout.and(non_blocking);

    // 使用本地时区
    let timer = LocalTime::new(time::format_description::parse(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]",
    )?);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(parse_level(&config.level))
        .with_writer(writer)
        .with_timer(timer)
        .with_ansi(cfg!(debug_assertions)) // release 版本不使用颜色代码
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    eprintln!("日志文件位置: {:?}", log_dir);
    Ok(guard)
}
