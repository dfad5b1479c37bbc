//! 时间字符串解析工具
//!
//! 所有时间统一换算为 UTC 存储和比较：
//! - 创建/编辑时段：`DD.MM.YYYY HH:MM:SS`，按 UTC 解释
//! - 搜索时段：`DD.MM.YYYY HH:MM:SS±HH`，按给定偏移换算为 UTC
//! - 统计日期：`YYYY-MM-DD`

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::error::AppError;

/// 时段时间格式
pub const SLOT_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// 统计日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 零值时间（0001-01-01 00:00:00）视为未填写
fn is_zero_time(naive: &NaiveDateTime) -> bool {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|zero| zero == *naive)
        .unwrap_or(false)
}

/// 解析时段时间 `DD.MM.YYYY HH:MM:SS`（UTC）
pub fn parse_slot_time(value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Format(
            "available_time is required (DD.MM.YYYY HH:MM:SS)".to_string(),
        ));
    }

    let naive = NaiveDateTime::parse_from_str(value, SLOT_TIME_FORMAT).map_err(|_| {
        AppError::Format(format!(
            "invalid available_time '{}', expected DD.MM.YYYY HH:MM:SS",
            value
        ))
    })?;

    if is_zero_time(&naive) {
        return Err(AppError::Format("available_time must not be zero".to_string()));
    }

    Ok(naive.and_utc())
}

/// 解析带小时偏移的搜索时间 `DD.MM.YYYY HH:MM:SS±HH` 并换算为 UTC
///
/// 查询串中未编码的 `+` 会被解码成空格，因此空格也按 `+` 处理
pub fn parse_search_time(value: &str) -> Result<DateTime<Utc>, AppError> {
    static SEARCH_PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = SEARCH_PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}\.\d{2}\.\d{4} \d{2}:\d{2}:\d{2})([+\- ])(\d{2})$").unwrap()
    });

    let invalid = || {
        AppError::Format(format!(
            "invalid available_time '{}', expected DD.MM.YYYY HH:MM:SS±HH",
            value
        ))
    };

    let caps = re.captures(value.trim()).ok_or_else(invalid)?;

    let naive = NaiveDateTime::parse_from_str(&caps[1], SLOT_TIME_FORMAT).map_err(|_| invalid())?;
    let hours: i32 = caps[3].parse().map_err(|_| invalid())?;
    let sign = if &caps[2] == "-" { -1 } else { 1 };

    let offset = FixedOffset::east_opt(sign * hours * 3600).ok_or_else(invalid)?;
    let local = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(invalid)?;

    Ok(local.with_timezone(&Utc))
}

/// 解析统计日期 `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Format("Invalid date format. Use YYYY-MM-DD.".to_string())
    })
}
