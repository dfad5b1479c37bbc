//! 输入验证工具函数
//!
//! 请求体中的必填字段和路径参数在进入领域逻辑前统一在这里检查

use crate::error::AppError;

/// 验证实体 ID 是否有效
///
/// # 参数
/// - `field`: 字段名（用于错误信息）
/// - `id`: 待验证的 ID
///
/// # 返回
/// - `Ok(())`: 验证通过
/// - `Err(AppError::Validation)`: ID 非正数
pub fn validate_id(field: &str, id: i64) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::Validation(format!("invalid {}: {}", field, id)));
    }
    Ok(())
}

/// 取出必填的 ID 字段
pub fn require_id(field: &str, id: Option<i64>) -> Result<i64, AppError> {
    let id = id.ok_or_else(|| AppError::Validation(format!("{} is required", field)))?;
    validate_id(field, id)?;
    Ok(id)
}

/// 取出必填的文本字段，去除首尾空白后不能为空
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}
