//! 工具函数模块
//!
//! 提供各类通用工具函数，包括：
//! - 输入验证
//! - 时间字符串解析
//! - 密码哈希

pub mod password;
pub mod time_parser;
pub mod validation;

// 重新导出常用函数
pub use password::*;
pub use time_parser::*;
pub use validation::*;
