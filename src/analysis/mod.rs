//! 遥测分析模块
//!
//! 纯计算逻辑，不访问数据库：
//! - 智能眼镜日统计（头部倾斜、光照过低、光照过高的持续时间）

pub mod posture_stats;

// 重新导出常用结构体和函数
pub use posture_stats::*;
