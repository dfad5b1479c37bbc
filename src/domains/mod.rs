// 领域模块 - 用于组织应用的业务逻辑
//
// 每个领域管理器持有注入的数据库仓库，不依赖全局连接
// 包含5个领域:账户、诊所、预约、病历、遥测

pub mod accounts;
pub mod booking;
pub mod clinics;
pub mod records;
pub mod telemetry;

pub use accounts::AccountsDomain;
pub use booking::BookingDomain;
pub use clinics::ClinicsDomain;
pub use records::RecordsDomain;
pub use telemetry::TelemetryDomain;
