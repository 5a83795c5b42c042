// ==========================================
// 中润设备日报系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与报表类型
// 红线: 不含数据访问逻辑,不含渲染逻辑
// ==========================================

pub mod device;
pub mod record;
pub mod report;

// 重导出核心类型
pub use device::ResolvedDevice;
pub use record::{duplicate_dates, DailyUsageRow, InventoryRecord, RefuelingEvent, StatementRow};
pub use report::{
    DeviceOmission, OmissionReason, ReportArtifact, ReportOutcome, ReportRequest, ReportType,
    RequestError,
};
