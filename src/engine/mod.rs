// ==========================================
// 中润设备日报系统 - 引擎层
// ==========================================
// 职责: 报表生成流程编排
// ==========================================

pub mod error;
pub mod orchestrator;

pub use error::{ReportError, ReportResult};
pub use orchestrator::ReportOrchestrator;
