// ==========================================
// 中润设备日报系统 - 模板渲染层
// ==========================================
// 职责: 聚合行 -> 样式化多工作表 Excel 产物
// 红线: 写盘先落临时文件，成功后原子改名；失败不留半成品
// ==========================================

pub mod artifact;
pub mod inventory;
pub mod refueling;
pub mod statement;

use std::path::PathBuf;
use thiserror::Error;

/// 客户信息缺失时的展示兜底文案
pub const UNKNOWN_CUSTOMER: &str = "未知客户";

/// 油品信息缺失时的展示兜底文案
pub const UNKNOWN_OIL: &str = "未知油品";

/// 渲染层错误类型
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("模板不可用: {0}")]
    TemplateUnavailable(PathBuf),

    #[error("模板缺少工作表: {0}")]
    MissingSheet(String),

    #[error("工作簿读写失败: {0}")]
    Workbook(String),

    #[error("产物校验失败: {0}")]
    ArtifactInvalid(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type RenderResult<T> = Result<T, RenderError>;

pub use inventory::InventoryRenderer;
pub use refueling::RefuelingRenderer;
pub use statement::{CustomerStatement, StatementRenderer};
