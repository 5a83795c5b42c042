// ==========================================
// 中润设备日报系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + Excel 模板渲染
// 系统定位: 周期性运营报表生成引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 报表编排
pub mod engine;

// 渲染层 - Excel 产物生成
pub mod render;

// 凭据加密仓
pub mod vault;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DailyUsageRow, DeviceOmission, InventoryRecord, OmissionReason, RefuelingEvent,
    ReportArtifact, ReportOutcome, ReportRequest, ReportType, RequestError, ResolvedDevice,
    StatementRow,
};

// 引擎
pub use engine::{ReportError, ReportOrchestrator, ReportResult};

// 渲染器
pub use render::{
    CustomerStatement, InventoryRenderer, RefuelingRenderer, RenderError, StatementRenderer,
};

// 仓储
pub use repository::{
    DeviceRepository, QueryExecutor, RecordRepository, RepositoryError, SqliteExecutor,
};

// 凭据
pub use vault::{CredentialVault, KeyStore, VaultError};

// 配置
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "中润设备日报系统";
