// ==========================================
// 中润设备日报系统 - 数据仓储层
// ==========================================
// 职责: 数据访问
// 红线: Repository 不含业务逻辑，不含渲染逻辑
// ==========================================

pub mod device_repo;
pub mod error;
pub mod query;
pub mod record_repo;

pub use device_repo::DeviceRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use query::{QueryExecutor, Row, SqliteExecutor};
pub use record_repo::RecordRepository;
