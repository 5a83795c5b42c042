// ==========================================
// 中润设备日报系统 - 引擎层错误类型
// ==========================================
// 传播策略: 单设备失败隔离记录；整批失败（模板缺失、凭据失败）
// 提前中止。对调用方永远是结构化原因，不是裸堆栈。
// ==========================================

use crate::config::ConfigError;
use crate::domain::RequestError;
use crate::render::RenderError;
use crate::repository::RepositoryError;
use crate::vault::VaultError;
use thiserror::Error;

/// 报表引擎错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    /// 批次内所有设备均解析失败（与静默返回空产物列表区分）
    #[error("批次内没有可解析的设备")]
    NoResolvableDevices,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Result 类型别名
pub type ReportResult<T> = Result<T, ReportError>;
