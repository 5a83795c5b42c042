// ==========================================
// 中润设备日报系统 - 配置层
// ==========================================

pub mod app_config;

pub use app_config::{
    default_key_path, AppConfig, ChartStyle, ConfigError, DatabaseSettings, SqlTemplates,
};
