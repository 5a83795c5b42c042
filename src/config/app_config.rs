// ==========================================
// 中润设备日报系统 - 应用配置
// ==========================================
// 职责: 配置加载与默认值管理
// 存储: JSON 配置文件（原 query_config.json 布局）
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(PathBuf),

    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件格式错误: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 数据库配置
///
/// `dsn_encrypted` 存在时为密文形态的数据库路径，需经
/// CredentialVault 解密后使用；`path` 为明文路径（开发环境）。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub dsn_encrypted: Option<String>,
}

/// SQL 查询模板集
///
/// 全部使用位置占位符（?1/?2/...），禁止字符串拼接用户输入。
/// 未在配置文件中给出的模板使用默认值。
///
/// 时间窗口边界以 `YYYY-MM-DD HH:MM:SS` 文本形式绑定进 BETWEEN，
/// 默认模板只匹配横杠格式的时间串；存量数据为斜杠格式
/// （`YYYY/MM/DD ...`）的库需在模板内自行归一，例如
/// `replace(order_time, '/', '-')`，行值读取侧两种格式均能解析。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlTemplates {
    /// 主查询: 按 device_code 解析设备
    #[serde(default = "default_device_primary_query")]
    pub device_primary_query: String,

    /// 备用查询: 按历史遗留 device_no 解析设备
    #[serde(default = "default_device_fallback_query")]
    pub device_fallback_query: Option<String>,

    /// 客户名称查询（customer_id -> name）
    #[serde(default = "default_customer_query")]
    pub customer_query: String,

    /// 油品名称查询（device_id -> 最近油品名）
    #[serde(default = "default_oil_name_query")]
    pub oil_name_query: String,

    /// 库存快照查询
    #[serde(default = "default_inventory_query")]
    pub inventory_query: String,

    /// 加注明细查询
    #[serde(default = "default_refueling_query")]
    pub refueling_query: String,

    /// 对账单设备汇总查询（按客户滚总）
    #[serde(default = "default_statement_query")]
    pub statement_query: String,

    /// 每日用量原始数据查询（按客户）
    #[serde(default = "default_daily_usage_query")]
    pub daily_usage_query: String,
}

impl Default for SqlTemplates {
    fn default() -> Self {
        Self {
            device_primary_query: default_device_primary_query(),
            device_fallback_query: default_device_fallback_query(),
            customer_query: default_customer_query(),
            oil_name_query: default_oil_name_query(),
            inventory_query: default_inventory_query(),
            refueling_query: default_refueling_query(),
            statement_query: default_statement_query(),
            daily_usage_query: default_daily_usage_query(),
        }
    }
}

fn default_device_primary_query() -> String {
    "SELECT id, customer_id FROM t_device WHERE device_code = ?1 \
     ORDER BY create_time DESC LIMIT 1"
        .to_string()
}

fn default_device_fallback_query() -> Option<String> {
    Some(
        "SELECT id, customer_id FROM t_device WHERE device_no = ?1 \
         ORDER BY create_time DESC LIMIT 1"
            .to_string(),
    )
}

fn default_customer_query() -> String {
    "SELECT customer_name FROM t_customer WHERE id = ?1".to_string()
}

fn default_oil_name_query() -> String {
    "SELECT oil_name FROM t_order WHERE device_id = ?1 \
     ORDER BY order_time DESC LIMIT 1"
        .to_string()
}

fn default_inventory_query() -> String {
    "SELECT order_time, oil_remaining FROM t_order \
     WHERE device_id = ?1 AND order_time BETWEEN ?2 AND ?3 \
     ORDER BY order_time"
        .to_string()
}

fn default_refueling_query() -> String {
    "SELECT order_time, oil_name, water_value, oil_value, oil_remaining, operator \
     FROM t_order \
     WHERE device_id = ?1 AND order_time BETWEEN ?2 AND ?3 \
     ORDER BY order_time"
        .to_string()
}

fn default_statement_query() -> String {
    "SELECT d.device_code, o.oil_name, SUM(o.oil_value) \
     FROM t_order o JOIN t_device d ON o.device_id = d.id \
     WHERE d.customer_id = ?1 AND o.order_time BETWEEN ?2 AND ?3 \
     GROUP BY d.device_code, o.oil_name \
     ORDER BY d.device_code, o.oil_name"
        .to_string()
}

fn default_daily_usage_query() -> String {
    "SELECT o.order_time, o.oil_name, o.oil_value \
     FROM t_order o JOIN t_device d ON o.device_id = d.id \
     WHERE d.customer_id = ?1 AND o.order_time BETWEEN ?2 AND ?3 \
     ORDER BY o.order_time"
        .to_string()
}

/// 图表样式配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartStyle {
    #[serde(default = "default_marker_style")]
    pub marker_style: String,
    #[serde(default = "default_marker_size")]
    pub marker_size: u8,
    /// RRGGBB 十六进制
    #[serde(default = "default_line_color")]
    pub line_color: String,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            marker_style: default_marker_style(),
            marker_size: default_marker_size(),
            line_color: default_line_color(),
            line_width: default_line_width(),
        }
    }
}

fn default_marker_style() -> String {
    "circle".to_string()
}

fn default_marker_size() -> u8 {
    8
}

fn default_line_color() -> String {
    "0000FF".to_string()
}

fn default_line_width() -> f64 {
    2.5
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub sql_templates: SqlTemplates,

    #[serde(default)]
    pub chart_style: ChartStyle,

    /// 对账单模板路径
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// 产物输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 密钥文件路径（缺省时使用系统数据目录）
    #[serde(default)]
    pub key_path: Option<PathBuf>,
}

fn default_template_path() -> PathBuf {
    PathBuf::from("template/statement_template.xlsx")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// 默认密钥文件路径
///
/// 优先使用系统本地数据目录，拿不到时落到当前目录。
pub fn default_key_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("zr-daily-report").join("secret.key"))
        .unwrap_or_else(|| PathBuf::from("secret.key"))
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// 密钥文件路径（配置优先，否则系统默认）
    pub fn key_path(&self) -> PathBuf {
        self.key_path.clone().unwrap_or_else(default_key_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(config.sql_templates.device_primary_query.contains("device_code"));
        assert!(config
            .sql_templates
            .device_fallback_query
            .as_deref()
            .unwrap()
            .contains("device_no"));
        assert_eq!(config.chart_style.marker_size, 8);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_override() {
        let raw = r#"{
            "database": {"path": "oil.db"},
            "chart_style": {"line_color": "FF0000"}
        }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.database.path, "oil.db");
        assert_eq!(config.chart_style.line_color, "FF0000");
        assert_eq!(config.chart_style.line_width, 2.5);
    }
}
