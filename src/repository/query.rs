// ==========================================
// 中润设备日报系统 - 查询执行能力
// ==========================================
// 职责: execute(模板, 参数) -> 行序列 的统一数据访问口
// 红线: 只接受位置占位符，禁止拼接用户输入
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 一行查询结果
pub type Row = Vec<Value>;

/// 查询执行能力
///
/// 核心各仓储只依赖该接口，不直接依赖具体连接；
/// 测试可用内存实现替换。
pub trait QueryExecutor: Send {
    /// 执行参数化查询，返回全部结果行（可为空）
    fn execute(&self, template: &str, params: &[Value]) -> RepositoryResult<Vec<Row>>;
}

/// SQLite 查询执行器
///
/// 同一报表请求内部可共享连接；不同请求各自持有独立连接
/// （游标有状态，不支持跨请求交错执行）。
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn from_path(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, template: &str, params: &[Value]) -> RepositoryResult<Vec<Row>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(template)?;
        let column_count = stmt.column_count();

        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(row.get::<_, Value>(idx)?);
            }
            Ok(values)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

// ==========================================
// 标量取值辅助（行值 -> 领域类型）
// ==========================================

/// 取整数列
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(v) => Some(*v),
        Value::Real(v) => Some(*v as i64),
        Value::Text(v) => v.trim().parse().ok(),
        _ => None,
    }
}

/// 取浮点列（NULL 按 0 处理，与原始数据口径一致）
pub fn value_as_f64_or_zero(value: &Value) -> f64 {
    match value {
        Value::Integer(v) => *v as f64,
        Value::Real(v) => *v,
        Value::Text(v) => v.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// 取文本列
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Text(v) => Some(v.clone()),
        Value::Integer(v) => Some(v.to_string()),
        Value::Real(v) => Some(v.to_string()),
        _ => None,
    }
}

/// 取日期列
///
/// 兼容两种历史时间串格式（`YYYY/MM/DD HH:MM:SS` 与
/// `YYYY-MM-DD HH:MM:SS`）以及纯日期串。
pub fn value_as_date(value: &Value) -> Option<NaiveDate> {
    let text = match value {
        Value::Text(v) => v.trim().to_string(),
        _ => return None,
    };
    for fmt in ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok()
}
