// ==========================================
// 中润设备日报系统 - 设备标识解析仓储
// ==========================================
// 职责: 外部设备标识 -> (device_id, customer_id)，两跳客户名解析
// 红线: 查询失败在本层转日志 + 未命中，绝不向编排层抛底层数据库错误
// ==========================================
// 背景: 设备标识方案经历过迁移，旧记录按遗留编号（device_no）落库，
// 新记录按结构化编码（device_code）。解析必须在两种方案混存的数据
// 集上保持正确，因此查询按调用方给定顺序逐个尝试，先命中者生效。
// ==========================================

use crate::domain::ResolvedDevice;
use crate::repository::query::{value_as_i64, value_as_string, QueryExecutor};
use rusqlite::types::Value;
use std::sync::Arc;

/// device_id -> customer_id 的固定内部查询
const CUSTOMER_ID_QUERY: &str = "SELECT customer_id FROM t_device WHERE id = ?1";

/// 设备标识解析仓储
pub struct DeviceRepository {
    executor: Arc<dyn QueryExecutor>,
}

impl DeviceRepository {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// 解析设备标识为 (device_id, customer_id)
    ///
    /// # 参数
    /// - identifier: 用户提供的设备标识（编码或遗留编号）
    /// - lookups: 按优先级排列的查询模板序列，逐个尝试，先命中者生效
    ///
    /// # 返回
    /// - Some(ResolvedDevice): 某级查询命中
    /// - None: 全部未命中（业务性结果，批次继续）
    ///
    /// 查询执行失败（连接问题、SQL 问题）按未命中处理并记录日志。
    pub fn resolve_device(&self, identifier: &str, lookups: &[&str]) -> Option<ResolvedDevice> {
        for (tier, template) in lookups.iter().enumerate() {
            let rows = match self
                .executor
                .execute(template, &[Value::Text(identifier.to_string())])
            {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(identifier, tier, error = %e, "设备解析查询失败，按未命中处理");
                    continue;
                }
            };

            if let Some(row) = rows.first() {
                let device_id = row.first().and_then(value_as_i64);
                let customer_id = row.get(1).and_then(value_as_i64);
                match (device_id, customer_id) {
                    (Some(device_id), Some(customer_id)) => {
                        tracing::debug!(identifier, tier, device_id, customer_id, "设备解析命中");
                        return Some(ResolvedDevice {
                            device_id,
                            customer_id,
                        });
                    }
                    _ => {
                        tracing::warn!(identifier, tier, "设备解析结果列类型异常，按未命中处理");
                    }
                }
            }
        }
        None
    }

    /// 解析客户名称（两跳: device_id -> customer_id -> name）
    ///
    /// 任一跳未命中返回 None；展示用兜底文案由渲染层决定。
    /// 单个设备客户信息缺失不应拖垮整批报表。
    pub fn resolve_customer_name(&self, device_id: i64, customer_query: &str) -> Option<String> {
        let customer_id = match self
            .executor
            .execute(CUSTOMER_ID_QUERY, &[Value::Integer(device_id)])
        {
            Ok(rows) => rows.first().and_then(|row| row.first().and_then(value_as_i64)),
            Err(e) => {
                tracing::warn!(device_id, error = %e, "客户ID查询失败");
                None
            }
        }?;

        match self
            .executor
            .execute(customer_query, &[Value::Integer(customer_id)])
        {
            Ok(rows) => {
                let name = rows
                    .first()
                    .and_then(|row| row.first().and_then(value_as_string))
                    .filter(|name| !name.trim().is_empty());
                if name.is_none() {
                    tracing::warn!(device_id, customer_id, "未找到客户名称");
                }
                name
            }
            Err(e) => {
                tracing::warn!(device_id, customer_id, error = %e, "客户名称查询失败");
                None
            }
        }
    }

    /// 解析设备最近使用的油品名称（图表标题与对账单使用）
    pub fn resolve_oil_name(&self, device_id: i64, oil_query: &str) -> Option<String> {
        match self.executor.execute(oil_query, &[Value::Integer(device_id)]) {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.first().and_then(value_as_string))
                .filter(|name| !name.trim().is_empty()),
            Err(e) => {
                tracing::warn!(device_id, error = %e, "油品名称查询失败");
                None
            }
        }
    }
}
