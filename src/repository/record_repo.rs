// ==========================================
// 中润设备日报系统 - 时序记录聚合仓储
// ==========================================
// 职责: 按时间窗口取库存快照/加注事件/对账汇总并整形为渲染行
// 红线: 空结果是合法结果（返回空序列），不是错误
// ==========================================

use crate::config::SqlTemplates;
use crate::domain::{DailyUsageRow, InventoryRecord, RefuelingEvent, StatementRow};
use crate::repository::error::RepositoryResult;
use crate::repository::query::{
    value_as_date, value_as_f64_or_zero, value_as_string, QueryExecutor,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 时序记录聚合仓储
pub struct RecordRepository {
    executor: Arc<dyn QueryExecutor>,
    templates: SqlTemplates,
}

impl RecordRepository {
    pub fn new(executor: Arc<dyn QueryExecutor>, templates: SqlTemplates) -> Self {
        Self {
            executor,
            templates,
        }
    }

    /// 时间窗口的 datetime 边界参数（闭区间 [start, end]）
    fn window_params(id: i64, start: NaiveDate, end: NaiveDate) -> [Value; 3] {
        [
            Value::Integer(id),
            Value::Text(format!("{} 00:00:00", start.format("%Y-%m-%d"))),
            Value::Text(format!("{} 23:59:59", end.format("%Y-%m-%d"))),
        ]
    }

    /// 获取库存快照序列
    ///
    /// 返回 [start, end] 闭区间内按时间升序的记录；原油剩余比例
    /// 换算为百分比。同日重复记录原样保留（数据质量问题由上层
    /// 通过 `duplicate_dates` 检测告警，本层不做静默去重）。
    pub fn fetch_inventory(
        &self,
        device_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        let rows = self.executor.execute(
            &self.templates.inventory_query,
            &Self::window_params(device_id, start, end),
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let timestamp = match row.first().and_then(value_as_date) {
                Some(date) => date,
                None => {
                    tracing::warn!(device_id, "无法解析库存记录的时间列，已跳过该行");
                    continue;
                }
            };
            if timestamp < start || timestamp > end {
                continue;
            }
            let ratio = row.get(1).map(value_as_f64_or_zero).unwrap_or(0.0);
            records.push(InventoryRecord {
                device_id,
                timestamp,
                quantity: ratio * 100.0,
            });
        }

        // 模板可能不带 ORDER BY，这里统一升序（稳定排序保留同日原始次序）
        records.sort_by_key(|record| record.timestamp);
        tracing::debug!(device_id, count = records.len(), "库存数据读取完成");
        Ok(records)
    }

    /// 获取加注事件序列
    pub fn fetch_refueling(
        &self,
        device_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RefuelingEvent>> {
        let rows = self.executor.execute(
            &self.templates.refueling_query,
            &Self::window_params(device_id, start, end),
        )?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            let timestamp = match row.first().and_then(value_as_date) {
                Some(date) => date,
                None => {
                    tracing::warn!(device_id, "无法解析加注记录的时间列，已跳过该行");
                    continue;
                }
            };
            if timestamp < start || timestamp > end {
                continue;
            }
            events.push(RefuelingEvent {
                timestamp,
                oil_name: row
                    .get(1)
                    .and_then(value_as_string)
                    .unwrap_or_default(),
                water_value: row.get(2).map(value_as_f64_or_zero).unwrap_or(0.0),
                oil_value: row.get(3).map(value_as_f64_or_zero).unwrap_or(0.0),
                remaining_ratio: row.get(4).map(value_as_f64_or_zero).unwrap_or(0.0),
                operator: row.get(5).and_then(value_as_string),
            });
        }

        events.sort_by_key(|event| event.timestamp);
        tracing::debug!(device_id, count = events.len(), "加注明细读取完成");
        Ok(events)
    }

    /// 获取对账单设备汇总行（按客户滚总，非逐日明细）
    pub fn fetch_statement_rows(
        &self,
        customer_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<StatementRow>> {
        let rows = self.executor.execute(
            &self.templates.statement_query,
            &Self::window_params(customer_id, start, end),
        )?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let device_code = match row.first().and_then(value_as_string) {
                Some(code) => code,
                None => continue,
            };
            result.push(StatementRow {
                device_code,
                oil_name: row
                    .get(1)
                    .and_then(value_as_string)
                    .unwrap_or_default(),
                total_quantity: row.get(2).map(value_as_f64_or_zero).unwrap_or(0.0),
            });
        }
        tracing::debug!(customer_id, count = result.len(), "对账汇总读取完成");
        Ok(result)
    }

    /// 获取客户的每日分油品用量（对账单"每日用量明细"工作表数据源）
    ///
    /// 原始行按 (日期, 油品) 归并求和，按日期、油品名升序返回。
    pub fn fetch_daily_usage(
        &self,
        customer_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<DailyUsageRow>> {
        let rows = self.executor.execute(
            &self.templates.daily_usage_query,
            &Self::window_params(customer_id, start, end),
        )?;

        let mut usage: BTreeMap<(NaiveDate, String), f64> = BTreeMap::new();
        for row in &rows {
            let date = match row.first().and_then(value_as_date) {
                Some(date) if date >= start && date <= end => date,
                _ => continue,
            };
            let oil_name = row
                .get(1)
                .and_then(value_as_string)
                .unwrap_or_default();
            let quantity = row.get(2).map(value_as_f64_or_zero).unwrap_or(0.0);
            *usage.entry((date, oil_name)).or_insert(0.0) += quantity;
        }

        Ok(usage
            .into_iter()
            .map(|((date, oil_name), quantity)| DailyUsageRow {
                date,
                oil_name,
                quantity,
            })
            .collect())
    }
}
