// ==========================================
// 中润设备日报系统 - 时序记录实体
// ==========================================
// 职责: 聚合层输出的行结构，渲染层的输入
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 库存快照记录
///
/// `quantity` 为原油剩余比例换算后的百分比值（0 起，允许超过 100）。
/// 同一设备同一报表内时间戳应当非递减且不重复；重复属于数据质量
/// 问题，聚合层原样返回，由上层检测告警。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryRecord {
    pub device_id: i64,
    pub timestamp: NaiveDate,
    pub quantity: f64,
}

/// 加注事件
///
/// `oil_value` 为油加注值，`remaining_ratio` 为加注后的原油剩余比例。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefuelingEvent {
    pub timestamp: NaiveDate,
    pub oil_name: String,
    pub water_value: f64,
    pub oil_value: f64,
    pub remaining_ratio: f64,
    pub operator: Option<String>,
}

/// 对账单设备汇总行（按设备滚总，非逐日明细）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementRow {
    pub device_code: String,
    pub oil_name: String,
    pub total_quantity: f64,
}

/// 每日用量行（对账单"每日用量明细"工作表的数据来源）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyUsageRow {
    pub date: NaiveDate,
    pub oil_name: String,
    pub quantity: f64,
}

/// 检出重复日期（数据质量告警用，不做去重）
pub fn duplicate_dates(records: &[InventoryRecord]) -> Vec<NaiveDate> {
    let mut dupes = Vec::new();
    for pair in records.windows(2) {
        if pair[0].timestamp == pair[1].timestamp && !dupes.contains(&pair[0].timestamp) {
            dupes.push(pair[0].timestamp);
        }
    }
    dupes
}
