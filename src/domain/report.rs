// ==========================================
// 中润设备日报系统 - 报表请求与产物
// ==========================================
// 职责: 定义报表类型、请求、产物元数据与批次结果
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// 报表类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// 设备库存报表（带折线图）
    Inventory,
    /// 客户对账单（模板克隆）
    Statement,
    /// 加注明细报表
    Refueling,
    /// 库存 + 对账单
    Both,
}

impl ReportType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inventory" => Some(ReportType::Inventory),
            "statement" => Some(ReportType::Statement),
            "refueling" => Some(ReportType::Refueling),
            "both" => Some(ReportType::Both),
            _ => None,
        }
    }
}

/// 请求构造错误（调用方错误，不在引擎内部恢复）
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("无效的日期范围: start={start} > end={end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("设备编码列表为空")]
    EmptyDeviceList,
}

/// 报表请求
///
/// 前置条件 `start_date <= end_date` 在构造时校验。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub device_codes: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportRequest {
    pub fn new(
        report_type: ReportType,
        device_codes: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, RequestError> {
        if start_date > end_date {
            return Err(RequestError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        if device_codes.is_empty() {
            return Err(RequestError::EmptyDeviceList);
        }
        Ok(Self {
            report_type,
            device_codes,
            start_date,
            end_date,
        })
    }
}

/// 报表产物元数据
///
/// 引擎保证: 成功时文件存在且非空，失败时磁盘上不留半成品。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportArtifact {
    pub path: PathBuf,
    /// 工作表名（保持生成顺序）
    pub sheet_names: Vec<String>,
    /// 每个工作表的已填充行数
    pub row_count_per_sheet: BTreeMap<String, usize>,
}

/// 单设备被剔除的结构化原因
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OmissionReason {
    /// 主查询与备用查询均未命中
    DeviceNotFound,
    /// 该设备的渲染失败（其余设备不受影响）
    RenderFailed(String),
}

/// 设备剔除记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceOmission {
    pub device_code: String,
    pub reason: OmissionReason,
}

/// 批次结果: 每个请求的设备要么有产物引用，要么有剔除原因
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportOutcome {
    pub artifacts: Vec<ReportArtifact>,
    pub omissions: Vec<DeviceOmission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let result = ReportRequest::new(ReportType::Inventory, vec!["A".into()], start, end);
        assert!(matches!(
            result,
            Err(RequestError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_request_rejects_empty_device_list() {
        let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let result = ReportRequest::new(ReportType::Inventory, vec![], day, day);
        assert!(matches!(result, Err(RequestError::EmptyDeviceList)));
    }

    #[test]
    fn test_report_type_parse() {
        assert_eq!(ReportType::parse("both"), Some(ReportType::Both));
        assert_eq!(ReportType::parse("INVENTORY"), Some(ReportType::Inventory));
        assert_eq!(ReportType::parse("unknown"), None);
    }
}
