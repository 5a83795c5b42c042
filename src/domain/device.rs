// ==========================================
// 中润设备日报系统 - 设备标识解析结果
// ==========================================
// 职责: 只读投影，每次报表请求重新解析
// 红线: 不含数据访问逻辑
// ==========================================

use serde::{Deserialize, Serialize};

/// 标识解析结果: 设备ID + 客户ID
///
/// 用户提供的标识可能是设备编码（device_code），也可能是历史遗留
/// 编号（device_no）；客户只能经由解析出的 customer_id 查找，
/// 绝不直接由设备标识解析。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedDevice {
    pub device_id: i64,
    pub customer_id: i64,
}
