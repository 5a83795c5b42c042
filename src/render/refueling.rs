// ==========================================
// 中润设备日报系统 - 加注明细渲染
// ==========================================
// 职责: 无图表的明细表渲染，第1行列头，第2行起逐事件一行
// ==========================================

use crate::domain::{RefuelingEvent, ReportArtifact};
use crate::render::{artifact, RenderError, RenderResult};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// 加注明细工作表名
pub const SHEET_NAME: &str = "加注明细";

/// 固定列头（与既有报表口径一致）
const COLUMNS: [&str; 6] = [
    "加注时间",
    "油品名称",
    "水加注值",
    "油加注值",
    "原油剩余比例",
    "操作员",
];

/// 列宽上限（字符）
const MAX_COLUMN_WIDTH: usize = 50;

/// 加注明细渲染器
pub struct RefuelingRenderer;

impl RefuelingRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 生成加注明细工作簿
    pub fn render(
        &self,
        events: &[RefuelingEvent],
        device_code: &str,
        output_path: &Path,
    ) -> RenderResult<ReportArtifact> {
        artifact::write_atomic(output_path, |tmp| {
            let mut workbook = Workbook::new();
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(SHEET_NAME)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;

            // 每列最大内容宽度（含列头），用于列宽自适应
            let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();

            for (col, header) in COLUMNS.iter().enumerate() {
                worksheet
                    .write_string(0, col as u16, *header)
                    .map_err(|e| RenderError::Workbook(e.to_string()))?;
            }

            for (offset, event) in events.iter().enumerate() {
                let row = 1 + offset as u32;
                let timestamp = event.timestamp.format("%Y-%m-%d").to_string();
                let operator = event.operator.as_deref().unwrap_or("");

                widths[0] = widths[0].max(timestamp.chars().count());
                widths[1] = widths[1].max(event.oil_name.chars().count());
                widths[5] = widths[5].max(operator.chars().count());

                worksheet
                    .write_string(row, 0, &timestamp)
                    .and_then(|ws| ws.write_string(row, 1, &event.oil_name))
                    .and_then(|ws| ws.write_number(row, 2, event.water_value))
                    .and_then(|ws| ws.write_number(row, 3, event.oil_value))
                    .and_then(|ws| ws.write_number(row, 4, event.remaining_ratio))
                    .and_then(|ws| ws.write_string(row, 5, operator))
                    .map_err(|e| RenderError::Workbook(e.to_string()))?;
            }

            for (col, width) in widths.iter().enumerate() {
                worksheet
                    .set_column_width(col as u16, (width + 2).min(MAX_COLUMN_WIDTH) as f64)
                    .map_err(|e| RenderError::Workbook(e.to_string()))?;
            }

            workbook
                .save(tmp)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;
            Ok(())
        })?;

        tracing::info!(
            device_code,
            events = events.len(),
            path = %output_path.display(),
            "加注明细报表已生成"
        );
        artifact::verify(output_path)
    }
}

impl Default for RefuelingRenderer {
    fn default() -> Self {
        Self::new()
    }
}
