// ==========================================
// 中润设备日报系统 - 库存报表渲染
// ==========================================
// 职责: 从零构建带折线图的库存工作簿
// 布局: 第1行合并标题，第2行列头，第3行起每条记录一行
// 图表: 数据源范围严格绑定实际填充区间，随记录数伸缩
// ==========================================

use crate::config::ChartStyle;
use crate::domain::{InventoryRecord, ReportArtifact};
use crate::render::{artifact, RenderError, RenderResult, UNKNOWN_OIL};
use chrono::NaiveDate;
use rust_xlsxwriter::{
    Chart, ChartLine, ChartMarker, ChartMarkerType, ChartType, Color, Format, FormatAlign,
    Workbook,
};
use std::path::Path;

/// 库存数据工作表名
pub const SHEET_NAME: &str = "库存数据";

/// 数据起始行（1 起算；第1行标题、第2行列头）
pub const DATA_START_ROW: u32 = 3;

/// 计算已填充数据区间（1 起算的行号闭区间）
///
/// 图表的类别轴/数值轴范围必须恰好覆盖该区间：指向固定的过大
/// 范围会渲染出尾部空白类别。无记录时不嵌图表。
pub fn chart_extent(record_count: usize) -> Option<(u32, u32)> {
    if record_count == 0 {
        None
    } else {
        Some((DATA_START_ROW, DATA_START_ROW + record_count as u32 - 1))
    }
}

fn marker_type(style: &str) -> ChartMarkerType {
    match style {
        "square" => ChartMarkerType::Square,
        "diamond" => ChartMarkerType::Diamond,
        "triangle" => ChartMarkerType::Triangle,
        "star" => ChartMarkerType::Star,
        _ => ChartMarkerType::Circle,
    }
}

fn line_color(hex: &str) -> Color {
    u32::from_str_radix(hex.trim().trim_start_matches('#'), 16)
        .map(Color::RGB)
        .unwrap_or(Color::RGB(0x0000FF))
}

/// 库存报表渲染器
pub struct InventoryRenderer {
    chart_style: ChartStyle,
}

impl InventoryRenderer {
    pub fn new(chart_style: ChartStyle) -> Self {
        Self { chart_style }
    }

    /// 生成带折线图的库存工作簿
    ///
    /// 空记录集是合法输入：仍产出仅含标题与列头的有效工作表，
    /// 不嵌图表。图表标题包含设备编码与油品名，供下游校验。
    pub fn render_with_chart(
        &self,
        records: &[InventoryRecord],
        device_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        oil_name: Option<&str>,
        output_path: &Path,
    ) -> RenderResult<ReportArtifact> {
        let oil_display = oil_name.unwrap_or(UNKNOWN_OIL);
        let title = format!(
            "{}每日库存余量变化趋势({} - {})",
            device_code, start_date, end_date
        );
        let chart_title = format!("{} {} 每日库存余量变化趋势", device_code, oil_display);

        artifact::write_atomic(output_path, |tmp| {
            let mut workbook = Workbook::new();
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(SHEET_NAME)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;

            let title_format = Format::new().set_bold().set_align(FormatAlign::Center);
            worksheet
                .merge_range(0, 0, 0, 1, &title, &title_format)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;

            worksheet
                .write_string(1, 0, "日期")
                .and_then(|ws| ws.write_string(1, 1, "库存百分比"))
                .map_err(|e| RenderError::Workbook(e.to_string()))?;

            for (offset, record) in records.iter().enumerate() {
                // 0 起算行号 = 数据起始行(1 起算) - 1 + 偏移
                let row = DATA_START_ROW - 1 + offset as u32;
                worksheet
                    .write_string(row, 0, record.timestamp.format("%Y-%m-%d").to_string())
                    .and_then(|ws| ws.write_number(row, 1, record.quantity))
                    .map_err(|e| RenderError::Workbook(e.to_string()))?;
            }

            worksheet
                .set_column_width(0, 14)
                .and_then(|ws| ws.set_column_width(1, 12))
                .map_err(|e| RenderError::Workbook(e.to_string()))?;

            if let Some((first_row, last_row)) = chart_extent(records.len()) {
                let mut chart = Chart::new(ChartType::Line);
                chart
                    .add_series()
                    .set_name("库存百分比")
                    .set_categories((SHEET_NAME, first_row - 1, 0, last_row - 1, 0))
                    .set_values((SHEET_NAME, first_row - 1, 1, last_row - 1, 1))
                    .set_marker(
                        ChartMarker::new()
                            .set_type(marker_type(&self.chart_style.marker_style))
                            .set_size(self.chart_style.marker_size),
                    )
                    .set_format(
                        ChartLine::new()
                            .set_color(line_color(&self.chart_style.line_color))
                            .set_width(self.chart_style.line_width),
                    );
                chart.title().set_name(&chart_title);
                chart.x_axis().set_name("日期");
                chart.y_axis().set_name("库存百分比");

                // E5 位置，与既有报表版式一致
                worksheet
                    .insert_chart(4, 4, &chart)
                    .map_err(|e| RenderError::Workbook(e.to_string()))?;
            }

            workbook
                .save(tmp)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;
            Ok(())
        })?;

        tracing::info!(
            device_code,
            records = records.len(),
            path = %output_path.display(),
            "库存报表已生成"
        );
        artifact::verify(output_path)
    }

    /// 导出 CSV 格式的库存表（无图表）
    pub fn render_csv(
        &self,
        records: &[InventoryRecord],
        output_path: &Path,
    ) -> RenderResult<()> {
        artifact::write_atomic(output_path, |tmp| {
            let mut writer = csv::Writer::from_path(tmp)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;
            writer
                .write_record(["日期", "库存百分比"])
                .map_err(|e| RenderError::Workbook(e.to_string()))?;
            for record in records {
                writer
                    .write_record([
                        record.timestamp.format("%Y-%m-%d").to_string(),
                        format!("{:.2}", record.quantity),
                    ])
                    .map_err(|e| RenderError::Workbook(e.to_string()))?;
            }
            writer
                .flush()
                .map_err(|e| RenderError::Workbook(e.to_string()))?;
            Ok(())
        })
    }
}
