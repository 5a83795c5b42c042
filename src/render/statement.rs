// ==========================================
// 中润设备日报系统 - 客户对账单渲染
// ==========================================
// 职责: 克隆参考模板（保留合并/填充/字体/列宽），只覆写数据区
// 多客户: 同一产物内每客户一张对账单工作表，表名取客户名
// ==========================================

use crate::domain::{DailyUsageRow, ReportArtifact, StatementRow};
use crate::render::{artifact, RenderError, RenderResult, UNKNOWN_CUSTOMER};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// 模板中的对账单原型工作表名
pub const STATEMENT_SHEET: &str = "对账单";

/// 模板中的每日用量工作表名
pub const DAILY_USAGE_SHEET: &str = "每日用量明细";

/// 模板中的每月用量工作表名
pub const MONTHLY_COMPARISON_SHEET: &str = "每月用量对比";

/// 对账单数据区起始行（1-3 行为模板表头）
const STATEMENT_DATA_START_ROW: u32 = 4;

/// 用量表数据区起始行（第5行油品列头，第6行起数据）
const USAGE_DATA_START_ROW: u32 = 6;

/// 单个客户的对账数据
#[derive(Debug, Clone)]
pub struct CustomerStatement {
    /// None 时渲染为"未知客户"
    pub customer_name: Option<String>,
    pub rows: Vec<StatementRow>,
    pub daily_usage: Vec<DailyUsageRow>,
}

impl CustomerStatement {
    fn display_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or(UNKNOWN_CUSTOMER)
    }
}

/// Excel 工作表名约束: 禁用字符替换为下划线，至多 31 字符
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    let trimmed: String = cleaned.trim().chars().take(31).collect();
    if trimmed.is_empty() {
        UNKNOWN_CUSTOMER.to_string()
    } else {
        trimmed
    }
}

/// 客户对账单渲染器
///
/// 模板描述符只读，每次渲染重新从文件克隆。
pub struct StatementRenderer {
    template_path: PathBuf,
}

impl StatementRenderer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// 模板是否就位（编排层用于整批提前中止判断）
    pub fn template_available(&self) -> bool {
        self.template_path.exists()
    }

    /// 基于模板生成对账单产物
    ///
    /// 模板缺失或不可读对本次渲染是致命错误（TemplateUnavailable）；
    /// 空数据集不是错误，仍产出结构完整的工作表。
    pub fn render(
        &self,
        customers: &[CustomerStatement],
        start_date: NaiveDate,
        end_date: NaiveDate,
        output_path: &Path,
    ) -> RenderResult<ReportArtifact> {
        if !self.template_path.exists() {
            return Err(RenderError::TemplateUnavailable(self.template_path.clone()));
        }
        let mut book = umya_spreadsheet::reader::xlsx::read(&self.template_path)
            .map_err(|_| RenderError::TemplateUnavailable(self.template_path.clone()))?;

        for required in [STATEMENT_SHEET, DAILY_USAGE_SHEET, MONTHLY_COMPARISON_SHEET] {
            if book.get_sheet_by_name(required).is_none() {
                return Err(RenderError::MissingSheet(required.to_string()));
            }
        }

        // 对账单原型：每客户克隆一张，最后移除原型
        let prototype = book
            .get_sheet_by_name(STATEMENT_SHEET)
            .cloned()
            .ok_or_else(|| RenderError::MissingSheet(STATEMENT_SHEET.to_string()))?;

        let mut used_names = BTreeSet::new();
        for customer in customers {
            let base = sanitize_sheet_name(customer.display_name());
            let mut name = base.clone();
            // 重名客户追加序号；先截基名为序号留位，拼接后总长仍不超 31 字符
            let mut suffix = 2;
            while !used_names.insert(name.clone()) {
                let tag = format!("_{}", suffix);
                let kept: String = base.chars().take(31 - tag.chars().count()).collect();
                name = format!("{}{}", kept, tag);
                suffix += 1;
            }

            let mut sheet = prototype.clone();
            sheet.set_name(name.as_str());
            fill_statement_sheet(&mut sheet, customer, start_date, end_date);
            book.add_sheet(sheet)
                .map_err(|e| RenderError::Workbook(e.to_string()))?;
        }

        book.remove_sheet_by_name(STATEMENT_SHEET)
            .map_err(|e| RenderError::Workbook(e.to_string()))?;

        let all_daily: Vec<&DailyUsageRow> = customers
            .iter()
            .flat_map(|customer| customer.daily_usage.iter())
            .collect();
        if let Some(sheet) = book.get_sheet_by_name_mut(DAILY_USAGE_SHEET) {
            fill_daily_usage_sheet(sheet, &all_daily, start_date, end_date);
        }
        if let Some(sheet) = book.get_sheet_by_name_mut(MONTHLY_COMPARISON_SHEET) {
            fill_monthly_comparison_sheet(sheet, &all_daily, start_date, end_date);
        }

        artifact::write_atomic(output_path, |tmp| {
            umya_spreadsheet::writer::xlsx::write(&book, tmp)
                .map_err(|e| RenderError::Workbook(e.to_string()))
        })?;

        tracing::info!(
            customers = customers.len(),
            path = %output_path.display(),
            "对账单已生成"
        );
        artifact::verify(output_path)
    }
}

/// 覆写单个客户的对账单数据区（B2 客户名，D2 日期范围，第4行起明细）
fn fill_statement_sheet(
    sheet: &mut umya_spreadsheet::Worksheet,
    customer: &CustomerStatement,
    start_date: NaiveDate,
    end_date: NaiveDate,
) {
    sheet
        .get_cell_mut("B2")
        .set_value(customer.display_name().to_string());
    sheet.get_cell_mut("D2").set_value(format!(
        "{}至{}",
        start_date.format("%Y-%m-%d"),
        end_date.format("%Y-%m-%d")
    ));

    let mut row = STATEMENT_DATA_START_ROW;
    for item in &customer.rows {
        sheet
            .get_cell_mut((1, row))
            .set_value(item.device_code.clone());
        sheet
            .get_cell_mut((2, row))
            .set_value(item.oil_name.clone());
        sheet
            .get_cell_mut((3, row))
            .set_value_number((item.total_quantity * 100.0).round() / 100.0);
        row += 1;
    }
}

/// 覆写每日用量明细工作表
///
/// B3 日期范围标注；第5行自第3列起油品列头；第6行起 B 列为
/// 窗口内逐日日期（m.d 格式），对应列为当日该油品用量合计。
fn fill_daily_usage_sheet(
    sheet: &mut umya_spreadsheet::Worksheet,
    daily: &[&DailyUsageRow],
    start_date: NaiveDate,
    end_date: NaiveDate,
) {
    sheet.get_cell_mut("B3").set_value(format!(
        "({}-{})",
        start_date.format("%Y.%m.%d"),
        end_date.format("%Y.%m.%d")
    ));

    let mut usage: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    let mut oils: BTreeSet<&str> = BTreeSet::new();
    for row in daily {
        oils.insert(row.oil_name.as_str());
        *usage.entry((row.date, row.oil_name.as_str())).or_insert(0.0) += row.quantity;
    }

    for (offset, oil_name) in oils.iter().enumerate() {
        sheet
            .get_cell_mut((3 + offset as u32, 5))
            .set_value(oil_name.to_string());
    }

    let mut row = USAGE_DATA_START_ROW;
    let mut current = start_date;
    while current <= end_date {
        sheet
            .get_cell_mut((2, row))
            .set_value(format!("{}.{}", current.month(), current.day()));
        for (offset, oil_name) in oils.iter().enumerate() {
            let value = usage.get(&(current, *oil_name)).copied().unwrap_or(0.0);
            sheet
                .get_cell_mut((3 + offset as u32, row))
                .set_value_number((value * 100.0).round() / 100.0);
        }
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
        row += 1;
    }
}

/// 覆写每月用量对比工作表（按记录归属月份汇总）
fn fill_monthly_comparison_sheet(
    sheet: &mut umya_spreadsheet::Worksheet,
    daily: &[&DailyUsageRow],
    start_date: NaiveDate,
    end_date: NaiveDate,
) {
    sheet.get_cell_mut("B3").set_value(format!(
        "({}-{})",
        start_date.format("%Y.%m.%d"),
        end_date.format("%Y.%m.%d")
    ));

    let mut monthly: BTreeMap<(String, &str), f64> = BTreeMap::new();
    let mut oils: BTreeSet<&str> = BTreeSet::new();
    for row in daily {
        oils.insert(row.oil_name.as_str());
        let month = row.date.format("%Y-%m").to_string();
        *monthly.entry((month, row.oil_name.as_str())).or_insert(0.0) += row.quantity;
    }

    for (offset, oil_name) in oils.iter().enumerate() {
        sheet
            .get_cell_mut((3 + offset as u32, 5))
            .set_value(oil_name.to_string());
    }

    let months: BTreeSet<String> = monthly.keys().map(|(month, _)| month.clone()).collect();
    let mut row = USAGE_DATA_START_ROW;
    for month in months {
        sheet.get_cell_mut((2, row)).set_value(month.clone());
        for (offset, oil_name) in oils.iter().enumerate() {
            let value = monthly
                .get(&(month.clone(), *oil_name))
                .copied()
                .unwrap_or(0.0);
            sheet
                .get_cell_mut((3 + offset as u32, row))
                .set_value_number((value * 100.0).round() / 100.0);
        }
        row += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("中润化工"), "中润化工");
        assert_eq!(sanitize_sheet_name("A/B:C*D"), "A_B_C_D");
        assert_eq!(sanitize_sheet_name(""), UNKNOWN_CUSTOMER);
        assert_eq!(sanitize_sheet_name(&"长".repeat(40)).chars().count(), 31);
    }
}
