// ==========================================
// 库存报表渲染集成测试
// ==========================================
// 测试目标: 空记录集产出合法工作簿、行数与记录数对应、
//           重复渲染幂等、CSV 导出
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use tempfile::TempDir;
use zr_daily_report::config::ChartStyle;
use zr_daily_report::domain::InventoryRecord;
use zr_daily_report::render::InventoryRenderer;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_records(count: u32) -> Vec<InventoryRecord> {
    (0..count)
        .map(|offset| InventoryRecord {
            device_id: 101,
            timestamp: date(2025, 7, 1 + offset),
            quantity: 90.0 - offset as f64 * 5.0,
        })
        .collect()
}

#[test]
fn test_empty_record_set_yields_valid_workbook_without_chart() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("MO24032700700019_库存报表_20250701_20250731.xlsx");

    let renderer = InventoryRenderer::new(ChartStyle::default());
    let artifact = renderer
        .render_with_chart(
            &[],
            "MO24032700700019",
            date(2025, 7, 1),
            date(2025, 7, 31),
            None,
            &output,
        )
        .expect("空记录集应产出合法工作簿");

    assert!(output.exists());
    assert_eq!(artifact.sheet_names, vec!["库存数据".to_string()]);
    // 仅标题行与列头行
    assert_eq!(artifact.row_count_per_sheet.get("库存数据"), Some(&2));
}

#[test]
fn test_row_count_tracks_record_count() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("inventory.xlsx");

    let renderer = InventoryRenderer::new(ChartStyle::default());
    let artifact = renderer
        .render_with_chart(
            &sample_records(3),
            "TW24011700700016",
            date(2025, 7, 1),
            date(2025, 7, 31),
            Some("32号液压油"),
            &output,
        )
        .expect("render failed");

    // 标题 + 列头 + 3 条数据
    assert_eq!(artifact.row_count_per_sheet.get("库存数据"), Some(&5));
}

#[test]
fn test_repeated_render_is_idempotent() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("inventory.xlsx");
    let renderer = InventoryRenderer::new(ChartStyle::default());
    let records = sample_records(5);

    let first = renderer
        .render_with_chart(
            &records,
            "MO24032700700019",
            date(2025, 7, 1),
            date(2025, 7, 31),
            Some("32号液压油"),
            &output,
        )
        .expect("first render failed");
    let second = renderer
        .render_with_chart(
            &records,
            "MO24032700700019",
            date(2025, 7, 1),
            date(2025, 7, 31),
            Some("32号液压油"),
            &output,
        )
        .expect("second render failed");

    assert_eq!(first.sheet_names, second.sheet_names);
    assert_eq!(first.row_count_per_sheet, second.row_count_per_sheet);
}

#[test]
fn test_chart_series_bound_to_populated_rows() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("inventory.xlsx");
    let renderer = InventoryRenderer::new(ChartStyle::default());

    renderer
        .render_with_chart(
            &sample_records(3),
            "MO24032700700019",
            date(2025, 7, 1),
            date(2025, 7, 31),
            Some("32号液压油"),
            &output,
        )
        .expect("render failed");

    // 图表数据源范围必须恰好覆盖第 3-5 行（1 起算），不得指向过大区间
    let chart_xml = read_zip_entry(&output, "xl/charts/chart1.xml");
    assert!(chart_xml.contains("$A$3:$A$5"), "类别轴范围错误");
    assert!(chart_xml.contains("$B$3:$B$5"), "数值轴范围错误");
    assert!(!chart_xml.contains("$A$3:$A$6"));
}

#[test]
fn test_zero_records_embed_no_chart_part() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("inventory.xlsx");
    let renderer = InventoryRenderer::new(ChartStyle::default());

    renderer
        .render_with_chart(
            &[],
            "MO24032700700019",
            date(2025, 7, 1),
            date(2025, 7, 31),
            None,
            &output,
        )
        .expect("render failed");

    let file = std::fs::File::open(&output).expect("Failed to open artifact");
    let mut archive = zip::ZipArchive::new(file).expect("Failed to read container");
    assert!(archive.by_name("xl/charts/chart1.xml").is_err());
}

fn read_zip_entry(path: &std::path::Path, entry: &str) -> String {
    use std::io::Read;

    let file = std::fs::File::open(path).expect("Failed to open artifact");
    let mut archive = zip::ZipArchive::new(file).expect("Failed to read container");
    let mut content = String::new();
    archive
        .by_name(entry)
        .expect("missing container entry")
        .read_to_string(&mut content)
        .expect("Failed to read entry");
    content
}

#[test]
fn test_csv_export() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("inventory.csv");
    let renderer = InventoryRenderer::new(ChartStyle::default());

    renderer
        .render_csv(&sample_records(2), &output)
        .expect("render_csv failed");

    let content = std::fs::read_to_string(&output).expect("Failed to read csv");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "日期,库存百分比");
    assert_eq!(lines[1], "2025-07-01,90.00");
    assert_eq!(lines[2], "2025-07-02,85.00");
}

#[test]
fn test_no_leftover_temp_files() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("inventory.xlsx");
    let renderer = InventoryRenderer::new(ChartStyle::default());

    renderer
        .render_with_chart(
            &sample_records(1),
            "MO24032700700019",
            date(2025, 7, 1),
            date(2025, 7, 31),
            None,
            &output,
        )
        .expect("render failed");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .expect("Failed to list dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "不应残留临时文件: {:?}", leftovers);
}
