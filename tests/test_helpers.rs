#![allow(dead_code)]
// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、种子数据、模板生成等功能
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use zr_daily_report::repository::SqliteExecutor;

/// 测试场景中"仅存在遗留编号"的设备标识
pub const LEGACY_DEVICE_NO: &str = "88001234";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 初始化数据库 schema
fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS t_customer (
            id INTEGER PRIMARY KEY,
            customer_name TEXT,
            status INTEGER NOT NULL DEFAULT 1
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS t_device (
            id INTEGER PRIMARY KEY,
            device_code TEXT,
            device_no TEXT,
            customer_id INTEGER,
            create_time TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS t_order (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id INTEGER NOT NULL,
            order_time TEXT NOT NULL,
            oil_name TEXT,
            water_value REAL,
            oil_value REAL,
            oil_remaining REAL,
            operator TEXT
        )
        "#,
        [],
    )?;

    Ok(())
}

/// 插入标准测试数据
///
/// - 客户 1 中润化工: 设备 101 (MO24032700700019)、102 (TW24011700700016)
/// - 客户 2 北方能源: 设备 103 仅有遗留编号 88001234（device_code 为空）
pub fn seed_test_data(db_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;

    conn.execute_batch(
        r#"
        INSERT INTO t_customer (id, customer_name) VALUES (1, '中润化工');
        INSERT INTO t_customer (id, customer_name) VALUES (2, '北方能源');

        INSERT INTO t_device (id, device_code, device_no, customer_id)
            VALUES (101, 'MO24032700700019', NULL, 1);
        INSERT INTO t_device (id, device_code, device_no, customer_id)
            VALUES (102, 'TW24011700700016', '77005678', 1);
        INSERT INTO t_device (id, device_code, device_no, customer_id)
            VALUES (103, NULL, '88001234', 2);
        "#,
    )?;

    Ok(())
}

/// 给指定设备插入一条加注/库存记录
pub fn insert_order(
    db_path: &str,
    device_id: i64,
    order_time: &str,
    oil_name: &str,
    oil_value: f64,
    oil_remaining: f64,
) -> Result<(), Box<dyn Error>> {
    let conn = Connection::open(db_path)?;
    conn.execute(
        r#"
        INSERT INTO t_order (device_id, order_time, oil_name, water_value, oil_value, oil_remaining, operator)
        VALUES (?1, ?2, ?3, 0.0, ?4, ?5, '张工')
        "#,
        rusqlite::params![device_id, order_time, oil_name, oil_value, oil_remaining],
    )?;
    Ok(())
}

/// 构造指向测试数据库的查询执行器
pub fn make_executor(db_path: &str) -> Arc<SqliteExecutor> {
    Arc::new(SqliteExecutor::from_path(db_path).expect("Failed to open test executor"))
}

/// 在指定路径生成最小可用的对账单模板
///
/// 包含全部必需工作表: 对账单 / 每日用量明细 / 每月用量对比
pub fn create_statement_template(path: &Path) -> Result<(), Box<dyn Error>> {
    let mut book = umya_spreadsheet::new_file();
    {
        let sheet = book
            .get_sheet_mut(&0)
            .ok_or("missing default sheet")?;
        sheet.set_name("对账单");
        sheet.get_cell_mut("A1").set_value("客户对账单");
        sheet.get_cell_mut("A2").set_value("客户名称:");
        sheet.get_cell_mut("C2").set_value("账期:");
        sheet.get_cell_mut("A3").set_value("设备编码");
        sheet.get_cell_mut("B3").set_value("油品名称");
        sheet.get_cell_mut("C3").set_value("用量合计");
    }
    {
        let sheet = book.new_sheet("每日用量明细").map_err(|e| e.to_string())?;
        sheet.get_cell_mut("A1").set_value("每日用量明细");
        sheet.get_cell_mut("B5").set_value("日期");
    }
    {
        let sheet = book.new_sheet("每月用量对比").map_err(|e| e.to_string())?;
        sheet.get_cell_mut("A1").set_value("每月用量对比");
        sheet.get_cell_mut("B5").set_value("月份");
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)?;
    Ok(())
}
