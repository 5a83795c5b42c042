// ==========================================
// 设备标识解析集成测试
// ==========================================
// 测试目标: 主查询/备用查询链路、未命中与查询失败的降级行为、
//           客户名与油品名的两跳解析
// ==========================================

mod test_helpers;

use test_helpers::{create_test_db, insert_order, make_executor, seed_test_data, LEGACY_DEVICE_NO};
use zr_daily_report::config::SqlTemplates;
use zr_daily_report::repository::DeviceRepository;

fn default_chain(templates: &SqlTemplates) -> Vec<&str> {
    let mut chain = vec![templates.device_primary_query.as_str()];
    if let Some(fallback) = templates.device_fallback_query.as_deref() {
        chain.push(fallback);
    }
    chain
}

#[test]
fn test_resolve_by_primary_code() {
    let (_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_test_data(&db_path).expect("Failed to seed");

    let repo = DeviceRepository::new(make_executor(&db_path));
    let templates = SqlTemplates::default();

    let resolved = repo
        .resolve_device("MO24032700700019", &default_chain(&templates))
        .expect("应当命中主查询");
    assert_eq!(resolved.device_id, 101);
    assert_eq!(resolved.customer_id, 1);
}

#[test]
fn test_resolve_legacy_device_via_fallback() {
    let (_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_test_data(&db_path).expect("Failed to seed");

    let repo = DeviceRepository::new(make_executor(&db_path));
    let templates = SqlTemplates::default();

    // 仅有遗留编号的设备: 主查询未命中，备用查询命中
    let resolved = repo
        .resolve_device(LEGACY_DEVICE_NO, &default_chain(&templates))
        .expect("应当命中备用查询");
    assert_eq!(resolved.device_id, 103);
    assert_eq!(resolved.customer_id, 2);

    // 单独走备用查询必须得到同一结果
    let fallback_only = [templates.device_fallback_query.as_deref().unwrap()];
    let direct = repo
        .resolve_device(LEGACY_DEVICE_NO, &fallback_only)
        .expect("备用查询单独使用也应命中");
    assert_eq!(direct.device_id, resolved.device_id);
    assert_eq!(direct.customer_id, resolved.customer_id);
}

#[test]
fn test_resolve_miss_returns_none() {
    let (_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_test_data(&db_path).expect("Failed to seed");

    let repo = DeviceRepository::new(make_executor(&db_path));
    let templates = SqlTemplates::default();

    assert!(repo
        .resolve_device("ZZ99999999999999", &default_chain(&templates))
        .is_none());
}

#[test]
fn test_broken_primary_query_degrades_to_fallback() {
    let (_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_test_data(&db_path).expect("Failed to seed");

    let repo = DeviceRepository::new(make_executor(&db_path));
    let templates = SqlTemplates::default();

    // 主查询指向不存在的表: 该级按未命中处理，批次继续走备用查询
    let chain = [
        "SELECT id, customer_id FROM t_missing WHERE device_code = ?1",
        templates.device_fallback_query.as_deref().unwrap(),
    ];
    let resolved = repo
        .resolve_device(LEGACY_DEVICE_NO, &chain)
        .expect("备用查询应当兜住主查询失败");
    assert_eq!(resolved.device_id, 103);
}

#[test]
fn test_resolve_customer_name_two_hops() {
    let (_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_test_data(&db_path).expect("Failed to seed");

    let repo = DeviceRepository::new(make_executor(&db_path));
    let templates = SqlTemplates::default();

    assert_eq!(
        repo.resolve_customer_name(101, &templates.customer_query),
        Some("中润化工".to_string())
    );
    assert_eq!(
        repo.resolve_customer_name(103, &templates.customer_query),
        Some("北方能源".to_string())
    );
    // 不存在的设备: 第一跳未命中
    assert_eq!(repo.resolve_customer_name(999, &templates.customer_query), None);
}

#[test]
fn test_resolve_oil_name_latest_record() {
    let (_db, db_path) = create_test_db().expect("Failed to create test db");
    seed_test_data(&db_path).expect("Failed to seed");
    insert_order(&db_path, 101, "2025-07-01 08:00:00", "32号液压油", 10.0, 0.8)
        .expect("Failed to insert");
    insert_order(&db_path, 101, "2025-07-15 08:00:00", "46号液压油", 12.0, 0.6)
        .expect("Failed to insert");

    let repo = DeviceRepository::new(make_executor(&db_path));
    let templates = SqlTemplates::default();

    // 取最近一条记录的油品名
    assert_eq!(
        repo.resolve_oil_name(101, &templates.oil_name_query),
        Some("46号液压油".to_string())
    );
    // 无记录的设备: None，展示兜底由渲染层负责
    assert_eq!(repo.resolve_oil_name(102, &templates.oil_name_query), None);
}
