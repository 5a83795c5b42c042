// ==========================================
// 中润设备日报系统 - 命令行入口
// ==========================================
// 用法: zr-daily-report <mode> <config.json> <start> <end> <device_code...>
//   mode ∈ {inventory, statement, both, refueling}
// 交互式选择器/参数解析器不属于核心，入口保持最薄
// ==========================================

use anyhow::{bail, Context};
use chrono::NaiveDate;
use std::sync::Arc;
use zr_daily_report::config::AppConfig;
use zr_daily_report::domain::{ReportRequest, ReportType};
use zr_daily_report::engine::ReportOrchestrator;
use zr_daily_report::repository::SqliteExecutor;
use zr_daily_report::vault::{CredentialVault, KeyStore};
use zr_daily_report::{logging, APP_NAME, VERSION};

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 报表生成引擎", APP_NAME);
    tracing::info!("系统版本: {}", VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 5 {
        bail!("用法: zr-daily-report <mode> <config.json> <start> <end> <device_code...>");
    }

    let report_type = ReportType::parse(&args[0])
        .with_context(|| format!("未知的报表类型: {}", args[0]))?;
    let config = AppConfig::load(args[1].as_ref())?;
    let start_date = NaiveDate::parse_from_str(&args[2], "%Y-%m-%d")
        .with_context(|| format!("开始日期格式错误: {}", args[2]))?;
    let end_date = NaiveDate::parse_from_str(&args[3], "%Y-%m-%d")
        .with_context(|| format!("结束日期格式错误: {}", args[3]))?;
    let device_codes: Vec<String> = args[4..].to_vec();

    // 数据库路径: 密文形态时先经凭据仓解密
    let db_path = match &config.database.dsn_encrypted {
        Some(envelope) => {
            let store = KeyStore::new(config.key_path());
            let vault = CredentialVault::from_existing(&store)?;
            vault.decrypt(envelope)?
        }
        None => config.database.path.clone(),
    };
    tracing::info!("使用数据库: {}", db_path);

    let executor = Arc::new(SqliteExecutor::from_path(&db_path)?);
    let orchestrator = ReportOrchestrator::from_config(&config, executor);

    let request = ReportRequest::new(report_type, device_codes, start_date, end_date)?;
    let outcome = orchestrator.generate(&request)?;

    for artifact in &outcome.artifacts {
        tracing::info!(
            path = %artifact.path.display(),
            sheets = ?artifact.sheet_names,
            "产物"
        );
    }
    for omission in &outcome.omissions {
        tracing::warn!(
            device_code = %omission.device_code,
            reason = ?omission.reason,
            "设备被剔除"
        );
    }

    Ok(())
}
