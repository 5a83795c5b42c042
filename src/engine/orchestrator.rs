// ==========================================
// 中润设备日报系统 - 报表编排器
// ==========================================
// 职责: 解析 -> 聚合 -> 渲染 的组合流程，按报表类型分派
// 语义: 部分成功是默认语义；单设备解析失败记录剔除原因后继续，
//       全部失败才整批报错
// ==========================================

use crate::config::{AppConfig, SqlTemplates};
use crate::domain::{
    duplicate_dates, DeviceOmission, OmissionReason, ReportOutcome, ReportRequest, ReportType,
    ResolvedDevice,
};
use crate::engine::error::{ReportError, ReportResult};
use crate::render::{
    CustomerStatement, InventoryRenderer, RefuelingRenderer, RenderError, StatementRenderer,
};
use crate::repository::{DeviceRepository, QueryExecutor, RecordRepository};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 报表编排器
///
/// 单请求内执行是顺序的（解析 -> 聚合 -> 渲染）；并发请求各自
/// 构造独立的编排器与数据库连接。
pub struct ReportOrchestrator {
    devices: DeviceRepository,
    records: RecordRepository,
    inventory: InventoryRenderer,
    statement: StatementRenderer,
    refueling: RefuelingRenderer,
    templates: SqlTemplates,
    output_dir: PathBuf,
}

impl ReportOrchestrator {
    /// 从配置与查询执行能力构造编排器
    pub fn from_config(config: &AppConfig, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            devices: DeviceRepository::new(Arc::clone(&executor)),
            records: RecordRepository::new(executor, config.sql_templates.clone()),
            inventory: InventoryRenderer::new(config.chart_style.clone()),
            statement: StatementRenderer::new(config.template_path.clone()),
            refueling: RefuelingRenderer::new(),
            templates: config.sql_templates.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    /// 生成报表批次
    ///
    /// # 返回
    /// - Ok(ReportOutcome): 每个请求的设备要么有产物，要么有剔除原因
    /// - Err(NoResolvableDevices): 批次内没有任何设备解析成功
    /// - Err(其他): 整批级失败（模板缺失等），提前中止
    pub fn generate(&self, request: &ReportRequest) -> ReportResult<ReportOutcome> {
        // 对账单路径依赖模板；缺失时提前中止，不产出任何半批产物
        if matches!(request.report_type, ReportType::Statement | ReportType::Both)
            && !self.statement.template_available()
        {
            return Err(ReportError::Render(RenderError::TemplateUnavailable(
                self.statement.template_path().to_path_buf(),
            )));
        }

        let mut outcome = ReportOutcome::default();

        // 第一步: 整批解析设备标识
        let lookups = self.lookup_chain();
        let mut resolved: Vec<(String, ResolvedDevice)> = Vec::new();
        for code in &request.device_codes {
            match self.devices.resolve_device(code, &lookups) {
                Some(identity) => resolved.push((code.clone(), identity)),
                None => {
                    tracing::warn!(device_code = %code, "设备解析失败，剔除出批次");
                    outcome.omissions.push(DeviceOmission {
                        device_code: code.clone(),
                        reason: OmissionReason::DeviceNotFound,
                    });
                }
            }
        }
        if resolved.is_empty() {
            return Err(ReportError::NoResolvableDevices);
        }

        match request.report_type {
            ReportType::Inventory => {
                self.generate_inventory(&resolved, request, &mut outcome)?;
            }
            ReportType::Refueling => {
                self.generate_refueling(&resolved, request, &mut outcome)?;
            }
            ReportType::Statement => {
                self.generate_statement(&resolved, request, &mut outcome)?;
            }
            ReportType::Both => {
                self.generate_inventory(&resolved, request, &mut outcome)?;
                self.generate_statement(&resolved, request, &mut outcome)?;
            }
        }

        tracing::info!(
            artifacts = outcome.artifacts.len(),
            omissions = outcome.omissions.len(),
            "报表批次完成"
        );
        Ok(outcome)
    }

    fn lookup_chain(&self) -> Vec<&str> {
        let mut chain = vec![self.templates.device_primary_query.as_str()];
        if let Some(fallback) = self.templates.device_fallback_query.as_deref() {
            chain.push(fallback);
        }
        chain
    }

    fn output_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.xlsx", stem))
    }

    /// 逐设备生成库存报表
    fn generate_inventory(
        &self,
        resolved: &[(String, ResolvedDevice)],
        request: &ReportRequest,
        outcome: &mut ReportOutcome,
    ) -> ReportResult<()> {
        for (code, identity) in resolved {
            let result = self.render_inventory_for_device(
                code,
                identity,
                request.start_date,
                request.end_date,
            );
            match result {
                Ok(artifact) => outcome.artifacts.push(artifact),
                Err(e) => {
                    tracing::warn!(device_code = %code, error = %e, "库存报表生成失败");
                    outcome.omissions.push(DeviceOmission {
                        device_code: code.clone(),
                        reason: OmissionReason::RenderFailed(e.to_string()),
                    });
                }
            }
        }
        Ok(())
    }

    fn render_inventory_for_device(
        &self,
        code: &str,
        identity: &ResolvedDevice,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReportResult<crate::domain::ReportArtifact> {
        let records = self
            .records
            .fetch_inventory(identity.device_id, start, end)?;

        let dupes = duplicate_dates(&records);
        if !dupes.is_empty() {
            tracing::warn!(device_code = %code, dates = ?dupes, "库存记录存在同日重复，按原样输出");
        }

        let oil_name = self
            .devices
            .resolve_oil_name(identity.device_id, &self.templates.oil_name_query);
        let path = self.output_path(&format!(
            "{}_库存报表_{}_{}",
            code,
            start.format("%Y%m%d"),
            end.format("%Y%m%d")
        ));
        let artifact = self.inventory.render_with_chart(
            &records,
            code,
            start,
            end,
            oil_name.as_deref(),
            &path,
        )?;
        Ok(artifact)
    }

    /// 逐设备生成加注明细报表
    fn generate_refueling(
        &self,
        resolved: &[(String, ResolvedDevice)],
        request: &ReportRequest,
        outcome: &mut ReportOutcome,
    ) -> ReportResult<()> {
        for (code, identity) in resolved {
            let result = self
                .records
                .fetch_refueling(identity.device_id, request.start_date, request.end_date)
                .map_err(ReportError::from)
                .and_then(|events| {
                    let path = self.output_path(&format!(
                        "{}_加注明细_{}_{}",
                        code,
                        request.start_date.format("%Y%m%d"),
                        request.end_date.format("%Y%m%d")
                    ));
                    self.refueling
                        .render(&events, code, &path)
                        .map_err(ReportError::from)
                });
            match result {
                Ok(artifact) => outcome.artifacts.push(artifact),
                Err(e) => {
                    tracing::warn!(device_code = %code, error = %e, "加注明细生成失败");
                    outcome.omissions.push(DeviceOmission {
                        device_code: code.clone(),
                        reason: OmissionReason::RenderFailed(e.to_string()),
                    });
                }
            }
        }
        Ok(())
    }

    /// 生成对账单（所有客户进同一产物，逐客户一张工作表）
    fn generate_statement(
        &self,
        resolved: &[(String, ResolvedDevice)],
        request: &ReportRequest,
        outcome: &mut ReportOutcome,
    ) -> ReportResult<()> {
        // 按客户分组；用组内第一台设备做客户名两跳解析
        let mut by_customer: BTreeMap<i64, Vec<&(String, ResolvedDevice)>> = BTreeMap::new();
        for entry in resolved {
            by_customer.entry(entry.1.customer_id).or_default().push(entry);
        }

        let mut customers = Vec::with_capacity(by_customer.len());
        for (customer_id, members) in &by_customer {
            let customer_name = self.devices.resolve_customer_name(
                members[0].1.device_id,
                &self.templates.customer_query,
            );
            let rows = self.records.fetch_statement_rows(
                *customer_id,
                request.start_date,
                request.end_date,
            )?;
            let daily_usage = self.records.fetch_daily_usage(
                *customer_id,
                request.start_date,
                request.end_date,
            )?;
            customers.push(CustomerStatement {
                customer_name,
                rows,
                daily_usage,
            });
        }

        let path = self.output_path(&format!(
            "对账单_{}_{}",
            request.start_date.format("%Y%m%d"),
            request.end_date.format("%Y%m%d")
        ));
        let artifact =
            self.statement
                .render(&customers, request.start_date, request.end_date, &path)?;
        outcome.artifacts.push(artifact);
        Ok(())
    }
}
