// ==========================================
// 家具质检系统 - 生产计划 API
// ==========================================
// 职责: 计划录入、查询、分区展示、释放与台账核对
// 红线: 释放只经 ReleaseLedger，API 层不直接改 released
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{FormValidator, PlanForm};
use crate::config::{ConfigManager, DEFAULT_LOCALE};
use crate::domain::plan::{NewPlan, Plan};
use crate::domain::release::{LedgerConsistency, ReleaseEvent};
use crate::domain::types::Area;
use crate::engine::release_ledger::{parse_quantity, ReleaseLedger, ReleaseReceipt};
use crate::i18n::t_in;
use crate::repository::plan_repo::PlanRepository;

// ==========================================
// DTO
// ==========================================

/// 释放结果（回执 + 本地化提示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutcome {
    pub receipt: ReleaseReceipt,
    pub message: String,
}

/// 按区域分组的计划（两张表视图）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanGroup {
    pub area: Area,
    pub plans: Vec<Plan>,
}

// ==========================================
// PlanApi - 生产计划 API
// ==========================================

/// 生产计划API
///
/// 职责：
/// 1. 计划录入（表单校验后写入，released 从 0 开始）
/// 2. 计划查询（全部 / 按区域 / 分组）
/// 3. 释放（解析输入 -> 台账原子提交 -> 本地化提示）
/// 4. 台账一致性核对
pub struct PlanApi {
    plan_repo: Arc<PlanRepository>,
    ledger: Arc<ReleaseLedger>,
    config_manager: Arc<ConfigManager>,
}

impl PlanApi {
    /// 创建新的PlanApi实例
    pub fn new(
        plan_repo: Arc<PlanRepository>,
        ledger: Arc<ReleaseLedger>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            plan_repo,
            ledger,
            config_manager,
        }
    }

    // ==========================================
    // 计划录入与查询
    // ==========================================

    /// 创建计划
    ///
    /// # 返回
    /// - Ok(Plan): 新建的计划（released = 0）
    /// - Err(ApiError::FormValidationError): 有字段为空或数量 <= 0
    pub fn create_plan(&self, new_plan: NewPlan) -> ApiResult<Plan> {
        let new_plan = FormValidator::new(self.locale()).check_new_plan(new_plan)?;

        let plan = new_plan.into_plan(
            uuid::Uuid::new_v4().to_string(),
            chrono::Local::now().naive_local(),
        );
        self.plan_repo.create(&plan)?;

        tracing::info!(
            plan_id = %plan.plan_id,
            area = %plan.area,
            ordered_quantity = plan.ordered_quantity,
            "计划已创建"
        );
        Ok(plan)
    }

    /// 从原始表单创建计划
    pub fn create_plan_from_form(&self, form: &PlanForm) -> ApiResult<Plan> {
        let new_plan = FormValidator::new(self.locale()).validate_plan_form(form)?;
        self.create_plan(new_plan)
    }

    /// 全部计划（新建在前）
    pub fn list_plans(&self) -> ApiResult<Vec<Plan>> {
        Ok(self.plan_repo.list_all()?)
    }

    /// 指定区域的计划（新建在前）
    pub fn list_plans_by_area(&self, area: Area) -> ApiResult<Vec<Plan>> {
        Ok(self.plan_repo.list_by_area(area)?)
    }

    /// 查询单个计划
    pub fn get_plan(&self, plan_id: &str) -> ApiResult<Plan> {
        self.plan_repo
            .find_by_id(plan_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "Plan".to_string(),
                id: plan_id.to_string(),
            })
    }

    /// 按区域分组（SILLAS 在前，空组不返回）
    pub fn grouped_by_area(&self) -> ApiResult<Vec<PlanGroup>> {
        let plans = self.plan_repo.list_all()?;

        Ok(Area::ALL
            .iter()
            .map(|area| PlanGroup {
                area: *area,
                plans: plans.iter().filter(|p| p.area == *area).cloned().collect(),
            })
            .filter(|group| !group.plans.is_empty())
            .collect())
    }

    // ==========================================
    // 释放
    // ==========================================

    /// 释放计划数量
    ///
    /// # 参数
    /// - plan_id: 计划ID
    /// - quantity_text: 操作员输入的数量文本
    /// - actor: 操作人（为空时使用配置的默认操作人）
    ///
    /// # 错误
    /// - InvalidQuantity / CapacityExceeded: 需要新的输入
    /// - ConcurrentModification / StorageFailure: 重新读取后可重试
    /// - NotFound: 计划不存在
    pub async fn release(
        &self,
        plan_id: &str,
        quantity_text: &str,
        actor: Option<&str>,
    ) -> ApiResult<ReleaseOutcome> {
        let quantity = parse_quantity(quantity_text)?;

        let actor = match actor.map(str::trim).filter(|a| !a.is_empty()) {
            Some(a) => a.to_string(),
            None => self
                .config_manager
                .get_default_actor()
                .map_err(|e| ApiError::InternalError(format!("读取默认操作人失败: {}", e)))?,
        };

        let receipt = self
            .ledger
            .release_by_id(plan_id, quantity.get(), &actor)
            .await?;

        let released_text = receipt.event.quantity.to_string();
        let pending_text = receipt.pending.to_string();
        let message = t_in(
            &self.locale(),
            "release.success",
            &[
                ("quantity", released_text.as_str()),
                ("pending", pending_text.as_str()),
            ],
        );

        Ok(ReleaseOutcome { receipt, message })
    }

    /// 计划的释放历史（按时间正序）
    pub fn list_releases(&self, plan_id: &str) -> ApiResult<Vec<ReleaseEvent>> {
        self.get_plan(plan_id)?;
        Ok(self.plan_repo.list_releases(plan_id)?)
    }

    /// 核对计划累计值与事件求和
    pub fn verify_ledger(&self, plan_id: &str) -> ApiResult<LedgerConsistency> {
        let plan = self.get_plan(plan_id)?;
        let (events_total, event_count) = self.plan_repo.release_totals(plan_id)?;

        let consistency = LedgerConsistency {
            plan_id: plan.plan_id,
            plan_released: plan.released,
            events_total,
            event_count,
        };

        if !consistency.is_consistent() {
            tracing::error!(
                plan_id = %consistency.plan_id,
                plan_released = consistency.plan_released,
                events_total = consistency.events_total,
                "台账不一致"
            );
        }

        Ok(consistency)
    }

    /// 按当前配置语言渲染错误提示
    pub fn error_message(&self, err: &ApiError) -> String {
        err.localized_message(&self.locale())
    }

    fn locale(&self) -> String {
        self.config_manager.get_locale().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取语言配置失败，使用默认语言");
            DEFAULT_LOCALE.to_string()
        })
    }
}
