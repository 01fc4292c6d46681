// ==========================================
// 家具质检系统 - 表单校验器
// ==========================================
// 职责: 操作员表单 -> 已校验的领域输入
// 红线: 校验失败不产生任何写入
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::defect::NewDefectReport;
use crate::domain::plan::NewPlan;
use crate::domain::types::Area;
use crate::i18n::t_in;

// ==========================================
// 表单 DTO (全部为原始文本)
// ==========================================

/// 计划录入表单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanForm {
    pub area: String,
    pub quantity: String,
    pub product: String,
    pub color: String,
    pub lf: String,
    pub pt: String,
    pub lp: String,
    pub order_no: String,
    pub customer: String,
}

/// 缺陷报告录入表单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectReportForm {
    pub report_date: Option<NaiveDate>, // 为空时取当天
    pub area: String,
    pub product: String,
    pub color: String,
    pub lf: String,
    pub pt: String,
    pub lp: String,
    pub order_no: String,
    pub customer: String,
    pub defect: String,
    pub description: String,
}

// ==========================================
// FormValidator - 表单校验器
// ==========================================

/// 表单校验器
///
/// 收集全部违规后一次性返回 `FormValidationError`，
/// `reason` 为按 `locale` 本地化的提示
pub struct FormValidator {
    locale: String,
}

impl FormValidator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    /// 校验计划表单：全部字段必填，数量为正整数
    pub fn validate_plan_form(&self, form: &PlanForm) -> ApiResult<NewPlan> {
        let mut violations = Vec::new();

        let text_fields = [
            ("product", &form.product),
            ("color", &form.color),
            ("lf", &form.lf),
            ("pt", &form.pt),
            ("lp", &form.lp),
            ("order_no", &form.order_no),
            ("customer", &form.customer),
        ];
        for (field, value) in text_fields {
            if value.trim().is_empty() {
                violations.push(violation(field, "不能为空"));
            }
        }

        let area = check_area(&form.area, &mut violations);

        let quantity = match form.quantity.trim() {
            "" => {
                violations.push(violation("quantity", "不能为空"));
                None
            }
            raw => match raw.parse::<i64>() {
                Ok(q) if q > 0 => Some(q),
                _ => {
                    violations.push(violation("quantity", "必须为正整数"));
                    None
                }
            },
        };

        match (area, quantity) {
            (Some(area), Some(ordered_quantity)) if violations.is_empty() => Ok(NewPlan {
                area,
                product: form.product.trim().to_string(),
                color: form.color.trim().to_string(),
                lf: form.lf.trim().to_string(),
                pt: form.pt.trim().to_string(),
                lp: form.lp.trim().to_string(),
                order_no: form.order_no.trim().to_string(),
                customer: form.customer.trim().to_string(),
                ordered_quantity,
            }),
            _ => Err(self.plan_error(violations)),
        }
    }

    /// 校验已构造的计划输入（绕过表单直接调用 API 时使用）
    ///
    /// # 返回
    /// - Ok(NewPlan): 文本字段去除首尾空白后的输入，按此写库
    pub fn check_new_plan(&self, plan: NewPlan) -> ApiResult<NewPlan> {
        let plan = NewPlan {
            product: plan.product.trim().to_string(),
            color: plan.color.trim().to_string(),
            lf: plan.lf.trim().to_string(),
            pt: plan.pt.trim().to_string(),
            lp: plan.lp.trim().to_string(),
            order_no: plan.order_no.trim().to_string(),
            customer: plan.customer.trim().to_string(),
            ..plan
        };

        let mut violations = Vec::new();
        let text_fields = [
            ("product", &plan.product),
            ("color", &plan.color),
            ("lf", &plan.lf),
            ("pt", &plan.pt),
            ("lp", &plan.lp),
            ("order_no", &plan.order_no),
            ("customer", &plan.customer),
        ];
        for (field, value) in text_fields {
            if value.is_empty() {
                violations.push(violation(field, "不能为空"));
            }
        }
        if plan.ordered_quantity <= 0 {
            violations.push(violation("quantity", "必须为正整数"));
        }

        if violations.is_empty() {
            Ok(plan)
        } else {
            Err(self.plan_error(violations))
        }
    }

    /// 校验缺陷报告表单
    ///
    /// 必填: area / product / defect；defect 必须属于该区域目录
    pub fn validate_report_form(
        &self,
        form: &DefectReportForm,
        today: NaiveDate,
    ) -> ApiResult<NewDefectReport> {
        let mut violations = Vec::new();

        let area = check_area(&form.area, &mut violations);
        if form.product.trim().is_empty() {
            violations.push(violation("product", "不能为空"));
        }
        if form.defect.trim().is_empty() {
            violations.push(violation("defect", "不能为空"));
        } else if let Some(area) = area {
            if !area.accepts_defect(&form.defect) {
                violations.push(violation(
                    "defect",
                    &format!("{} 不在 {} 的缺陷目录中", form.defect.trim(), area),
                ));
            }
        }

        match area {
            Some(area) if violations.is_empty() => Ok(NewDefectReport {
                report_date: form.report_date.unwrap_or(today),
                area,
                product: form.product.trim().to_string(),
                color: form.color.trim().to_string(),
                lf: form.lf.trim().to_string(),
                pt: form.pt.trim().to_string(),
                lp: form.lp.trim().to_string(),
                order_no: form.order_no.trim().to_string(),
                customer: form.customer.trim().to_string(),
                defect: form.defect.trim().to_string(),
                description: form.description.trim().to_string(),
            }),
            _ => Err(self.report_error(violations)),
        }
    }

    /// 校验已构造的报告输入
    ///
    /// # 返回
    /// - Ok(NewDefectReport): 去除首尾空白后的输入（defect 与目录项逐字一致）
    pub fn check_new_report(&self, report: NewDefectReport) -> ApiResult<NewDefectReport> {
        let report = NewDefectReport {
            product: report.product.trim().to_string(),
            color: report.color.trim().to_string(),
            lf: report.lf.trim().to_string(),
            pt: report.pt.trim().to_string(),
            lp: report.lp.trim().to_string(),
            order_no: report.order_no.trim().to_string(),
            customer: report.customer.trim().to_string(),
            defect: report.defect.trim().to_string(),
            description: report.description.trim().to_string(),
            ..report
        };

        let mut violations = Vec::new();
        if report.product.is_empty() {
            violations.push(violation("product", "不能为空"));
        }
        if report.defect.is_empty() {
            violations.push(violation("defect", "不能为空"));
        } else if !report.area.accepts_defect(&report.defect) {
            violations.push(violation(
                "defect",
                &format!("{} 不在 {} 的缺陷目录中", report.defect, report.area),
            ));
        }

        if violations.is_empty() {
            Ok(report)
        } else {
            Err(self.report_error(violations))
        }
    }

    fn plan_error(&self, violations: Vec<ValidationViolation>) -> ApiError {
        let key = if violations.iter().all(|v| v.field == "quantity") {
            "plan.invalid_quantity"
        } else {
            "plan.incomplete"
        };
        ApiError::FormValidationError {
            reason: t_in(&self.locale, key, &[]),
            violations,
        }
    }

    fn report_error(&self, violations: Vec<ValidationViolation>) -> ApiError {
        ApiError::FormValidationError {
            reason: t_in(&self.locale, "report.missing_required", &[]),
            violations,
        }
    }
}

fn check_area(raw: &str, violations: &mut Vec<ValidationViolation>) -> Option<Area> {
    if raw.trim().is_empty() {
        violations.push(violation("area", "不能为空"));
        return None;
    }
    let area = Area::parse(raw);
    if area.is_none() {
        violations.push(violation("area", &format!("未知区域: {}", raw.trim())));
    }
    area
}

fn violation(field: &str, reason: &str) -> ValidationViolation {
    ValidationViolation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
