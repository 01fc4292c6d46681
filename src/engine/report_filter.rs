// ==========================================
// 家具质检系统 - 报告筛选
// ==========================================
// 规则:
// - 客户 / 订单号: 忽略大小写的子串匹配
// - 报告日期: 精确匹配
// - 区域: 精确匹配
// - 空白条件视为未设置
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::defect::DefectReport;
use crate::domain::types::Area;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub customer: Option<String>,
    pub order_no: Option<String>,
    pub report_date: Option<NaiveDate>,
    pub area: Option<Area>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn order_no(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = Some(order_no.into());
        self
    }

    pub fn report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    /// 判断单条报告是否满足全部条件
    pub fn matches(&self, report: &DefectReport) -> bool {
        contains_ignore_case(&report.customer, self.customer.as_deref())
            && contains_ignore_case(&report.order_no, self.order_no.as_deref())
            && self.report_date.map_or(true, |d| report.report_date == d)
            && self.area.map_or(true, |a| report.area == a)
    }

    /// 过滤报告列表（保持原有顺序）
    pub fn apply(&self, reports: &[DefectReport]) -> Vec<DefectReport> {
        reports.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}
