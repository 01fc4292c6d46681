// ==========================================
// 家具质检系统 - 缺陷报告 API
// ==========================================
// 职责: 报告录入、照片引用、浏览与筛选
// 约束: 照片引用写入失败只告警，不影响报告本身
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{DefectReportForm, FormValidator};
use crate::config::{ConfigManager, DEFAULT_LOCALE};
use crate::domain::defect::{DateRange, DefectPhoto, DefectReport, NewDefectReport};
use crate::domain::types::Area;
use crate::engine::report_filter::ReportFilter;
use crate::repository::defect_repo::DefectReportRepository;

/// 缺陷报告API
pub struct DefectApi {
    defect_repo: Arc<DefectReportRepository>,
    config_manager: Arc<ConfigManager>,
}

impl DefectApi {
    pub fn new(defect_repo: Arc<DefectReportRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            defect_repo,
            config_manager,
        }
    }

    /// 创建缺陷报告并记录照片引用
    ///
    /// # 返回
    /// - Ok(DefectReport): 已写入的报告
    /// - Err(FormValidationError): 缺少必填字段或缺陷不在区域目录中
    pub fn create_report(
        &self,
        new_report: NewDefectReport,
        photo_urls: &[String],
    ) -> ApiResult<DefectReport> {
        let new_report = FormValidator::new(self.locale()).check_new_report(new_report)?;

        let now = chrono::Local::now().naive_local();
        let report = new_report.into_report(uuid::Uuid::new_v4().to_string(), now);
        self.defect_repo.insert(&report)?;

        let mut recorded = 0usize;
        for url in photo_urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            let photo = DefectPhoto {
                photo_id: uuid::Uuid::new_v4().to_string(),
                report_id: report.report_id.clone(),
                photo_url: url.to_string(),
                created_at: now,
            };
            match self.defect_repo.insert_photo(&photo) {
                Ok(_) => recorded += 1,
                Err(e) => tracing::warn!(
                    report_id = %report.report_id,
                    photo_url = url,
                    error = %e,
                    "照片引用写入失败"
                ),
            }
        }

        tracing::info!(
            report_id = %report.report_id,
            area = %report.area,
            defect = %report.defect,
            photos = recorded,
            "缺陷报告已创建"
        );
        Ok(report)
    }

    /// 从原始表单创建报告（日期为空取 today）
    pub fn create_report_from_form(
        &self,
        form: &DefectReportForm,
        photo_urls: &[String],
        today: NaiveDate,
    ) -> ApiResult<DefectReport> {
        let new_report = FormValidator::new(self.locale()).validate_report_form(form, today)?;
        self.create_report(new_report, photo_urls)
    }

    /// 查询报告
    pub fn get_report(&self, report_id: &str) -> ApiResult<DefectReport> {
        self.defect_repo
            .find_by_id(report_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "DefectReport".to_string(),
                id: report_id.to_string(),
            })
    }

    /// 报告列表（报告日期降序，其次创建时间降序）
    pub fn list_reports(&self, range: Option<DateRange>) -> ApiResult<Vec<DefectReport>> {
        Ok(self.defect_repo.list(range)?)
    }

    /// 按条件筛选报告
    pub fn filter_reports(&self, filter: &ReportFilter) -> ApiResult<Vec<DefectReport>> {
        let reports = self.defect_repo.list(None)?;
        Ok(filter.apply(&reports))
    }

    /// 报告的照片 URL（空列表表示无照片）
    pub fn list_photos(&self, report_id: &str) -> ApiResult<Vec<String>> {
        let mut urls: Vec<String> = self
            .defect_repo
            .list_photos(report_id)?
            .into_iter()
            .map(|p| p.photo_url)
            .collect();

        // 旧数据只有单张照片字段
        if urls.is_empty() {
            if let Some(legacy) = self
                .defect_repo
                .find_by_id(report_id)?
                .and_then(|r| r.photo_url)
                .filter(|u| !u.trim().is_empty())
            {
                urls.push(legacy);
            }
        }

        Ok(urls)
    }

    /// 区域缺陷目录
    pub fn defect_catalog(&self, area: Area) -> Vec<String> {
        area.defect_catalog().iter().map(|d| d.to_string()).collect()
    }

    fn locale(&self) -> String {
        self.config_manager.get_locale().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取语言配置失败，使用默认语言");
            DEFAULT_LOCALE.to_string()
        })
    }
}
