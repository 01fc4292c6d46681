// ==========================================
// 家具质检系统 - 驾驶舱 API
// ==========================================
// 职责: 缺陷统计与报告导出
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::defect::DateRange;
use crate::domain::types::Area;
use crate::engine::defect_stats::{DefectStatistics, DEFAULT_TOP_DEFECTS};
use crate::engine::report_filter::ReportFilter;
use crate::exporter::ReportSheet;
use crate::repository::defect_repo::DefectReportRepository;

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================

/// 驾驶舱API
///
/// 职责：
/// 1. 区间内缺陷统计（区域占比 + Top-N 缺陷）
/// 2. 区域报告导出（空区域拒绝）
/// 3. 驾驶舱全量导出
pub struct DashboardApi {
    defect_repo: Arc<DefectReportRepository>,
    config_manager: Arc<ConfigManager>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    pub fn new(defect_repo: Arc<DefectReportRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            defect_repo,
            config_manager,
        }
    }

    /// 缺陷统计
    ///
    /// # 参数
    /// - range: 可选日期闭区间；None 表示全部
    pub fn statistics(&self, range: Option<DateRange>) -> ApiResult<DefectStatistics> {
        let reports = self.defect_repo.list(range)?;
        let top_limit = self.config_manager.get_top_defects_limit().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "读取 Top-N 配置失败，使用默认值");
            DEFAULT_TOP_DEFECTS
        });

        let stats = DefectStatistics::compute(&reports, top_limit);
        tracing::debug!(total = stats.total, top_limit, "缺陷统计完成");
        Ok(stats)
    }

    /// 导出单一区域的报告
    ///
    /// # 错误
    /// - NoDataToExport: 筛选后该区域没有报告
    pub fn export_reports(
        &self,
        filter: &ReportFilter,
        area: Area,
        today: NaiveDate,
    ) -> ApiResult<ReportSheet> {
        let reports = filter.apply(&self.defect_repo.list(None)?);
        let sheet = ReportSheet::for_area(&reports, area, today).map_err(|e| {
            tracing::info!(area = %area, error = %e, "区域导出被拒绝");
            ApiError::from(e)
        })?;
        Ok(sheet)
    }

    /// 导出驾驶舱报告（区间内全部区域）
    pub fn export_dashboard(&self, range: Option<DateRange>) -> ApiResult<ReportSheet> {
        let reports = self.defect_repo.list(range)?;
        Ok(ReportSheet::for_dashboard(&reports, range))
    }
}
