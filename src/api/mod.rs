// ==========================================
// 家具质检系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行入口调用
// ==========================================

pub mod dashboard_api;
pub mod defect_api;
pub mod error;
pub mod plan_api;
pub mod validator;

// 重导出核心类型
pub use dashboard_api::DashboardApi;
pub use defect_api::DefectApi;
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use plan_api::{PlanApi, PlanGroup, ReleaseOutcome};
pub use validator::{DefectReportForm, FormValidator, PlanForm};
