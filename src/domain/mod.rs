// ==========================================
// 家具质检系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod defect;
pub mod plan;
pub mod release;
pub mod types;

// 重导出核心类型
pub use defect::{DateRange, DefectPhoto, DefectReport, NewDefectReport};
pub use plan::{NewPlan, Plan};
pub use release::{LedgerConsistency, ReleaseEvent};
pub use types::{Area, DEFECT_OTHER};
