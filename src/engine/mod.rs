// ==========================================
// 家具质检系统 - 引擎层
// ==========================================
// 职责: 实现业务规则,不拼 SQL
// 红线: Engine 不拼 SQL, 数据访问经 Repository / PlanStore
// ==========================================

pub mod defect_stats;
pub mod release_ledger;
pub mod report_filter;

// 重导出核心引擎
pub use defect_stats::{AreaStat, DefectStat, DefectStatistics, DEFAULT_TOP_DEFECTS};
pub use release_ledger::{
    parse_quantity, pending_quantity, LedgerError, LedgerResult, PlanStore, ReleaseLedger,
    ReleaseQuantity, ReleaseReceipt,
};
pub use report_filter::ReportFilter;
