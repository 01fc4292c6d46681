// ==========================================
// 家具质检系统 - 导出层
// ==========================================
// 职责: 将缺陷报告投影为表格行并写出 CSV
// ==========================================

pub mod error;
pub mod report_exporter;

// 重导出核心类型
pub use error::{ExportError, ExportResult};
pub use report_exporter::ReportSheet;
