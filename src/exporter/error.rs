// ==========================================
// 家具质检系统 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("没有可导出的报告: {0}")]
    NoData(String),

    #[error("CSV 写入失败: {0}")]
    CsvWriteError(#[from] csv::Error),

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
