// ==========================================
// 家具质检系统 - API层错误类型
// ==========================================
// 职责: 汇总仓储/台账/导出错误，转换为用户可处理的结果
// 约束: 每种失败都对应一个可区分的变体，不吞错
// ==========================================

use crate::engine::release_ledger::LedgerError;
use crate::exporter::error::ExportError;
use crate::i18n::t_in;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入校验错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 表单校验失败（带字段明细）
    #[error("表单校验失败: {reason}")]
    FormValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    /// 资源不存在（entity 区分计划与缺陷报告）
    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    // ==========================================
    // 释放台账错误
    // ==========================================
    #[error("无效的释放数量: {0}")]
    InvalidQuantity(String),

    #[error("释放数量超出计划: plan_id={plan_id}, released={released}, requested={requested}, ordered={ordered_quantity}")]
    CapacityExceeded {
        plan_id: String,
        released: i64,
        requested: i64,
        ordered_quantity: i64,
    },

    #[error("并发修改: {0}")]
    ConcurrentModification(String),

    #[error("存储失败: {0}")]
    StorageFailure(String),

    // ==========================================
    // 导出错误
    // ==========================================
    #[error("没有可导出的数据: {area}")]
    NoDataToExport { area: String },

    #[error("导出失败: {0}")]
    ExportFailed(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否可在重新读取数据后重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::ConcurrentModification(_) | ApiError::StorageFailure(_)
        )
    }

    /// 面向操作员的本地化提示
    pub fn localized_message(&self, locale: &str) -> String {
        match self {
            ApiError::InvalidQuantity(_) => t_in(locale, "release.invalid_quantity", &[]),
            ApiError::CapacityExceeded { .. } => t_in(locale, "release.capacity_exceeded", &[]),
            ApiError::ConcurrentModification(_) => {
                t_in(locale, "release.concurrent_modification", &[])
            }
            ApiError::StorageFailure(_) => t_in(locale, "release.storage_failure", &[]),
            ApiError::NotFound { entity, .. } => match entity.as_str() {
                "Plan" => t_in(locale, "release.plan_not_found", &[]),
                "DefectReport" => t_in(locale, "report.not_found", &[]),
                _ => t_in(locale, "common.error", &[]),
            },
            ApiError::NoDataToExport { area } => t_in(locale, "export.no_data", &[("area", area.as_str())]),
            ApiError::FormValidationError { reason, .. } => reason.clone(),
            _ => t_in(locale, "common.error", &[]),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                plan_id,
                expected,
                actual,
            } => ApiError::ConcurrentModification(format!(
                "计划{}已被其他用户修改（期望released={}，实际released={}）",
                plan_id, expected, actual
            )),
            RepositoryError::CapacityExceeded {
                plan_id,
                released,
                requested,
                ordered_quantity,
            } => ApiError::CapacityExceeded {
                plan_id,
                released,
                requested,
                ordered_quantity,
            },
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },
            // 与台账路径一致: 锁/查询/事务失败均为可重试的存储失败
            RepositoryError::LockError(msg) => {
                ApiError::StorageFailure(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::StorageFailure(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("检查约束违反: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 LedgerError 转换
// ==========================================
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidQuantity { input } => ApiError::InvalidQuantity(input),
            LedgerError::CapacityExceeded {
                plan_id,
                released,
                requested,
                ordered_quantity,
            } => ApiError::CapacityExceeded {
                plan_id,
                released,
                requested,
                ordered_quantity,
            },
            e @ LedgerError::ConcurrentModification { .. } => {
                ApiError::ConcurrentModification(e.to_string())
            }
            LedgerError::PlanNotFound { plan_id } => ApiError::NotFound {
                entity: "Plan".to_string(),
                id: plan_id,
            },
            LedgerError::StorageFailure(msg) => ApiError::StorageFailure(msg),
        }
    }
}

// ==========================================
// 从 ExportError 转换
// ==========================================
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoData(area) => ApiError::NoDataToExport { area },
            other => ApiError::ExportFailed(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationViolation {
    /// 字段名
    pub field: String,
    /// 违规原因
    pub reason: String,
}
