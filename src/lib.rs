// ==========================================
// 家具质检系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 车间缺陷记录 + 生产计划释放台账
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导出层 - CSV 表格
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域
pub use domain::{
    Area, DateRange, DefectPhoto, DefectReport, LedgerConsistency, NewDefectReport, NewPlan,
    Plan, ReleaseEvent,
};

// 引擎
pub use engine::{
    DefectStatistics, LedgerError, PlanStore, ReleaseLedger, ReleaseQuantity, ReleaseReceipt,
    ReportFilter,
};

// API
pub use api::{ApiError, DashboardApi, DefectApi, PlanApi};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "Control de Calidad - Muebles";
