// ==========================================
// 家具质检系统 - 应用状态
// ==========================================
// 职责: 持有共享数据库连接，装配仓储/台账/API
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, DefectApi, PlanApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::release_ledger::{PlanStore, ReleaseLedger};
use crate::repository::{DefectReportRepository, PlanRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FURNITURE_QC_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个连接；释放的原子性由仓储内事务保证
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 生产计划API
    pub plan_api: Arc<PlanApi>,

    /// 缺陷报告API
    pub defect_api: Arc<DefectApi>,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    ///
    /// # 返回
    /// - Ok(AppState): 初始化成功
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository / Engine
        // ==========================================
        let plan_repo = Arc::new(PlanRepository::new(conn.clone()));
        let defect_repo = Arc::new(DefectReportRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let store: Arc<dyn PlanStore> = plan_repo.clone();
        let ledger = Arc::new(ReleaseLedger::new(store));

        // ==========================================
        // API
        // ==========================================
        let plan_api = Arc::new(PlanApi::new(plan_repo, ledger, config_manager.clone()));
        let defect_api = Arc::new(DefectApi::new(defect_repo.clone(), config_manager.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(defect_repo, config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            plan_api,
            defect_api,
            dashboard_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 `FURNITURE_QC_DB_PATH` > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./furniture_qc.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("furniture-qc");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("furniture_qc.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}
