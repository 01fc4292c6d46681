// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、API 装配、测试数据生成
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use furniture_qc::api::{DashboardApi, DefectApi, PlanApi};
use furniture_qc::config::ConfigManager;
use furniture_qc::db::{init_schema, open_sqlite_connection};
use furniture_qc::domain::{Area, DefectReport, NewDefectReport, NewPlan};
use furniture_qc::engine::{PlanStore, ReleaseLedger};
use furniture_qc::repository::{DefectReportRepository, PlanRepository};
use rusqlite::Connection;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开一个新的共享连接
pub fn open_shared(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_sqlite_connection(db_path)?)))
}

// ==========================================
// ApiTestEnv - API 测试环境
// ==========================================
pub struct ApiTestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub plan_repo: Arc<PlanRepository>,
    pub defect_repo: Arc<DefectReportRepository>,
    pub config_manager: Arc<ConfigManager>,
    pub ledger: Arc<ReleaseLedger>,
    pub plan_api: PlanApi,
    pub defect_api: DefectApi,
    pub dashboard_api: DashboardApi,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (temp_file, db_path) = create_test_db()?;
        let conn = open_shared(&db_path)?;

        let plan_repo = Arc::new(PlanRepository::new(conn.clone()));
        let defect_repo = Arc::new(DefectReportRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        let store: Arc<dyn PlanStore> = plan_repo.clone();
        let ledger = Arc::new(ReleaseLedger::new(store));

        let plan_api = PlanApi::new(plan_repo.clone(), ledger.clone(), config_manager.clone());
        let defect_api = DefectApi::new(defect_repo.clone(), config_manager.clone());
        let dashboard_api = DashboardApi::new(defect_repo.clone(), config_manager.clone());

        Ok(Self {
            _temp_file: temp_file,
            db_path,
            plan_repo,
            defect_repo,
            config_manager,
            ledger,
            plan_api,
            defect_api,
            dashboard_api,
        })
    }
}

// ==========================================
// 测试数据
// ==========================================

pub fn new_plan(area: Area, quantity: i64) -> NewPlan {
    NewPlan {
        area,
        product: "SILLA ROMA".to_string(),
        color: "NOGAL".to_string(),
        lf: "LF-10".to_string(),
        pt: "PT-20".to_string(),
        lp: "LP-30".to_string(),
        order_no: "PED-1001".to_string(),
        customer: "Muebles del Norte".to_string(),
        ordered_quantity: quantity,
    }
}

pub fn new_report(area: Area, date: NaiveDate, defect: &str) -> NewDefectReport {
    NewDefectReport {
        report_date: date,
        area,
        product: "SOFA MILAN".to_string(),
        color: "GRIS".to_string(),
        lf: "LF-1".to_string(),
        pt: "PT-1".to_string(),
        lp: "LP-1".to_string(),
        order_no: "PED-2001".to_string(),
        customer: "Casa Bella".to_string(),
        defect: defect.to_string(),
        description: "detectado en línea".to_string(),
    }
}

pub fn report_with(
    id: &str,
    area: Area,
    date: NaiveDate,
    defect: &str,
    customer: &str,
    order_no: &str,
) -> DefectReport {
    let mut report = new_report(area, date, defect).into_report(id.to_string(), ts(date));
    report.customer = customer.to_string();
    report.order_no = order_no.to_string();
    report
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn ts(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(8, 0, 0).unwrap()
}
