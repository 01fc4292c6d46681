// ==========================================
// 家具质检系统 - 缺陷报告数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 表: defect_report / defect_report_photo
// ==========================================

use crate::db::{DATE_FORMAT, TS_FORMAT};
use crate::domain::defect::{DateRange, DefectPhoto, DefectReport};
use crate::domain::types::Area;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::plan_repo::parse_ts;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const REPORT_COLUMNS: &str = r#"report_id, report_date, area, product, color, lf, pt, lp,
       order_no, customer, defect, description, photo_url, created_at"#;

// ==========================================
// DefectReportRepository - 缺陷报告仓储
// ==========================================
pub struct DefectReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DefectReportRepository {
    /// 创建新的DefectReportRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入缺陷报告
    pub fn insert(&self, report: &DefectReport) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO defect_report (
                report_id, report_date, area, product, color, lf, pt, lp,
                order_no, customer, defect, description, photo_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &report.report_id,
                report.report_date.format(DATE_FORMAT).to_string(),
                report.area.to_db_str(),
                &report.product,
                &report.color,
                &report.lf,
                &report.pt,
                &report.lp,
                &report.order_no,
                &report.customer,
                &report.defect,
                &report.description,
                &report.photo_url,
                report.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(report.report_id.clone())
    }

    /// 按ID查询报告
    pub fn find_by_id(&self, report_id: &str) -> RepositoryResult<Option<DefectReport>> {
        let conn = self.get_conn()?;

        let report = conn
            .query_row(
                &format!("SELECT {} FROM defect_report WHERE report_id = ?", REPORT_COLUMNS),
                params![report_id],
                map_report_row,
            )
            .optional()?;

        Ok(report)
    }

    /// 查询报告列表
    ///
    /// # 参数
    /// - `range`: 可选日期闭区间 (按 report_date 过滤)
    ///
    /// # 返回
    /// - 按报告日期降序、创建时间降序
    pub fn list(&self, range: Option<DateRange>) -> RepositoryResult<Vec<DefectReport>> {
        let conn = self.get_conn()?;

        let reports = match range {
            Some(range) => {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {} FROM defect_report
                       WHERE report_date >= ?1 AND report_date <= ?2
                       ORDER BY report_date DESC, created_at DESC, rowid DESC"#,
                    REPORT_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![
                        range.start.format(DATE_FORMAT).to_string(),
                        range.end.format(DATE_FORMAT).to_string(),
                    ],
                    map_report_row,
                )?;
                rows.collect::<Result<Vec<DefectReport>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {} FROM defect_report
                       ORDER BY report_date DESC, created_at DESC, rowid DESC"#,
                    REPORT_COLUMNS
                ))?;
                let rows = stmt.query_map([], map_report_row)?;
                rows.collect::<Result<Vec<DefectReport>, _>>()?
            }
        };

        Ok(reports)
    }

    /// 追加照片引用
    pub fn insert_photo(&self, photo: &DefectPhoto) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO defect_report_photo (photo_id, report_id, photo_url, created_at)
               VALUES (?, ?, ?, ?)"#,
            params![
                &photo.photo_id,
                &photo.report_id,
                &photo.photo_url,
                photo.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(photo.photo_id.clone())
    }

    /// 查询报告的照片引用，按写入顺序
    pub fn list_photos(&self, report_id: &str) -> RepositoryResult<Vec<DefectPhoto>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT photo_id, report_id, photo_url, created_at
               FROM defect_report_photo
               WHERE report_id = ?
               ORDER BY created_at ASC, rowid ASC"#,
        )?;

        let photos = stmt
            .query_map(params![report_id], |row| {
                Ok(DefectPhoto {
                    photo_id: row.get(0)?,
                    report_id: row.get(1)?,
                    photo_url: row.get(2)?,
                    created_at: parse_ts(row, 3)?,
                })
            })?
            .collect::<Result<Vec<DefectPhoto>, _>>()?;

        Ok(photos)
    }
}

/// 映射数据库行到DefectReport对象
fn map_report_row(row: &rusqlite::Row) -> rusqlite::Result<DefectReport> {
    let date_raw: String = row.get(1)?;
    let report_date = NaiveDate::parse_from_str(&date_raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let area_raw: String = row.get(2)?;
    let area = Area::parse(&area_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("未知区域: {}", area_raw).into(),
        )
    })?;

    Ok(DefectReport {
        report_id: row.get(0)?,
        report_date,
        area,
        product: row.get(3)?,
        color: row.get(4)?,
        lf: row.get(5)?,
        pt: row.get(6)?,
        lp: row.get(7)?,
        order_no: row.get(8)?,
        customer: row.get(9)?,
        defect: row.get(10)?,
        description: row.get(11)?,
        photo_url: row.get(12)?,
        created_at: parse_ts(row, 13)?,
    })
}
