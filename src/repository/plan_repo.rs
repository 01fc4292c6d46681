// ==========================================
// 家具质检系统 - 生产计划数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 释放事件写入与计划累计值更新必须在同一事务内
// ==========================================
// 并发控制: 条件更新 (released = 快照值 AND 未超计划)
// 影响行数为 0 时回读区分: 记录不存在 / 乐观锁冲突 / 超计划
// ==========================================

mod release;


use crate::db::TS_FORMAT;
use crate::domain::plan::Plan;
use crate::domain::release::ReleaseEvent;
use crate::domain::types::Area;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};

const PLAN_COLUMNS: &str = r#"plan_id, area, product, color, lf, pt, lp,
       order_no, customer, ordered_quantity, released, created_at"#;

// ==========================================
// PlanRepository - 生产计划仓储
// ==========================================
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    /// 创建新的PlanRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建计划
    ///
    /// # 返回
    /// - `Ok(plan_id)`: 成功
    /// - `Err`: 数据库错误（含 CHECK 约束：数量必须 > 0）
    pub fn create(&self, plan: &Plan) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO production_plan (
                plan_id, area, product, color, lf, pt, lp,
                order_no, customer, ordered_quantity, released, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &plan.plan_id,
                plan.area.to_db_str(),
                &plan.product,
                &plan.color,
                &plan.lf,
                &plan.pt,
                &plan.lp,
                &plan.order_no,
                &plan.customer,
                plan.ordered_quantity,
                plan.released,
                plan.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        Ok(plan.plan_id.clone())
    }

    /// 按plan_id查询计划
    ///
    /// # 返回
    /// - `Ok(Some(Plan))`: 找到
    /// - `Ok(None)`: 未找到
    pub fn find_by_id(&self, plan_id: &str) -> RepositoryResult<Option<Plan>> {
        let conn = self.get_conn()?;

        let plan = conn
            .query_row(
                &format!("SELECT {} FROM production_plan WHERE plan_id = ?", PLAN_COLUMNS),
                params![plan_id],
                map_plan_row,
            )
            .optional()?;

        Ok(plan)
    }

    /// 查询所有计划，按创建时间降序
    pub fn list_all(&self) -> RepositoryResult<Vec<Plan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM production_plan ORDER BY created_at DESC, rowid DESC",
            PLAN_COLUMNS
        ))?;

        let plans = stmt
            .query_map([], map_plan_row)?
            .collect::<Result<Vec<Plan>, _>>()?;

        Ok(plans)
    }

    /// 按区域查询计划，按创建时间降序
    pub fn list_by_area(&self, area: Area) -> RepositoryResult<Vec<Plan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM production_plan WHERE area = ? ORDER BY created_at DESC, rowid DESC",
            PLAN_COLUMNS
        ))?;

        let plans = stmt
            .query_map(params![area.to_db_str()], map_plan_row)?
            .collect::<Result<Vec<Plan>, _>>()?;

        Ok(plans)
    }

    /// 提交一次释放（事件写入 + 累计值推进，单事务）
    ///
    /// # 参数
    /// - `expected_released`: 调用方校验时看到的 released 快照
    /// - `event`: 待追加的释放事件
    ///
    /// # 返回
    /// - `Ok(Plan)`: 提交后的计划
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: plan_id 不存在
    /// - `RepositoryError::OptimisticLockFailure`: released 已被其他写入者推进
    /// - `RepositoryError::CapacityExceeded`: 快照一致但超出计划数量
    /// - 其他数据库错误: 事务回滚，计划保持原值
    pub fn commit_release(
        &self,
        expected_released: i64,
        event: &ReleaseEvent,
    ) -> RepositoryResult<Plan> {
        let mut conn = self.get_conn()?;
        // IMMEDIATE: 多连接写入在 BEGIN 处按 busy_timeout 排队
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rows_affected = tx.execute(
            r#"UPDATE production_plan
               SET released = released + ?1
               WHERE plan_id = ?2
                 AND released = ?3
                 AND released + ?1 <= ordered_quantity"#,
            params![event.quantity, &event.plan_id, expected_released],
        )?;

        if rows_affected == 0 {
            let current: Option<(i64, i64)> = tx
                .query_row(
                    "SELECT released, ordered_quantity FROM production_plan WHERE plan_id = ?",
                    params![&event.plan_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            return Err(match current {
                None => RepositoryError::NotFound {
                    entity: "Plan".to_string(),
                    id: event.plan_id.clone(),
                },
                Some((actual, _)) if actual != expected_released => {
                    RepositoryError::OptimisticLockFailure {
                        plan_id: event.plan_id.clone(),
                        expected: expected_released,
                        actual,
                    }
                }
                Some((released, ordered_quantity)) => RepositoryError::CapacityExceeded {
                    plan_id: event.plan_id.clone(),
                    released,
                    requested: event.quantity,
                    ordered_quantity,
                },
            });
        }

        tx.execute(
            r#"INSERT INTO release_event (
                release_id, plan_id, quantity, actor, released_at
            ) VALUES (?, ?, ?, ?, ?)"#,
            params![
                &event.release_id,
                &event.plan_id,
                event.quantity,
                &event.actor,
                event.released_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        let plan = tx.query_row(
            &format!("SELECT {} FROM production_plan WHERE plan_id = ?", PLAN_COLUMNS),
            params![&event.plan_id],
            map_plan_row,
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(plan)
    }
}

/// 映射数据库行到Plan对象
fn map_plan_row(row: &rusqlite::Row) -> rusqlite::Result<Plan> {
    let area_raw: String = row.get(1)?;
    let area = Area::parse(&area_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("未知区域: {}", area_raw).into(),
        )
    })?;

    Ok(Plan {
        plan_id: row.get(0)?,
        area,
        product: row.get(2)?,
        color: row.get(3)?,
        lf: row.get(4)?,
        pt: row.get(5)?,
        lp: row.get(6)?,
        order_no: row.get(7)?,
        customer: row.get(8)?,
        ordered_quantity: row.get(9)?,
        released: row.get(10)?,
        created_at: parse_ts(row, 11)?,
    })
}

pub(crate) fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&row.get::<_, String>(idx)?, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
