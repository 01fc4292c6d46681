use super::{parse_ts, PlanRepository};
use crate::domain::release::ReleaseEvent;
use crate::repository::error::RepositoryResult;
use rusqlite::params;

// ==========================================
// 释放事件查询 (只读)
// ==========================================
// 写入只走 commit_release，这里不提供单独追加/修改接口
impl PlanRepository {
    /// 查询计划的释放历史，按时间升序
    pub fn list_releases(&self, plan_id: &str) -> RepositoryResult<Vec<ReleaseEvent>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT release_id, plan_id, quantity, actor, released_at
               FROM release_event
               WHERE plan_id = ?
               ORDER BY released_at ASC, rowid ASC"#,
        )?;

        let events = stmt
            .query_map(params![plan_id], |row| {
                Ok(ReleaseEvent {
                    release_id: row.get(0)?,
                    plan_id: row.get(1)?,
                    quantity: row.get(2)?,
                    actor: row.get(3)?,
                    released_at: parse_ts(row, 4)?,
                })
            })?
            .collect::<Result<Vec<ReleaseEvent>, _>>()?;

        Ok(events)
    }

    /// 汇总计划的释放事件
    ///
    /// # 返回
    /// - `(数量合计, 事件条数)`
    pub fn release_totals(&self, plan_id: &str) -> RepositoryResult<(i64, usize)> {
        let conn = self.get_conn()?;

        let (total, count): (i64, i64) = conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0), COUNT(*) FROM release_event WHERE plan_id = ?",
            params![plan_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok((total, count as usize))
    }
}
