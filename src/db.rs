// ==========================================
// 家具质检系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表 (幂等)，记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// released 的上下界同时由 CHECK 约束兜底：
/// 即使绕过台账直接写库，也无法把计划写成超发状态。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS production_plan (
            plan_id TEXT PRIMARY KEY,
            area TEXT NOT NULL CHECK (area IN ('SILLAS', 'SALAS')),
            product TEXT NOT NULL,
            color TEXT NOT NULL,
            lf TEXT NOT NULL,
            pt TEXT NOT NULL,
            lp TEXT NOT NULL,
            order_no TEXT NOT NULL,
            customer TEXT NOT NULL,
            ordered_quantity INTEGER NOT NULL CHECK (ordered_quantity > 0),
            released INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            CHECK (released >= 0 AND released <= ordered_quantity)
        );

        CREATE INDEX IF NOT EXISTS idx_production_plan_area
            ON production_plan(area, created_at DESC);

        CREATE TABLE IF NOT EXISTS release_event (
            release_id TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL REFERENCES production_plan(plan_id),
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            actor TEXT NOT NULL,
            released_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_release_event_plan
            ON release_event(plan_id, released_at);

        CREATE TABLE IF NOT EXISTS defect_report (
            report_id TEXT PRIMARY KEY,
            report_date TEXT NOT NULL,
            area TEXT NOT NULL CHECK (area IN ('SILLAS', 'SALAS')),
            product TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '',
            lf TEXT NOT NULL DEFAULT '',
            pt TEXT NOT NULL DEFAULT '',
            lp TEXT NOT NULL DEFAULT '',
            order_no TEXT NOT NULL DEFAULT '',
            customer TEXT NOT NULL DEFAULT '',
            defect TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            photo_url TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_defect_report_date
            ON defect_report(report_date DESC, created_at DESC);

        CREATE TABLE IF NOT EXISTS defect_report_photo (
            photo_id TEXT PRIMARY KEY,
            report_id TEXT NOT NULL REFERENCES defect_report(report_id),
            photo_url TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_absent_before_init() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_released_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            r#"INSERT INTO production_plan (
                plan_id, area, product, color, lf, pt, lp, order_no, customer,
                ordered_quantity, released, created_at
            ) VALUES ('p1', 'SILLAS', 'X', '', '', '', '', '', '', 10, 11, '2025-01-01 00:00:00')"#,
            [],
        );
        assert!(result.is_err());
    }
}
