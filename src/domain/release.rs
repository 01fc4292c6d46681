// ==========================================
// 家具质检系统 - 释放事件领域模型
// ==========================================
// 红线: 只追加，不修改，不删除
// 红线: 计划的 released == 该计划全部事件 quantity 之和
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ReleaseEvent - 释放事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub release_id: String,         // 事件ID
    pub plan_id: String,            // 所属计划
    pub quantity: i64,              // 本次释放数量 (> 0)
    pub actor: String,              // 操作人
    pub released_at: NaiveDateTime, // 释放时间
}

// ==========================================
// LedgerConsistency - 台账一致性核对结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConsistency {
    pub plan_id: String,
    pub plan_released: i64, // 计划上的累计值
    pub events_total: i64,  // 事件求和
    pub event_count: usize,
}

impl LedgerConsistency {
    pub fn is_consistent(&self) -> bool {
        self.plan_released == self.events_total
    }
}
