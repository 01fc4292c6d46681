// ==========================================
// 家具质检系统 - 释放台账引擎
// ==========================================
// 职责: 校验并持久化针对生产计划的增量释放
// 红线: 计划累计值与释放事件必须同时生效或同时不生效
// 红线: 0 <= released <= ordered_quantity
// ==========================================
// 并发: 存储层以 "released = 快照值" 作为写入条件，
//       快照过期时返回 ConcurrentModification，由调用方重新读取后重试
// ==========================================

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::plan::Plan;
use crate::domain::release::ReleaseEvent;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::plan_repo::PlanRepository;

// ==========================================
// LedgerError - 台账错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// 数量不是正整数
    #[error("无效的释放数量: {input}")]
    InvalidQuantity { input: String },

    /// 释放后将超出计划数量
    #[error("释放数量超出计划: plan_id={plan_id}, released={released}, requested={requested}, ordered={ordered_quantity}")]
    CapacityExceeded {
        plan_id: String,
        released: i64,
        requested: i64,
        ordered_quantity: i64,
    },

    /// 校验后计划已被其他写入者修改
    #[error("计划已被并发修改: plan_id={plan_id}, expected_released={expected}, actual_released={actual}")]
    ConcurrentModification {
        plan_id: String,
        expected: i64,
        actual: i64,
    },

    #[error("计划不存在: plan_id={plan_id}")]
    PlanNotFound { plan_id: String },

    /// 底层写入失败（事务已回滚）
    #[error("存储失败: {0}")]
    StorageFailure(String),
}

impl LedgerError {
    /// 是否可在重新读取计划后重试
    ///
    /// InvalidQuantity / CapacityExceeded 需要新的输入，不可直接重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::StorageFailure(_) | LedgerError::ConcurrentModification { .. }
        )
    }
}

impl From<RepositoryError> for LedgerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                plan_id,
                expected,
                actual,
            } => LedgerError::ConcurrentModification {
                plan_id,
                expected,
                actual,
            },
            RepositoryError::CapacityExceeded {
                plan_id,
                released,
                requested,
                ordered_quantity,
            } => LedgerError::CapacityExceeded {
                plan_id,
                released,
                requested,
                ordered_quantity,
            },
            RepositoryError::NotFound { id, .. } => LedgerError::PlanNotFound { plan_id: id },
            other => LedgerError::StorageFailure(other.to_string()),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// ==========================================
// ReleaseQuantity - 已校验的释放数量 (正整数)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReleaseQuantity(i64);

impl ReleaseQuantity {
    pub fn new(value: i64) -> LedgerResult<Self> {
        if value <= 0 {
            return Err(LedgerError::InvalidQuantity {
                input: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for ReleaseQuantity {
    type Err = LedgerError;

    /// 解析操作员输入：去除首尾空白后必须是十进制正整数
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed.parse().map_err(|_| LedgerError::InvalidQuantity {
            input: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for ReleaseQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 解析释放数量输入
pub fn parse_quantity(input: &str) -> LedgerResult<ReleaseQuantity> {
    input.parse()
}

/// 待释放数量（纯函数）
pub fn pending_quantity(plan: &Plan) -> i64 {
    plan.ordered_quantity - plan.released
}

// ==========================================
// PlanStore - 台账存储抽象
// ==========================================
// 实现者必须保证 append_release_event_and_update_plan 的原子性：
// 事件追加与累计值推进要么全部生效，要么全部不生效
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// 按ID读取计划快照
    async fn get_plan(&self, plan_id: &str) -> RepositoryResult<Option<Plan>>;

    /// 原子地追加事件并推进累计值
    ///
    /// 仅当当前 released == `expected_released` 且推进后不超计划时写入
    async fn append_release_event_and_update_plan(
        &self,
        expected_released: i64,
        event: &ReleaseEvent,
    ) -> RepositoryResult<Plan>;
}

#[async_trait]
impl PlanStore for PlanRepository {
    async fn get_plan(&self, plan_id: &str) -> RepositoryResult<Option<Plan>> {
        self.find_by_id(plan_id)
    }

    async fn append_release_event_and_update_plan(
        &self,
        expected_released: i64,
        event: &ReleaseEvent,
    ) -> RepositoryResult<Plan> {
        self.commit_release(expected_released, event)
    }
}

// ==========================================
// ReleaseReceipt - 释放成功回执
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseReceipt {
    pub plan: Plan,          // 提交后的计划
    pub event: ReleaseEvent, // 新追加的事件
    pub pending: i64,        // 提交后的待释放数量
}

// ==========================================
// ReleaseLedger - 释放台账
// ==========================================
pub struct ReleaseLedger {
    store: Arc<dyn PlanStore>,
}

impl ReleaseLedger {
    /// 创建台账（存储句柄由调用方注入）
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }

    /// 待释放数量
    pub fn pending_quantity(plan: &Plan) -> i64 {
        pending_quantity(plan)
    }

    /// 针对计划快照申请释放
    ///
    /// # 参数
    /// - `plan`: 调用方持有的计划快照
    /// - `quantity`: 申请数量（必须为正整数）
    /// - `actor`: 操作人
    ///
    /// # 返回
    /// - `Ok(ReleaseReceipt)`: 提交后的计划与新事件
    ///
    /// # 错误
    /// - `InvalidQuantity`: 数量 <= 0
    /// - `CapacityExceeded`: released + quantity > ordered_quantity，不做任何写入
    /// - `ConcurrentModification`: 快照已过期
    /// - `StorageFailure`: 写入失败，计划保持原值
    pub async fn request_release(
        &self,
        plan: &Plan,
        quantity: i64,
        actor: &str,
    ) -> LedgerResult<ReleaseReceipt> {
        let quantity = ReleaseQuantity::new(quantity).map_err(|e| {
            tracing::warn!(plan_id = %plan.plan_id, quantity, "释放数量无效");
            e
        })?;

        if !plan.can_release(quantity.get()) {
            tracing::warn!(
                plan_id = %plan.plan_id,
                released = plan.released,
                requested = quantity.get(),
                ordered = plan.ordered_quantity,
                "释放数量超出计划"
            );
            return Err(LedgerError::CapacityExceeded {
                plan_id: plan.plan_id.clone(),
                released: plan.released,
                requested: quantity.get(),
                ordered_quantity: plan.ordered_quantity,
            });
        }

        let event = ReleaseEvent {
            release_id: Uuid::new_v4().to_string(),
            plan_id: plan.plan_id.clone(),
            quantity: quantity.get(),
            actor: actor.to_string(),
            released_at: Local::now().naive_local(),
        };

        let updated = self
            .store
            .append_release_event_and_update_plan(plan.released, &event)
            .await
            .map_err(|e| {
                let err = LedgerError::from(e);
                tracing::warn!(plan_id = %plan.plan_id, error = %err, "释放提交失败");
                err
            })?;

        let pending = pending_quantity(&updated);
        tracing::info!(
            plan_id = %updated.plan_id,
            release_id = %event.release_id,
            quantity = event.quantity,
            released = updated.released,
            pending,
            actor = %event.actor,
            "释放已记录"
        );

        Ok(ReleaseReceipt {
            plan: updated,
            event,
            pending,
        })
    }

    /// 按计划ID释放：先读取最新快照，再走 request_release
    pub async fn release_by_id(
        &self,
        plan_id: &str,
        quantity: i64,
        actor: &str,
    ) -> LedgerResult<ReleaseReceipt> {
        let plan = self
            .store
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| LedgerError::PlanNotFound {
                plan_id: plan_id.to_string(),
            })?;

        self.request_release(&plan, quantity, actor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::NewPlan;
    use crate::domain::types::Area;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ==========================================
    // 内存存储 (测试替身)
    // ==========================================
    #[derive(Default)]
    struct MemoryStore {
        plans: Mutex<HashMap<String, Plan>>,
        events: Mutex<Vec<ReleaseEvent>>,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn with_plan(plan: Plan) -> Self {
            let store = Self::default();
            store.plans.lock().unwrap().insert(plan.plan_id.clone(), plan);
            store
        }

        fn failing(plan: Plan) -> Self {
            let mut store = Self::with_plan(plan);
            store.fail_writes = true;
            store
        }

        fn released(&self, plan_id: &str) -> i64 {
            self.plans.lock().unwrap()[plan_id].released
        }

        fn event_count(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PlanStore for MemoryStore {
        async fn get_plan(&self, plan_id: &str) -> RepositoryResult<Option<Plan>> {
            Ok(self.plans.lock().unwrap().get(plan_id).cloned())
        }

        async fn append_release_event_and_update_plan(
            &self,
            expected_released: i64,
            event: &ReleaseEvent,
        ) -> RepositoryResult<Plan> {
            if self.fail_writes {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }

            let mut plans = self.plans.lock().unwrap();
            let plan = plans.get_mut(&event.plan_id).ok_or_else(|| RepositoryError::NotFound {
                entity: "Plan".to_string(),
                id: event.plan_id.clone(),
            })?;

            if plan.released != expected_released {
                return Err(RepositoryError::OptimisticLockFailure {
                    plan_id: plan.plan_id.clone(),
                    expected: expected_released,
                    actual: plan.released,
                });
            }
            if plan.released + event.quantity > plan.ordered_quantity {
                return Err(RepositoryError::CapacityExceeded {
                    plan_id: plan.plan_id.clone(),
                    released: plan.released,
                    requested: event.quantity,
                    ordered_quantity: plan.ordered_quantity,
                });
            }

            plan.released += event.quantity;
            self.events.lock().unwrap().push(event.clone());
            Ok(plan.clone())
        }
    }

    fn plan(ordered: i64, released: i64) -> Plan {
        let mut p = NewPlan {
            area: Area::Sillas,
            product: "SILLA ALBA".to_string(),
            color: "BLANCO".to_string(),
            lf: "LF".to_string(),
            pt: "PT-33".to_string(),
            lp: "LP".to_string(),
            order_no: "PED-33".to_string(),
            customer: "CASA".to_string(),
            ordered_quantity: ordered,
        }
        .into_plan(
            "plan-1".to_string(),
            NaiveDate::from_ymd_opt(2025, 5, 2)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap(),
        );
        p.released = released;
        p
    }

    fn ledger_with(store: Arc<MemoryStore>) -> ReleaseLedger {
        ReleaseLedger::new(store)
    }

    #[tokio::test]
    async fn test_release_within_capacity_reaches_full() {
        let store = Arc::new(MemoryStore::with_plan(plan(100, 90)));
        let ledger = ledger_with(store.clone());

        let receipt = ledger
            .request_release(&plan(100, 90), 10, "capturista")
            .await
            .unwrap();

        assert_eq!(receipt.plan.released, 100);
        assert_eq!(receipt.pending, 0);
        assert_eq!(receipt.event.quantity, 10);
        assert_eq!(receipt.event.actor, "capturista");
        assert_eq!(store.event_count(), 1);
    }

    #[tokio::test]
    async fn test_release_over_capacity_is_rejected_without_write() {
        let store = Arc::new(MemoryStore::with_plan(plan(100, 90)));
        let ledger = ledger_with(store.clone());

        let err = ledger
            .request_release(&plan(100, 90), 15, "capturista")
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::CapacityExceeded { released: 90, requested: 15, .. }));
        assert!(!err.is_retryable());
        assert_eq!(store.released("plan-1"), 90);
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_quantities() {
        let store = Arc::new(MemoryStore::with_plan(plan(100, 0)));
        let ledger = ledger_with(store.clone());

        for q in [0, -5] {
            let err = ledger.request_release(&plan(100, 0), q, "capturista").await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidQuantity { .. }));
        }
        assert_eq!(store.released("plan-1"), 0);
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn test_sequence_of_releases_sums_up() {
        let store = Arc::new(MemoryStore::with_plan(plan(50, 0)));
        let ledger = ledger_with(store.clone());

        let mut total = 0;
        for q in [5, 12, 1, 20, 12] {
            let receipt = ledger.release_by_id("plan-1", q, "op").await.unwrap();
            total += q;
            assert_eq!(receipt.plan.released, total);
            assert!(receipt.plan.released <= receipt.plan.ordered_quantity);
        }

        assert_eq!(store.released("plan-1"), 50);
        let sum: i64 = store.events.lock().unwrap().iter().map(|e| e.quantity).sum();
        assert_eq!(sum, 50);
    }

    #[tokio::test]
    async fn test_stale_snapshot_reports_concurrent_modification() {
        let store = Arc::new(MemoryStore::with_plan(plan(100, 0)));
        let ledger = ledger_with(store.clone());
        let snapshot = plan(100, 0);

        ledger.request_release(&snapshot, 30, "a").await.unwrap();
        let err = ledger.request_release(&snapshot, 30, "b").await.unwrap_err();

        assert!(matches!(err, LedgerError::ConcurrentModification { expected: 0, actual: 30, .. }));
        assert!(err.is_retryable());
        assert_eq!(store.released("plan-1"), 30);
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_both_succeed() {
        let store = Arc::new(MemoryStore::with_plan(plan(100, 0)));
        let ledger = Arc::new(ledger_with(store.clone()));

        let l1 = ledger.clone();
        let l2 = ledger.clone();
        let h1 = tokio::spawn(async move { l1.request_release(&plan(100, 0), 60, "a").await });
        let h2 = tokio::spawn(async move { l2.request_release(&plan(100, 0), 60, "b").await });

        let results = vec![h1.await.unwrap(), h2.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(LedgerError::CapacityExceeded { .. }) | Err(LedgerError::ConcurrentModification { .. })
        )));
        assert_eq!(store.released("plan-1"), 60);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_pre_image() {
        let store = Arc::new(MemoryStore::failing(plan(100, 40)));
        let ledger = ledger_with(store.clone());

        let err = ledger.release_by_id("plan-1", 10, "op").await.unwrap_err();

        assert!(matches!(err, LedgerError::StorageFailure(_)));
        assert!(err.is_retryable());
        assert_eq!(store.released("plan-1"), 40);
        assert_eq!(store.event_count(), 0);
    }

    #[tokio::test]
    async fn test_release_by_id_missing_plan() {
        let store = Arc::new(MemoryStore::default());
        let ledger = ledger_with(store);

        let err = ledger.release_by_id("ghost", 1, "op").await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::PlanNotFound {
                plan_id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_pending_quantity_is_pure() {
        let p = plan(100, 35);
        let before = p.clone();
        assert_eq!(pending_quantity(&p), 65);
        assert_eq!(ReleaseLedger::pending_quantity(&p), 65);
        assert_eq!(p, before);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 12 ").unwrap().get(), 12);
        for bad in ["", "abc", "10.5", "0", "-5", "12abc"] {
            assert!(
                matches!(parse_quantity(bad), Err(LedgerError::InvalidQuantity { .. })),
                "input {:?} should be rejected",
                bad
            );
        }
    }
}
