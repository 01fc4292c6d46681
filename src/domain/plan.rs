// ==========================================
// 家具质检系统 - 生产计划领域模型
// ==========================================
// 红线: 0 <= released <= ordered_quantity
// 红线: released 只能通过释放事件单调递增
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::Area;

// ==========================================
// Plan - 生产计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: String,           // 计划ID
    pub area: Area,                // 区域
    pub product: String,           // 产品
    pub color: String,             // 颜色
    pub lf: String,                // LF
    pub pt: String,                // PT
    pub lp: String,                // LP
    pub order_no: String,          // 订单号 (pedido)
    pub customer: String,          // 客户 (cliente)
    pub ordered_quantity: i64,     // 计划数量 (> 0)
    pub released: i64,             // 累计已释放数量
    pub created_at: NaiveDateTime, // 创建时间
}

impl Plan {
    /// 待释放数量 = 计划数量 - 已释放数量
    pub fn pending(&self) -> i64 {
        self.ordered_quantity - self.released
    }

    /// 是否已全部释放
    pub fn is_fully_released(&self) -> bool {
        self.pending() == 0
    }

    /// 判断再释放 `quantity` 是否仍在计划数量内
    pub fn can_release(&self, quantity: i64) -> bool {
        quantity > 0
            && self
                .released
                .checked_add(quantity)
                .map_or(false, |total| total <= self.ordered_quantity)
    }
}

// ==========================================
// NewPlan - 新建计划 (已通过校验)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlan {
    pub area: Area,
    pub product: String,
    pub color: String,
    pub lf: String,
    pub pt: String,
    pub lp: String,
    pub order_no: String,
    pub customer: String,
    pub ordered_quantity: i64,
}

impl NewPlan {
    /// 生成计划实体（released 固定从 0 开始）
    pub fn into_plan(self, plan_id: String, created_at: NaiveDateTime) -> Plan {
        Plan {
            plan_id,
            area: self.area,
            product: self.product,
            color: self.color,
            lf: self.lf,
            pt: self.pt,
            lp: self.lp,
            order_no: self.order_no,
            customer: self.customer,
            ordered_quantity: self.ordered_quantity,
            released: 0,
            created_at,
        }
    }
}
