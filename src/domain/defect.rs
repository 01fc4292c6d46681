// ==========================================
// 家具质检系统 - 缺陷报告领域模型
// ==========================================
// 用途: 记录生产缺陷，按区域浏览/筛选/导出
// 约束: 照片只保存引用 (URL)，文件存储不在本系统内
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::Area;

// ==========================================
// DefectReport - 缺陷报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectReport {
    pub report_id: String,          // 报告ID
    pub report_date: NaiveDate,     // 报告日期 (fecha)
    pub area: Area,                 // 区域
    pub product: String,            // 产品
    pub color: String,              // 颜色
    pub lf: String,                 // LF
    pub pt: String,                 // PT
    pub lp: String,                 // LP
    pub order_no: String,           // 订单号
    pub customer: String,           // 客户
    pub defect: String,             // 缺陷名称
    pub description: String,        // 描述
    pub photo_url: Option<String>,  // 旧版单张照片
    pub created_at: NaiveDateTime,  // 创建时间
}

// ==========================================
// NewDefectReport - 新建报告 (已通过校验)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDefectReport {
    pub report_date: NaiveDate,
    pub area: Area,
    pub product: String,
    pub color: String,
    pub lf: String,
    pub pt: String,
    pub lp: String,
    pub order_no: String,
    pub customer: String,
    pub defect: String,
    pub description: String,
}

impl NewDefectReport {
    pub fn into_report(self, report_id: String, created_at: NaiveDateTime) -> DefectReport {
        DefectReport {
            report_id,
            report_date: self.report_date,
            area: self.area,
            product: self.product,
            color: self.color,
            lf: self.lf,
            pt: self.pt,
            lp: self.lp,
            order_no: self.order_no,
            customer: self.customer,
            defect: self.defect,
            description: self.description,
            photo_url: None,
            created_at,
        }
    }
}

// ==========================================
// DefectPhoto - 报告照片引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectPhoto {
    pub photo_id: String,
    pub report_id: String,
    pub photo_url: String,
    pub created_at: NaiveDateTime,
}

// ==========================================
// DateRange - 日期区间 (闭区间)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
