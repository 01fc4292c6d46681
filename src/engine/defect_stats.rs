// ==========================================
// 家具质检系统 - 缺陷统计 (驾驶舱聚合)
// ==========================================
// 输出:
// - 总数
// - 按区域计数与占比 (只列出有数据的区域)
// - 缺陷 Top-N (计数降序，同计数按名称升序)
// 占比保留一位小数
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::defect::DefectReport;
use crate::domain::types::Area;

/// 默认 Top-N
pub const DEFAULT_TOP_DEFECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStat {
    pub area: Area,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectStat {
    pub defect: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectStatistics {
    pub total: usize,
    pub by_area: Vec<AreaStat>,
    pub top_defects: Vec<DefectStat>,
}

impl DefectStatistics {
    /// 统计报告集合
    pub fn compute(reports: &[DefectReport], top_limit: usize) -> Self {
        let total = reports.len();

        let mut area_counts: HashMap<Area, usize> = HashMap::new();
        let mut defect_counts: HashMap<&str, usize> = HashMap::new();
        for r in reports {
            *area_counts.entry(r.area).or_insert(0) += 1;
            *defect_counts.entry(r.defect.as_str()).or_insert(0) += 1;
        }

        let by_area = Area::ALL
            .iter()
            .filter_map(|area| {
                area_counts.get(area).map(|&count| AreaStat {
                    area: *area,
                    count,
                    percentage: percentage(count, total),
                })
            })
            .collect();

        let mut defects: Vec<(&str, usize)> = defect_counts.into_iter().collect();
        defects.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let top_defects = defects
            .into_iter()
            .take(top_limit)
            .map(|(defect, count)| DefectStat {
                defect: defect.to_string(),
                count,
                percentage: percentage(count, total),
            })
            .collect();

        Self {
            total,
            by_area,
            top_defects,
        }
    }

    /// 某区域的计数（无数据为 0）
    pub fn area_count(&self, area: Area) -> usize {
        self.by_area
            .iter()
            .find(|s| s.area == area)
            .map_or(0, |s| s.count)
    }
}

/// 占比，保留一位小数；总数为 0 时返回 0
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::defect::NewDefectReport;
    use chrono::NaiveDate;

    fn report(area: Area, defect: &str) -> DefectReport {
        let d = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        NewDefectReport {
            report_date: d,
            area,
            product: "P".to_string(),
            color: String::new(),
            lf: String::new(),
            pt: String::new(),
            lp: String::new(),
            order_no: String::new(),
            customer: String::new(),
            defect: defect.to_string(),
            description: String::new(),
        }
        .into_report("r".to_string(), d.and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_reports() {
        let stats = DefectStatistics::compute(&[], DEFAULT_TOP_DEFECTS);
        assert_eq!(stats.total, 0);
        assert!(stats.by_area.is_empty());
        assert!(stats.top_defects.is_empty());
        assert_eq!(stats.area_count(Area::Sillas), 0);
    }

    #[test]
    fn test_area_percentages() {
        let reports = vec![
            report(Area::Sillas, "TELA ROTA"),
            report(Area::Sillas, "TELA ROTA"),
            report(Area::Salas, "PATAS FLOJAS"),
        ];
        let stats = DefectStatistics::compute(&reports, DEFAULT_TOP_DEFECTS);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_area.len(), 2);
        assert_eq!(stats.by_area[0].area, Area::Sillas);
        assert_eq!(stats.by_area[0].percentage, 66.7);
        assert_eq!(stats.by_area[1].percentage, 33.3);
    }

    #[test]
    fn test_top_defects_sorted_and_limited() {
        let mut reports = Vec::new();
        for _ in 0..3 {
            reports.push(report(Area::Salas, "MAL TAPIZADO"));
        }
        reports.push(report(Area::Salas, "TELA SUCIA"));
        reports.push(report(Area::Salas, "BONFORD ROTO"));

        let stats = DefectStatistics::compute(&reports, 2);
        let names: Vec<&str> = stats.top_defects.iter().map(|d| d.defect.as_str()).collect();
        assert_eq!(names, vec!["MAL TAPIZADO", "BONFORD ROTO"]);
        assert_eq!(stats.top_defects[0].count, 3);
        assert_eq!(stats.top_defects[0].percentage, 60.0);
    }
}
