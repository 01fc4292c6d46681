// ==========================================
// 家具质检系统 - 报告导出
// ==========================================
// 两种表格:
// - 区域表: 单一区域的报告 (报告页导出)
// - 驾驶舱表: 日期区间内全部报告，附创建日期与照片 URL
// 表头沿用车间现用的西语列名
// ==========================================

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::db::DATE_FORMAT;
use crate::domain::defect::{DateRange, DefectReport};
use crate::domain::types::Area;
use crate::exporter::error::{ExportError, ExportResult};

const AREA_HEADERS: [&str; 11] = [
    "Fecha",
    "Área",
    "Producto",
    "Color",
    "LF",
    "PT",
    "LP",
    "Pedido",
    "Cliente",
    "Defecto",
    "Descripción",
];

// ==========================================
// ReportSheet - 待导出的表格
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSheet {
    pub sheet_name: String,
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportSheet {
    /// 区域表
    ///
    /// # 错误
    /// - `ExportError::NoData`: 该区域没有报告
    pub fn for_area(reports: &[DefectReport], area: Area, today: NaiveDate) -> ExportResult<Self> {
        let rows: Vec<Vec<String>> = reports
            .iter()
            .filter(|r| r.area == area)
            .map(base_row)
            .collect();

        if rows.is_empty() {
            return Err(ExportError::NoData(area.to_string()));
        }

        Ok(Self {
            sheet_name: "Reportes".to_string(),
            file_name: format!("Reportes_{}_{}.csv", area, today.format(DATE_FORMAT)),
            headers: AREA_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        })
    }

    /// 驾驶舱表（允许空表，仅输出表头）
    pub fn for_dashboard(reports: &[DefectReport], range: Option<DateRange>) -> Self {
        let mut headers: Vec<String> = vec!["Fecha".to_string(), "Fecha Creación".to_string()];
        headers.extend(AREA_HEADERS.iter().skip(1).map(|h| h.to_string()));
        headers.push("URL Foto".to_string());

        let rows = reports
            .iter()
            .map(|r| {
                let mut row = base_row(r);
                row.insert(1, r.created_at.format(DATE_FORMAT).to_string());
                row.push(r.photo_url.clone().unwrap_or_default());
                row
            })
            .collect();

        let (start, end) = match range {
            Some(range) => (
                range.start.format(DATE_FORMAT).to_string(),
                range.end.format(DATE_FORMAT).to_string(),
            ),
            None => ("todos".to_string(), "todos".to_string()),
        };

        Self {
            sheet_name: "Reportes de Defectos".to_string(),
            file_name: format!("reporte_defectos_{}_{}.csv", start, end),
            headers,
            rows,
        }
    }

    /// 写出为 CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> ExportResult<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 写出为 CSV 字节
    pub fn to_csv_bytes(&self) -> ExportResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    /// 写入目录，文件名取 `file_name`
    pub fn save_to_dir(&self, dir: &Path) -> ExportResult<PathBuf> {
        let path = dir.join(&self.file_name);
        let file = std::fs::File::create(&path)?;
        self.write_csv(file)?;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "报告已导出");
        Ok(path)
    }
}

fn base_row(r: &DefectReport) -> Vec<String> {
    vec![
        r.report_date.format(DATE_FORMAT).to_string(),
        r.area.to_string(),
        r.product.clone(),
        r.color.clone(),
        r.lf.clone(),
        r.pt.clone(),
        r.lp.clone(),
        r.order_no.clone(),
        r.customer.clone(),
        r.defect.clone(),
        r.description.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::defect::NewDefectReport;

    fn report(area: Area, description: &str) -> DefectReport {
        let d = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        NewDefectReport {
            report_date: d,
            area,
            product: "SILLA ROMA".to_string(),
            color: "CAOBA".to_string(),
            lf: "LF2".to_string(),
            pt: "PT2".to_string(),
            lp: "LP2".to_string(),
            order_no: "PED-9".to_string(),
            customer: "ACME".to_string(),
            defect: "LACA GRUMO".to_string(),
            description: description.to_string(),
        }
        .into_report("r1".to_string(), d.and_hms_opt(10, 0, 0).unwrap())
    }

    #[test]
    fn test_area_sheet_rejects_empty_area() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let err = ReportSheet::for_area(&[report(Area::Sillas, "")], Area::Salas, today).unwrap_err();
        assert!(matches!(err, ExportError::NoData(ref a) if a == "SALAS"));
    }

    #[test]
    fn test_area_sheet_csv_output() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let sheet =
            ReportSheet::for_area(&[report(Area::Sillas, "raya, lateral")], Area::Sillas, today)
                .unwrap();

        assert_eq!(sheet.file_name, "Reportes_SILLAS_2025-08-05.csv");
        let csv = String::from_utf8(sheet.to_csv_bytes().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Fecha,Área,Producto,Color,LF,PT,LP,Pedido,Cliente,Defecto,Descripción"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2025-08-04,SILLAS,SILLA ROMA,CAOBA,LF2,PT2,LP2,PED-9,ACME,LACA GRUMO,\"raya, lateral\""
        );
    }

    #[test]
    fn test_dashboard_sheet_columns_and_name() {
        let sheet = ReportSheet::for_dashboard(&[report(Area::Salas, "")], None);
        assert_eq!(sheet.file_name, "reporte_defectos_todos_todos.csv");
        assert_eq!(sheet.headers.len(), 13);
        assert_eq!(sheet.headers[1], "Fecha Creación");
        assert_eq!(sheet.headers[12], "URL Foto");
        assert_eq!(sheet.rows[0].len(), 13);
        assert_eq!(sheet.rows[0][1], "2025-08-04");
    }
}
