// ==========================================
// 家具质检系统 - 领域类型定义
// ==========================================
// 职责: 区域枚举 + 各区域缺陷目录
// 红线: 区域为封闭集合 (SILLAS / SALAS)，未知值一律拒绝
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 生产区域 (Area)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Area {
    Sillas, // 椅子
    Salas,  // 沙发
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Area {
    /// 全部区域（展示顺序：SILLAS 在前）
    pub const ALL: [Area; 2] = [Area::Sillas, Area::Salas];

    /// 从字符串解析区域
    ///
    /// 与其他枚举不同，这里没有默认值：未知区域返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SILLAS" => Some(Area::Sillas),
            "SALAS" => Some(Area::Salas),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Area::Sillas => "SILLAS",
            Area::Salas => "SALAS",
        }
    }

    /// 该区域可选的缺陷目录
    pub fn defect_catalog(&self) -> &'static [&'static str] {
        match self {
            Area::Sillas => DEFECTS_SILLAS,
            Area::Salas => DEFECTS_SALAS,
        }
    }

    /// 判断缺陷名称是否属于该区域目录
    pub fn accepts_defect(&self, defect: &str) -> bool {
        let defect = defect.trim();
        self.defect_catalog().iter().any(|d| *d == defect)
    }
}

/// 兜底缺陷名称（两个区域都允许）
pub const DEFECT_OTHER: &str = "OTRO";

// 椅子区缺陷目录
const DEFECTS_SILLAS: &[&str] = &[
    "GOLPE DES. DE LACA",
    "GOLPE ANT. DE LACA",
    "DESPOSTILLADO",
    "RAYAS DES. DE LACA",
    "RAYAS ANT. DE LACA",
    "MARCA PULIDORA",
    "MARCA CARACOL",
    "SIN RESANE",
    "EXCESO DE RESANE",
    "LACA MANCHA",
    "LACA CHORREADA",
    "LACA MARCAS",
    "LACA GRUMO",
    "LACA BRISIADO",
    "GRAPA VISIBLE",
    "CASCO DESCUADRADO",
    "CASCO QUEBRADO",
    "BONFORD ROTO",
    "COSTURA DESALINEADA",
    "PESPUNTE FLOJO",
    "FALLA DE TELA",
    "DIFERENCIA DE TONO",
    "MAL TAPIZADO",
    "TELA SUCIA",
    "TELA ROTA",
    "RESPALDO QUEBRADO",
    DEFECT_OTHER,
];

// 沙发区缺陷目录
const DEFECTS_SALAS: &[&str] = &[
    "MAL TAPIZADO",
    "BONFORD ROTO",
    "GRAPA VISIBLE",
    "TIRA TACHUELA DESALINEADO",
    "TIRA TACHUELA SUELTA",
    "JALONES DESALINEADOS",
    "JALONES SUELTOS",
    "COSTURA DESALINEADA",
    "PESPUNTE FLOJO",
    "FALLA DE TELA",
    "DIFERENCIA DE TONO",
    "CASCO DESCUADRADO",
    "CASCO QUEBRADO",
    "PATAS FLOJAS",
    "TELA SUCIA",
    "TELA MANCHADA",
    "TELA ROTA",
    DEFECT_OTHER,
];
