//! # 赝势表元数据
//!
//! `.djson` 清单文件描述一张正式发布的赝势表：
//! ```text
//! {
//!   "dojo_info": { "pseudo_type": "norm-conserving", "xc_type": "GGA-PBE", ... },
//!   "pseudos_metadata": {
//!     "Si": { "basename": "Si-dloc.psp8", "Z_val": 4.0, "l_max": 2, "md5": "..." }
//!   }
//! }
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/djson.rs` 构造
//! - 被 `commands/validate.rs` 使用

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static! {
    static ref ISO_DATE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap();
    static ref MD5_HEX: Regex = Regex::new(r"^[0-9a-fA-F]{32}$").unwrap();
}

/// 允许的赝势类型
pub const PSEUDO_TYPES: [&str; 2] = ["norm-conserving", "PAW"];

/// 允许的交换关联泛函
pub const XC_TYPES: [&str; 1] = ["GGA-PBE"];

/// 赝势表元数据（固定字段集）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DojoInfo {
    #[serde(default)]
    pub pseudo_type: Option<String>,
    #[serde(default)]
    pub xc_type: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub generation_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub dojo_dir: Option<String>,
}

impl DojoInfo {
    /// 检查字段取值，返回所有违规项（空表示通过）
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(pt) = &self.pseudo_type {
            if !PSEUDO_TYPES.contains(&pt.as_str()) {
                errors.push(format!(
                    "pseudo_type '{}' is not one of {:?}",
                    pt, PSEUDO_TYPES
                ));
            }
        }

        if let Some(xc) = &self.xc_type {
            if !XC_TYPES.contains(&xc.as_str()) {
                errors.push(format!("xc_type '{}' is not one of {:?}", xc, XC_TYPES));
            }
        }

        if let Some(date) = &self.generation_date {
            if !is_iso_date(date) {
                errors.push(format!(
                    "generation_date '{}' is not a date in YYYY-MM-DD format",
                    date
                ));
            }
        }

        if self.authors.iter().any(|a| a.trim().is_empty()) {
            errors.push("authors contains an empty name".to_string());
        }

        errors
    }

    /// 模守恒赝势
    pub fn isnc(&self) -> bool {
        self.pseudo_type.as_deref() == Some("norm-conserving")
    }

    /// PAW 赝势
    pub fn ispaw(&self) -> bool {
        self.pseudo_type.as_deref() == Some("PAW")
    }
}

fn is_iso_date(s: &str) -> bool {
    match ISO_DATE.captures(s) {
        Some(caps) => {
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);
            (1..=12).contains(&month) && (1..=31).contains(&day)
        }
        None => false,
    }
}

/// 单个元素的赝势条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PseudoMeta {
    pub basename: String,
    #[serde(rename = "Z_val")]
    pub z_val: f64,
    pub l_max: u32,
    pub md5: String,
}

/// `.djson` 清单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DojoTableManifest {
    pub dojo_info: DojoInfo,
    /// 元素符号 -> 赝势条目
    pub pseudos_metadata: BTreeMap<String, PseudoMeta>,
}

impl DojoTableManifest {
    /// 检查清单条目本身的一致性（不访问文件系统，文件校验见 `parsers/djson.rs`）
    pub fn check_entries(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        for (symbol, meta) in &self.pseudos_metadata {
            if let Some(other) = seen.insert(meta.basename.as_str(), symbol.as_str()) {
                errors.push(format!(
                    "basename '{}' is used by both {} and {}",
                    meta.basename, other, symbol
                ));
            }
            if !MD5_HEX.is_match(&meta.md5) {
                errors.push(format!("{}: md5 '{}' is not a 32-digit hex hash", symbol, meta.md5));
            }
            if meta.z_val <= 0.0 {
                errors.push(format!("{}: Z_val must be positive, got {}", symbol, meta.z_val));
            }
        }

        let exts: Vec<&str> = self
            .pseudos_metadata
            .values()
            .map(|m| m.basename.rsplit_once('.').map(|(_, e)| e).unwrap_or(""))
            .collect();
        if let Some(first) = exts.first() {
            if exts.iter().any(|e| e != first) {
                errors.push("pseudopotential files do not share the same extension".to_string());
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let info = DojoInfo {
            pseudo_type: Some("norm-conserving".into()),
            xc_type: Some("GGA-PBE".into()),
            authors: vec!["M. Giantomassi".into(), "M. J van Setten".into()],
            generation_date: Some("2015-07-20".into()),
            ..Default::default()
        };
        assert!(info.validate().is_empty());
        assert!(info.isnc());
        assert!(!info.ispaw());
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let info = DojoInfo {
            pseudo_type: Some("ultrasoft".into()),
            xc_type: Some("LDA".into()),
            generation_date: Some("20/07/2015".into()),
            ..Default::default()
        };
        let errors = info.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("pseudo_type"));
        assert!(errors[2].contains("generation_date"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"pseudo_type": "PAW", "flavour": "vanilla"}"#;
        assert!(serde_json::from_str::<DojoInfo>(json).is_err());

        let info: DojoInfo = serde_json::from_str(r#"{"pseudo_type": "PAW"}"#).unwrap();
        assert!(info.ispaw());
    }

    #[test]
    fn test_check_entries() {
        let json = r#"{
            "dojo_info": {"pseudo_type": "norm-conserving"},
            "pseudos_metadata": {
                "O":  {"basename": "O.psp8", "Z_val": 6.0, "l_max": 2, "md5": "f7d0f3573362d89c81c41fc6b7b3e6ab"},
                "Si": {"basename": "O.psp8", "Z_val": 4.0, "l_max": 2, "md5": "xyz"}
            }
        }"#;
        let manifest: DojoTableManifest = serde_json::from_str(json).unwrap();
        let errors = manifest.check_entries();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("used by both O and Si")));
        assert!(errors.iter().any(|e| e.contains("md5 'xyz'")));
    }
}
