//! # 赝势表清单 (.djson) 解析器
//!
//! 读取 `.djson` 清单并做完整检查：`dojo_info` 字段取值、条目一致性，
//! 以及每个条目对应的赝势文件 `<清单目录>/<元素>/<basename>` 是否存在、
//! 其 md5 是否与清单一致。
//!
//! ## 依赖关系
//! - 被 `commands/validate.rs` 使用
//! - 使用 `models/dojo_info.rs`
//! - 使用 `serde_json` 反序列化, `md-5` 计算文件摘要

use crate::error::{DojoError, Result};
use crate::models::DojoTableManifest;
use md5::{Digest, Md5};
use std::fs;
use std::path::Path;

/// 读取并反序列化清单（不做任何检查）
pub fn load_manifest(path: &Path) -> Result<DojoTableManifest> {
    let content = fs::read_to_string(path).map_err(|e| DojoError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(serde_json::from_str(&content)?)
}

/// 读取清单并检查，任何违规都会汇总为一个 `InvalidTable` 错误
pub fn check_manifest(path: &Path) -> Result<DojoTableManifest> {
    let manifest = load_manifest(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));

    let mut violations = manifest.dojo_info.validate();
    violations.extend(manifest.check_entries());
    violations.extend(check_files(&manifest, root)?);

    if violations.is_empty() {
        Ok(manifest)
    } else {
        Err(DojoError::InvalidTable {
            path: path.display().to_string(),
            violations,
        })
    }
}

/// 逐个检查赝势文件：缺失或 md5 与清单不符都记为违规
pub fn check_files(manifest: &DojoTableManifest, root: &Path) -> Result<Vec<String>> {
    let mut violations = Vec::new();

    for (symbol, meta) in &manifest.pseudos_metadata {
        let path = root.join(symbol).join(&meta.basename);
        if !path.is_file() {
            violations.push(format!("pseudopotential file not found: {}", path.display()));
            continue;
        }

        let digest = file_md5(&path)?;
        if !digest.eq_ignore_ascii_case(&meta.md5) {
            violations.push(format!(
                "{}: md5 of {} is {}, table lists {}",
                symbol,
                path.display(),
                digest,
                meta.md5
            ));
        }
    }

    Ok(violations)
}

/// 文件内容的 md5（小写十六进制）
pub fn file_md5(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| DojoError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(format!("{:x}", Md5::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MANIFEST: &str = r#"{
        "dojo_info": {
            "pseudo_type": "norm-conserving",
            "xc_type": "GGA-PBE",
            "authors": ["M. Giantomassi"],
            "generation_date": "2015-07-20"
        },
        "pseudos_metadata": {
            "O": {"basename": "O.psp8", "Z_val": 6.0, "l_max": 1, "md5": "900150983CD24FB0D6963F7D28E17F72"}
        }
    }"#;

    fn table_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("psdojo_djson_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("O")).unwrap();
        dir
    }

    #[test]
    fn test_file_md5() {
        let dir = table_dir("digest");
        let path = dir.join("O").join("O.psp8");
        fs::write(&path, "abc").unwrap();
        assert_eq!(file_md5(&path).unwrap(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_check_manifest_ok() {
        let dir = table_dir("ok");
        fs::write(dir.join("O").join("O.psp8"), "abc").unwrap();
        let path = dir.join("table.djson");
        fs::write(&path, MANIFEST).unwrap();

        let manifest = check_manifest(&path).unwrap();
        assert!(manifest.dojo_info.isnc());
        assert_eq!(manifest.pseudos_metadata["O"].l_max, 1);
    }

    #[test]
    fn test_check_manifest_missing_file() {
        let dir = table_dir("missing");
        let path = dir.join("table.djson");
        fs::write(&path, MANIFEST).unwrap();

        match check_manifest(&path) {
            Err(DojoError::InvalidTable { violations, .. }) => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("O.psp8"));
            }
            other => panic!("expected InvalidTable, got {:?}", other),
        }
    }

    #[test]
    fn test_check_manifest_md5_mismatch() {
        let dir = table_dir("md5_mismatch");
        fs::write(dir.join("O").join("O.psp8"), "abd").unwrap();
        let path = dir.join("table.djson");
        fs::write(&path, MANIFEST).unwrap();

        match check_manifest(&path) {
            Err(DojoError::InvalidTable { violations, .. }) => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].starts_with("O: md5 of"));
                assert!(violations[0].ends_with("table lists 900150983CD24FB0D6963F7D28E17F72"));
            }
            other => panic!("expected InvalidTable, got {:?}", other),
        }
    }

    #[test]
    fn test_load_manifest_bad_json() {
        let dir = table_dir("bad_json");
        let path = dir.join("table.djson");
        fs::write(&path, MANIFEST.replace("\"pseudo_type\"", "\"pseudo_kind\"")).unwrap();

        assert!(matches!(load_manifest(&path), Err(DojoError::JsonError(_))));
    }
}
