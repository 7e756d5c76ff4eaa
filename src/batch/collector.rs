//! # 文件收集器
//!
//! 根据输入路径和模式收集待解析的 ONCVPSP 报告。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多个模式，只匹配文件名）
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `glob::Pattern` 匹配文件名

use crate::error::{DojoError, Result};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// ONCVPSP 报告的默认文件名模式
pub const DEFAULT_PATTERN: &str = "*.out";

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![default_pattern()],
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    DojoError::InvalidArgument(format!("bad file pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.patterns = if patterns.is_empty() {
            vec![default_pattern()]
        } else {
            patterns
        };
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(DojoError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }

    /// 检查文件名是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.patterns.iter().any(|p| p.matches(name)),
            None => false,
        }
    }
}

fn default_pattern() -> Pattern {
    Pattern::new(DEFAULT_PATTERN).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_tree(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("psdojo_collector_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("O")).unwrap();
        for file in ["Si.out", "Si.in", "Si.psp8", "O/O.out", "O/O-high.out"] {
            fs::write(dir.join(file), "").unwrap();
        }
        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_collect_default_pattern() {
        let dir = make_tree("default");
        let files = FileCollector::new(dir.clone()).collect().unwrap();
        assert_eq!(names(&files), vec!["Si.out"]);

        let files = FileCollector::new(dir).recursive(true).collect().unwrap();
        assert_eq!(names(&files), vec!["O-high.out", "O.out", "Si.out"]);
    }

    #[test]
    fn test_collect_multiple_patterns() {
        let dir = make_tree("multi");
        let files = FileCollector::new(dir)
            .with_pattern("*.in, *.psp8")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(names(&files), vec!["Si.in", "Si.psp8"]);
    }

    #[test]
    fn test_collect_errors() {
        assert!(FileCollector::new(PathBuf::from("x")).with_pattern("[").is_err());

        let missing = std::env::temp_dir().join("psdojo_collector_does_not_exist");
        assert!(matches!(
            FileCollector::new(missing).collect(),
            Err(DojoError::DirectoryNotFound { .. })
        ));
    }
}
