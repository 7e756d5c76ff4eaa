//! # 批量执行器
//!
//! 并行解析一批报告。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代（结果保持输入顺序）
//! - 进度条显示
//! - 成功 / 跳过 / 失败 分类汇总
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{DojoError, Result};
use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult<T> {
    /// 处理成功
    Success(PathBuf, T),
    /// 跳过（如不支持的计算模式）
    Skipped(PathBuf, String),
    /// 处理失败
    Failed(PathBuf, String),
}

/// 批量处理结果统计
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功的结果，保持输入顺序
    pub rows: Vec<(PathBuf, T)>,
    /// 跳过详情 (文件路径, 原因)
    pub skipped: Vec<(PathBuf, String)>,
    /// 失败详情 (文件路径, 错误信息)
    pub failures: Vec<(PathBuf, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult<T>) {
        match result {
            ProcessResult::Success(path, row) => self.rows.push((path, row)),
            ProcessResult::Skipped(path, why) => self.skipped.push((path, why)),
            ProcessResult::Failed(path, err) => self.failures.push((path, err)),
        }
    }

    pub fn success(&self) -> usize {
        self.rows.len()
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.rows.len() + self.skipped.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 表示使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: Vec<PathBuf>, processor: F) -> Result<BatchResult<T>>
    where
        T: Send,
        F: Fn(&PathBuf) -> ProcessResult<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Parsing reports");

        let failed_count = AtomicUsize::new(0);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| DojoError::Other(format!("Failed to build thread pool: {}", e)))?;

        let results: Vec<ProcessResult<T>> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    if let ProcessResult::Failed(..) = result {
                        let failed = failed_count.fetch_add(1, Ordering::Relaxed) + 1;
                        pb.set_message(format!("Parsing reports ({} failed)", failed));
                    }
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }

        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_sorts_results_into_buckets() {
        let files: Vec<PathBuf> = ["a.out", "b.out", "skip.out", "bad.out", "c.out"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let result = BatchRunner::new(2)
            .run(files, |path| {
                let name = path.to_string_lossy().to_string();
                match name.as_str() {
                    "skip.out" => ProcessResult::Skipped(path.clone(), "fully-relativistic".into()),
                    "bad.out" => ProcessResult::Failed(path.clone(), "broken".into()),
                    _ => ProcessResult::Success(path.clone(), name.len()),
                }
            })
            .unwrap();

        assert_eq!(result.total(), 5);
        assert_eq!(result.success(), 3);
        let order: Vec<_> = result.rows.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(
            order,
            vec![PathBuf::from("a.out"), PathBuf::from("b.out"), PathBuf::from("c.out")]
        );
        assert_eq!(result.skipped[0].1, "fully-relativistic");
        assert_eq!(result.failures[0].0, PathBuf::from("bad.out"));
    }

    #[test]
    fn test_zero_jobs_means_all_cpus() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
        assert_eq!(BatchRunner::new(3).jobs(), 3);
    }
}
