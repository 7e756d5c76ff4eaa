//! # 统一错误处理模块
//!
//! 定义 psdojo 的所有错误类型，使用 `thiserror` 派生。
//!
//! 报告解析错误分为三类，调用方可据此区分：
//! - 不支持的格式: `UnsupportedCalculationMode`（全相对论计算）
//! - 格式损坏: `MissingSection`, `MalformedRow`, `DuplicateSection`
//! - 内部不一致: `MeshMismatch`
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// psdojo 统一错误类型
#[derive(Error, Debug)]
pub enum DojoError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // ONCVPSP 报告解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported calculation mode '{mode}': fully-relativistic reports cannot be parsed")]
    UnsupportedCalculationMode { mode: String },

    #[error("Missing section in report: {section}")]
    MissingSection { section: String },

    #[error("Malformed row in section '{section}' at line {line_no}: {reason}\n  -> {line}")]
    MalformedRow {
        section: String,
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("Section '{section}' appears more than once (first at line {first_line}, again at line {line_no})")]
    DuplicateSection {
        section: String,
        first_line: usize,
        line_no: usize,
    },

    #[error("Radial mesh of '{first}' does not match '{second}': {reason}")]
    MeshMismatch {
        first: String,
        second: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 赝势表元数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid table metadata in {path}:\n{}", .violations.join("\n"))]
    InvalidTable {
        path: String,
        violations: Vec<String>,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl DojoError {
    /// 是否为"已知但不支持"的报告（而非损坏的报告）
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DojoError::UnsupportedCalculationMode { .. })
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DojoError>;
