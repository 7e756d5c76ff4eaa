//! # 解析器模块
//!
//! 提供 ONCVPSP 生成报告和赝势表清单 (`.djson`) 的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: oncvpsp, djson

pub mod djson;
pub mod oncvpsp;
