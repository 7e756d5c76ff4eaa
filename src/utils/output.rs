//! # 美化输出工具
//!
//! 提供统一的终端输出样式，所有状态行都带有彩色前缀。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块和 `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;
use std::path::Path;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过的文件
pub fn print_skip(path: &Path, reason: &str) {
    println!("{} {}: {}", "[SKIP]".dimmed(), path.display(), reason.dimmed());
}

/// 打印解析失败的文件
pub fn print_failure(path: &Path, reason: &str) {
    println!("{} {}", "[FAIL]".red().bold(), path.display());
    for line in reason.lines() {
        println!("       {}", line.dimmed());
    }
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印对齐的 "名称: 值" 行
pub fn print_field(name: &str, value: &str) {
    let label = format!("{:<18}", format!("{}:", name));
    println!("  {} {}", label.cyan(), value);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
