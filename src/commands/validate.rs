//! # validate 命令实现
//!
//! 检查赝势表清单 (.djson)：`dojo_info` 字段、条目一致性，赝势文件是否齐全且 md5 一致。
//!
//! ## 依赖关系
//! - 使用 `cli/validate.rs` 定义的参数
//! - 使用 `parsers/djson.rs`
//! - 使用 `utils/output.rs`

use crate::cli::validate::ValidateArgs;
use crate::error::{DojoError, Result};
use crate::parsers::djson;
use crate::utils::output;

/// 执行 validate 命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    output::print_header(&format!("Validating table: {}", args.table.display()));

    if !args.table.is_file() {
        return Err(DojoError::FileNotFound {
            path: args.table.display().to_string(),
        });
    }

    let manifest = djson::check_manifest(&args.table)?;
    let info = &manifest.dojo_info;

    output::print_field("pseudo_type", info.pseudo_type.as_deref().unwrap_or("-"));
    output::print_field("xc_type", info.xc_type.as_deref().unwrap_or("-"));
    if !info.authors.is_empty() {
        output::print_field("authors", &info.authors.join(", "));
    }
    if let Some(date) = &info.generation_date {
        output::print_field("generation_date", date);
    }
    if let Some(reference) = &info.reference {
        output::print_field("reference", reference);
    }
    if !info.tags.is_empty() {
        output::print_field("tags", &info.tags.join(", "));
    }

    if !info.isnc() && !info.ispaw() {
        output::print_warning("pseudo_type is not set");
    }

    output::print_success(&format!(
        "{} pseudopotentials listed, all files present with matching md5",
        manifest.pseudos_metadata.len()
    ));

    Ok(())
}
