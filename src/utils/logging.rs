//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use std::fs;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n书籍下载日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_short_unchanged() {
        assert_eq!(truncate_text("三体", 55), "三体");
    }

    #[test]
    fn test_truncate_text_long_appends_ellipsis() {
        let long = "很".repeat(60);
        let truncated = truncate_text(&long, 55);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 58);
    }
}
