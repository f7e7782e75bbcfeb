use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

use crate::workflow::display_state::DisplayState;

/// 初始化会话日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `command`: 本次执行的命令名
pub fn init_log_file(log_file_path: &str, command: &str) -> Result<()> {
    let log_header = format!(
        "{}\nMangrovePulse 会话日志 ({}) - {}\n{}\n\n",
        "=".repeat(60),
        command,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `api_base_url`: 分析后端地址
/// - `command`: 命令名
pub fn log_startup(api_base_url: &str, command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 MangrovePulse 启动 - {}", command);
    info!("🌐 分析后端: {}", api_base_url);
    info!("{}", "=".repeat(60));
}

/// 打印当前面板、弹窗和按钮状态
pub fn log_display_state(state: &DisplayState) {
    info!("\n{}", "─".repeat(60));
    if let Some(popup) = &state.popup {
        for line in popup.summary_lines() {
            info!("📍 {}", line);
        }
    }
    for line in state.panel.summary_lines() {
        info!("📊 {}", line);
    }
    info!("🔘 {}", state.affordances.summary());
    info!("{}", "─".repeat(60));
}

/// 打印会话结束信息
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn log_session_complete(log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!(
        "✅ 会话结束: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("日志已保存至: {}", log_file_path);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
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
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_text("红树林监测", 2), "红树...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_log_display_state_reads_state() {
        let mut state = DisplayState::default();
        state.panel.visible = true;
        log_display_state(&state);
        assert!(!state.panel.summary_lines().is_empty());
    }

    #[test]
    fn test_log_file_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        init_log_file(path.to_str().unwrap(), "area").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("MangrovePulse 会话日志 (area)"));
    }
}
