/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{QuizSource, QuizSummary};

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug / info。
/// 日志写入 stderr，避免干扰终端界面。重复调用不会 panic
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验门户");
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("📁 会话目录: {}", config.session_dir);
    info!("📚 社区测验目录: {}", config.community_folder);
    info!("{}", "=".repeat(60));
}

/// 记录测验完成统计
pub fn log_quiz_finished(source: &QuizSource, summary: &QuizSummary) {
    info!("{}", "─".repeat(60));
    info!("🏁 测验完成: {}", source);
    info!("✅ 正确: {}/{}", summary.correct, summary.total);
    info!("❌ 错误: {}", summary.wrong);
    info!("⏭️ 跳过: {}", summary.skipped);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
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
