use std::path::PathBuf;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 分析后端的基础 URL
    pub api_base_url: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 报告输出目录
    pub report_output_dir: PathBuf,
    /// 分析面板宽度（像素），快照按此宽度离屏排版
    pub panel_width: u32,
    /// 默认年份
    pub default_year: i32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 会话日志文件
    pub output_log_file: String,
    /// 无头浏览器可执行文件（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 120,
            report_output_dir: PathBuf::from("reports"),
            panel_width: 480,
            default_year: 2024,
            verbose_logging: false,
            output_log_file: "mangrove-pulse.log".to_string(),
            chrome_executable: None,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(default.request_timeout_secs),
            report_output_dir: std::env::var("REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.report_output_dir),
            panel_width: env_parse("PANEL_WIDTH").unwrap_or(default.panel_width),
            default_year: env_parse("DEFAULT_YEAR").unwrap_or(default.default_year),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            chrome_executable: std::env::var("CHROME_EXECUTABLE")
                .ok()
                .map(PathBuf::from)
                .or(default.chrome_executable),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
