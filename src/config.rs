/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 会话存储目录（保存唯一的用户记录）
    pub session_dir: String,
    /// 社区测验 TOML 文件存放目录
    pub community_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 每次生成的题目数量
    pub questions_per_quiz: usize,
    /// 生成请求超时（秒），0 表示不限制
    pub generation_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_dir: ".quiz_portal".to_string(),
            community_folder: "community_quizzes".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            questions_per_quiz: 10,
            generation_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            session_dir: std::env::var("SESSION_DIR").unwrap_or(default.session_dir),
            community_folder: std::env::var("COMMUNITY_FOLDER").unwrap_or(default.community_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            questions_per_quiz: std::env::var("QUESTIONS_PER_QUIZ").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.questions_per_quiz),
            generation_timeout_secs: std::env::var("GENERATION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.generation_timeout_secs),
        }
    }

    /// 生成超时时长，未配置时返回 `None`
    pub fn generation_timeout(&self) -> Option<std::time::Duration> {
        (self.generation_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.generation_timeout_secs))
    }
}
