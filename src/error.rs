use thiserror::Error;

use crate::models::AppStatus;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题目生成服务错误
    #[error("生成服务错误: {0}")]
    Gateway(#[from] GatewayError),
    /// 会话存储错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 界面状态迁移错误
    #[error("状态迁移错误: {0}")]
    Transition(#[from] TransitionError),
    /// 答题流程错误
    #[error("答题错误: {0}")]
    Quiz(#[from] QuizError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 选择了不存在的社区测验
    #[error("社区测验 {index} 不存在 (共 {available} 个)")]
    CommunityQuizNotFound { index: usize, available: usize },
}

/// 题目生成服务错误
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {0}")]
    RequestBuild(#[source] async_openai::error::OpenAIError),
    /// 构建文件附件失败
    #[error("构建文件附件失败: {0}")]
    AttachmentBuild(#[source] serde_json::Error),
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容不是合法的题目 JSON
    #[error("无法解析LLM返回的题目 (响应: {response}): {source}")]
    MalformedResponse {
        response: String,
        #[source]
        source: serde_json::Error,
    },
    /// 某道题目不合法
    #[error("第 {index} 题不合法: {reason}")]
    InvalidQuestion { index: usize, reason: String },
    /// 没有生成任何题目
    #[error("生成结果中没有题目")]
    EmptyQuiz,
    /// 不支持的文件类型
    #[error("不支持的文件类型: {mime_type}")]
    UnsupportedMimeType { mime_type: String },
    /// 文件内容编码错误
    #[error("文件内容不是合法的 base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// 请求超时
    #[error("生成请求超时 ({secs} 秒)")]
    Timeout { secs: u64 },
}

/// 会话存储错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 读取失败
    #[error("读取会话失败 ({key}): {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入会话失败 ({key}): {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除失败
    #[error("删除会话失败 ({key}): {source}")]
    RemoveFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },
    /// 已保存的会话无法解析
    #[error("会话数据已损坏 ({key}): {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// 序列化失败
    #[error("会话序列化失败: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// 界面状态迁移错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// 迁移表中不存在的迁移
    #[error("状态 {from:?} 不接受事件 {event}")]
    NotAllowed { from: AppStatus, event: &'static str },
    /// 文件上传进行中
    #[error("文件上传进行中，忽略事件 {event}")]
    UploadInFlight { event: &'static str },
    /// 没有进行中的上传
    #[error("没有进行中的上传，无法处理事件 {event}")]
    NotUploading { event: &'static str },
    /// 题目列表为空
    #[error("题目列表为空，无法开始测验")]
    EmptyQuiz,
    /// 答题状态缺失
    #[error("当前没有进行中的测验")]
    NoActiveQuiz,
    /// 答题失败
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// 答题流程错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// 测验已结束
    #[error("测验已结束，不能继续作答")]
    AlreadyFinished,
    /// 选项超出范围
    #[error("选项 {choice} 超出范围 [0, {len})")]
    ChoiceOutOfRange { choice: usize, len: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 文件内容校验失败
    #[error("文件内容不合法 ({path}): {reason}")]
    Invalid { path: String, reason: String },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

// ========== 便捷构造函数 ==========

impl FileError {
    /// 创建文件读取错误
    pub fn read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::ReadFailed {
            path: path.into(),
            source,
        }
    }
}

impl GatewayError {
    /// 创建LLM API调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: async_openai::error::OpenAIError,
    ) -> Self {
        GatewayError::ApiCallFailed {
            model: model.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
