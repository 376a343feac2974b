//! LLM 题目生成服务 - 业务能力层
//!
//! 只负责"让 LLM 出题"能力，不关心界面流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::models::Question;
use crate::services::gateway::{FileUpload, QuizGateway, TopicRequest};

const SYSTEM_MESSAGE: &str = "You are an expert examiner who writes accurate multiple-choice \
                              questions for university entrance and semester exams. \
                              You always answer with a JSON array and nothing else.";

const OUTPUT_FORMAT: &str = r#"Return ONLY a JSON array. Each element must look like:
{"question": "...", "options": ["...", "...", "...", "..."], "correctAnswer": <0-based index into options>, "explanation": "..."}"#;

/// 基于 LLM 的题目生成网关
///
/// 职责：
/// - 构建出题提示词
/// - 调用 LLM API
/// - 解析并校验返回的题目
pub struct LlmQuizGateway {
    client: Client<OpenAIConfig>,
    model_name: String,
    questions_per_quiz: usize,
}

impl LlmQuizGateway {
    /// 创建新的 LLM 网关
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            questions_per_quiz: config.questions_per_quiz,
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `attachments`: 附加在用户消息后的图片或文件
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        attachments: Vec<ChatCompletionRequestUserMessageContentPart>,
    ) -> Result<String, GatewayError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(GatewayError::RequestBuild)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = if attachments.is_empty() {
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(GatewayError::RequestBuild)?
        } else {
            // 多模态：文本 + 附件
            debug!("用户消息包含 {} 个附件", attachments.len());

            let mut content_parts = Vec::with_capacity(attachments.len() + 1);
            content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: user_message.to_string(),
                },
            ));
            content_parts.extend(attachments);

            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(
                    content_parts,
                ))
                .build()
                .map_err(GatewayError::RequestBuild)?
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.7)
            .max_tokens(4096u32)
            .build()
            .map_err(GatewayError::RequestBuild)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            GatewayError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| GatewayError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 构建按主题出题的提示词
    fn build_topic_message(&self, request: &TopicRequest) -> String {
        let topic_line = if request.topic.trim().is_empty() {
            format!("a broad mix of core topics for the {} track", request.category)
        } else {
            format!("the topic \"{}\"", request.topic.trim())
        };

        format!(
            "Write {count} {difficulty} multiple-choice questions on {topic_line}.\n\
             The student is in the {category} category, year {year}.\n\
             Every question has exactly 4 options and exactly one correct option.\n\n\
             {format}",
            count = self.questions_per_quiz,
            difficulty = request.difficulty,
            topic_line = topic_line,
            category = request.category,
            year = request.year,
            format = OUTPUT_FORMAT,
        )
    }

    /// 构建从文件出题的提示词
    ///
    /// 图片作为 Vision 输入，文档作为文件输入，文本直接嵌入提示词
    ///
    /// # 返回
    /// (user_message, 附件列表)
    fn build_file_message(
        &self,
        upload: &FileUpload,
    ) -> Result<(String, Vec<ChatCompletionRequestUserMessageContentPart>), GatewayError> {
        let instruction = format!(
            "Extract or write {count} multiple-choice questions that test the material in the \
             attached document. Use only facts present in the document.\n\n{format}",
            count = self.questions_per_quiz,
            format = OUTPUT_FORMAT,
        );

        if upload.is_image() {
            return Ok((instruction, vec![image_part(upload.data_url())]));
        }

        if upload.is_document() {
            return Ok((instruction, vec![file_part(upload)?]));
        }

        if upload.is_text() {
            let bytes = upload.decode()?;
            let text = String::from_utf8_lossy(&bytes);
            let message = format!("{}\n\n--- DOCUMENT START ---\n{}\n--- DOCUMENT END ---", instruction, text);
            return Ok((message, Vec::new()));
        }

        Err(GatewayError::UnsupportedMimeType {
            mime_type: upload.mime_type.clone(),
        })
    }
}

fn image_part(url: String) -> ChatCompletionRequestUserMessageContentPart {
    ChatCompletionRequestUserMessageContentPart::ImageUrl(
        ChatCompletionRequestMessageContentPartImage {
            image_url: ImageUrl {
                url,
                detail: Some(ImageDetail::High),
            },
        },
    )
}

fn file_part(
    upload: &FileUpload,
) -> Result<ChatCompletionRequestUserMessageContentPart, GatewayError> {
    // FileObject 的字段不公开，只能经由 serde 构造
    serde_json::from_value(json!({
        "type": "file",
        "file": {
            "file_data": upload.data_url(),
            "filename": upload.file_name(),
        },
    }))
    .map_err(GatewayError::AttachmentBuild)
}

#[async_trait]
impl QuizGateway for LlmQuizGateway {
    async fn generate_from_topic(&self, request: &TopicRequest) -> Result<Vec<Question>, GatewayError> {
        debug!(
            "按主题出题: 类别={} 年级={} 难度={} 主题={}",
            request.category, request.year, request.difficulty, request.topic
        );

        let user_message = self.build_topic_message(request);
        let response = self
            .send_to_llm(&user_message, Some(SYSTEM_MESSAGE), Vec::new())
            .await?;

        parse_questions(&response)
    }

    async fn generate_from_file(&self, upload: &FileUpload) -> Result<Vec<Question>, GatewayError> {
        debug!(
            "从文件出题: 类型={} 编码长度={}",
            upload.mime_type,
            upload.encoded.len()
        );

        let (user_message, attachments) = self.build_file_message(upload)?;
        let response = self
            .send_to_llm(&user_message, Some(SYSTEM_MESSAGE), attachments)
            .await?;

        parse_questions(&response)
    }
}

/// 解析 LLM 返回的题目列表
///
/// 依次尝试：Markdown 代码块内容 → 最外层 `[...]` → 原文
pub fn parse_questions(response: &str) -> Result<Vec<Question>, GatewayError> {
    let json = extract_json_array(response);

    let questions: Vec<Question> =
        serde_json::from_str(json).map_err(|source| GatewayError::MalformedResponse {
            response: crate::utils::logging::truncate_text(response, 200),
            source,
        })?;

    if questions.is_empty() {
        return Err(GatewayError::EmptyQuiz);
    }

    for (i, q) in questions.iter().enumerate() {
        q.validate()
            .map_err(|reason| GatewayError::InvalidQuestion { index: i + 1, reason })?;
    }

    debug!("解析得到 {} 道题目", questions.len());

    Ok(questions)
}

fn extract_json_array(response: &str) -> &str {
    let response = response.trim();

    if let Ok(re) = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```") {
        if let Some(inner) = re.captures(response).and_then(|c| c.get(1)) {
            return inner.as_str();
        }
    }

    match (response.find('['), response.rfind(']')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    fn create_test_gateway() -> LlmQuizGateway {
        let config = Config {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            questions_per_quiz: 5,
            ..Config::from_env()
        };
        LlmQuizGateway::new(&config)
    }

    const TWO_QUESTIONS: &str = r#"[
        {"question": "H2O 是什么？", "options": ["水", "盐", "糖", "油"], "correctAnswer": 0},
        {"question": "1 + 1 = ?", "options": ["1", "2", "3", "4"], "correctAnswer": 1, "explanation": "加法"}
    ]"#;

    #[test]
    fn test_parse_plain_array() {
        let questions = parse_questions(TWO_QUESTIONS).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].correct_index, 1);
        assert_eq!(questions[1].explanation.as_deref(), Some("加法"));
    }

    #[test]
    fn test_parse_fenced_block() {
        let response = format!("好的，以下是题目：\n```json\n{}\n```\n祝你好运！", TWO_QUESTIONS);
        assert_eq!(parse_questions(&response).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_array_surrounded_by_text() {
        let response = format!("Here you go: {} Hope it helps.", TWO_QUESTIONS);
        assert_eq!(parse_questions(&response).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_rejects_invalid_answer_index() {
        let response = r#"[{"question": "Q", "options": ["a", "b"], "correctAnswer": 5}]"#;
        assert!(matches!(
            parse_questions(response),
            Err(GatewayError::InvalidQuestion { index: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert!(matches!(parse_questions("[]"), Err(GatewayError::EmptyQuiz)));
        assert!(matches!(
            parse_questions("抱歉，我无法完成"),
            Err(GatewayError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_topic_message_mentions_request() {
        let gateway = create_test_gateway();
        let request = TopicRequest {
            category: "Engineering".to_string(),
            year: "2".to_string(),
            difficulty: Difficulty::Hard,
            topic: "Thermodynamics".to_string(),
        };
        let message = gateway.build_topic_message(&request);
        assert!(message.contains("Write 5 hard"));
        assert!(message.contains("\"Thermodynamics\""));
        assert!(message.contains("Engineering"));

        let general = TopicRequest {
            topic: "  ".to_string(),
            ..request
        };
        assert!(gateway
            .build_topic_message(&general)
            .contains("broad mix of core topics for the Engineering track"));
    }

    #[test]
    fn test_file_message_by_mime_type() {
        let gateway = create_test_gateway();

        let text = FileUpload::from_bytes("细胞是生命的基本单位".as_bytes(), "text/plain");
        let (message, attachments) = gateway.build_file_message(&text).unwrap();
        assert!(message.contains("细胞是生命的基本单位"));
        assert!(attachments.is_empty());

        let image = FileUpload::from_bytes(&[0x89, 0x50, 0x4e, 0x47], "image/png");
        let (_, attachments) = gateway.build_file_message(&image).unwrap();
        let part = serde_json::to_value(&attachments[0]).unwrap();
        assert_eq!(part["type"], "image_url");
        assert!(part["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,"));

        let pdf = FileUpload::from_bytes(b"%PDF-1.7 lecture", "application/pdf");
        let (message, attachments) = gateway.build_file_message(&pdf).unwrap();
        assert!(!message.contains("DOCUMENT START"));
        assert_eq!(attachments.len(), 1);
        let part = serde_json::to_value(&attachments[0]).unwrap();
        assert_eq!(part["type"], "file");
        assert_eq!(part["file"]["filename"], "upload.pdf");
        assert_eq!(
            part["file"]["file_data"].as_str().unwrap(),
            pdf.data_url()
        );

        let binary = FileUpload::from_bytes(&[0, 1, 2], "application/octet-stream");
        assert!(matches!(
            gateway.build_file_message(&binary),
            Err(GatewayError::UnsupportedMimeType { .. })
        ));
    }

    /// 测试真实的按主题出题
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_generate_from_topic_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_generate_from_topic_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let gateway = create_test_gateway();
        let request = TopicRequest {
            category: "Medical".to_string(),
            year: "1".to_string(),
            difficulty: Difficulty::Medium,
            topic: "Human anatomy".to_string(),
        };

        match gateway.generate_from_topic(&request).await {
            Ok(questions) => {
                println!("\n========== 生成结果 ==========");
                for (i, q) in questions.iter().enumerate() {
                    println!("{}. {} -> {}", i + 1, q.prompt, q.choices[q.correct_index]);
                }
                assert!(!questions.is_empty());
            }
            Err(e) => panic!("生成失败: {}", e),
        }
    }
}
