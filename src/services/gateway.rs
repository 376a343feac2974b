//! 题目生成网关 - 业务能力层
//!
//! 描述"把主题或文件变成一组题目"的能力，不关心界面流程

use async_trait::async_trait;
use base64::Engine;
use std::path::Path;

use crate::error::{FileError, GatewayError};
use crate::models::{Difficulty, Question};

/// 题目生成网关
///
/// 两个入口都是一次性调用：要么完整成功，要么失败，不重试
#[async_trait]
pub trait QuizGateway: Send + Sync {
    /// 按主题生成题目
    async fn generate_from_topic(&self, request: &TopicRequest) -> Result<Vec<Question>, GatewayError>;

    /// 从上传的文件中提取题目
    async fn generate_from_file(&self, upload: &FileUpload) -> Result<Vec<Question>, GatewayError>;
}

/// 按主题生成的请求参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub category: String,
    pub year: String,
    pub difficulty: Difficulty,
    /// 为空表示该类别的综合测验
    pub topic: String,
}

/// 已读入内存并编码的上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// base64 编码后的文件内容
    pub encoded: String,
    pub mime_type: String,
}

impl FileUpload {
    /// 从原始字节创建
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            encoded: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// 完整读取文件并编码，MIME 类型按扩展名推断
    pub async fn read(path: &Path) -> Result<Self, FileError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;
        Ok(Self::from_bytes(&bytes, guess_mime_type(path)))
    }

    /// 解码文件内容
    pub fn decode(&self) -> Result<Vec<u8>, GatewayError> {
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.encoded)?)
    }

    /// 可作为纯文本嵌入提示词的类型
    pub fn is_text(&self) -> bool {
        self.mime_type.starts_with("text/") || self.mime_type == "application/json"
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// 以文件形式原样转发给模型的文档类型
    pub fn is_document(&self) -> bool {
        document_extension(&self.mime_type).is_some()
    }

    /// 转发文档时使用的文件名
    pub fn file_name(&self) -> String {
        format!("upload.{}", document_extension(&self.mime_type).unwrap_or("bin"))
    }

    /// data URL 形式（用于 Vision API）
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded)
    }
}

const DOCUMENT_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("application/msword", "doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "pptx",
    ),
    ("application/rtf", "rtf"),
];

fn document_extension(mime_type: &str) -> Option<&'static str> {
    DOCUMENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .map(|(_, ext)| *ext)
}

/// 根据扩展名推断 MIME 类型
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "rtf" => "application/rtf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("notes.PDF")), "application/pdf");
        assert_eq!(guess_mime_type(Path::new("scan.jpeg")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("ch1.md")), "text/markdown");
        assert_eq!(guess_mime_type(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_documents_are_forwarded_as_files() {
        let pdf = FileUpload::from_bytes(b"%PDF-1.7", guess_mime_type(Path::new("lecture.pdf")));
        assert!(pdf.is_document());
        assert_eq!(pdf.file_name(), "upload.pdf");

        let docx = FileUpload::from_bytes(b"PK", guess_mime_type(Path::new("notes.docx")));
        assert!(docx.is_document());
        assert_eq!(docx.file_name(), "upload.docx");

        let blob = FileUpload::from_bytes(&[0, 1], "application/octet-stream");
        assert!(!blob.is_document());
    }

    #[test]
    fn test_encode_and_decode() {
        let upload = FileUpload::from_bytes(b"hello", "text/plain");
        assert_eq!(upload.encoded, "aGVsbG8=");
        assert_eq!(upload.decode().unwrap(), b"hello");
        assert!(upload.is_text());
        assert!(!upload.is_image());
        assert_eq!(upload.data_url(), "data:text/plain;base64,aGVsbG8=");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let upload = FileUpload {
            encoded: "***".to_string(),
            mime_type: "text/plain".to_string(),
        };
        assert!(matches!(upload.decode(), Err(GatewayError::InvalidEncoding(_))));
    }

    #[tokio::test]
    async fn test_read_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chapter.txt");
        std::fs::write(&path, "光合作用").unwrap();

        let upload = FileUpload::read(&path).await.unwrap();
        assert_eq!(upload.mime_type, "text/plain");
        assert_eq!(String::from_utf8(upload.decode().unwrap()).unwrap(), "光合作用");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let result = FileUpload::read(Path::new("/definitely/not/here.pdf")).await;
        assert!(matches!(result, Err(FileError::ReadFailed { .. })));
    }
}
