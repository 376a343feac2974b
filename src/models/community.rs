use serde::{Deserialize, Serialize};

use crate::models::question::Question;

/// 社区测验
///
/// 由社区成员整理的现成题目，以 TOML 文件形式放在社区目录中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityQuiz {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub questions: Vec<Question>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl CommunityQuiz {
    /// 校验所有题目，返回第一个错误
    pub fn validate(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("没有题目".to_string());
        }
        for (i, q) in self.questions.iter().enumerate() {
            q.validate().map_err(|reason| format!("第 {} 题: {}", i + 1, reason))?;
        }
        Ok(())
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}

impl std::fmt::Display for CommunityQuiz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} 题)", self.title, self.questions.len())?;
        if let Some(author) = &self.author {
            write!(f, " - {}", author)?;
        }
        Ok(())
    }
}
