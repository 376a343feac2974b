use serde::{Deserialize, Serialize};
use std::fmt;

/// 单选题
///
/// 生成后不可变，只在一次测验期间由 `QuizState` 持有
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(alias = "question")]
    pub prompt: String,
    #[serde(alias = "options")]
    pub choices: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "correct_answer", alias = "correctIndex")]
    pub correct_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, choices: Vec<String>, correct_index: usize) -> Self {
        Self {
            prompt: prompt.into(),
            choices,
            correct_index,
            explanation: None,
        }
    }

    /// 校验题目结构
    ///
    /// # 返回
    /// 不合法时返回原因
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("题干为空".to_string());
        }
        if self.choices.len() < 2 {
            return Err(format!("选项数量不足: {}", self.choices.len()));
        }
        if self.correct_index >= self.choices.len() {
            return Err(format!(
                "正确答案索引 {} 超出范围 [0, {})",
                self.correct_index,
                self.choices.len()
            ));
        }
        Ok(())
    }

    pub fn is_correct(&self, answer: Answer) -> bool {
        matches!(answer, Answer::Choice(i) if i == self.correct_index)
    }
}

/// 用户提交的答案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// 选项索引（0-based）
    Choice(usize),
    /// 跳过
    Skipped,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Choice(i) => write!(f, "{}", i),
            Answer::Skipped => write!(f, "skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_generator_field_names() {
        let json = r#"{
            "question": "2 + 2 = ?",
            "options": ["3", "4", "5", "6"],
            "correctAnswer": 1,
            "explanation": "基本加法"
        }"#;

        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.prompt, "2 + 2 = ?");
        assert_eq!(q.choices.len(), 4);
        assert_eq!(q.correct_index, 1);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_questions() {
        let q = Question::new("题目", vec!["a".into(), "b".into()], 2);
        assert!(q.validate().is_err());

        let q = Question::new("  ", vec!["a".into(), "b".into()], 0);
        assert!(q.validate().is_err());

        let q = Question::new("题目", vec!["a".into()], 0);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_skip_is_never_correct() {
        let q = Question::new("题目", vec!["a".into(), "b".into()], 0);
        assert!(q.is_correct(Answer::Choice(0)));
        assert!(!q.is_correct(Answer::Choice(1)));
        assert!(!q.is_correct(Answer::Skipped));
    }
}
