//! 测验状态
//!
//! 一次测验从开始到结束的全部记录

use chrono::{DateTime, Local};

use crate::models::question::{Answer, Question};
use crate::models::status::Difficulty;

/// 题目来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizSource {
    /// AI 按主题生成
    Topic { topic: String, difficulty: Difficulty },
    /// 从上传的文件中提取
    File { mime_type: String },
    /// 社区测验
    Community { title: String },
}

impl std::fmt::Display for QuizSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizSource::Topic { topic, difficulty } if topic.is_empty() => {
                write!(f, "AI 综合测验 ({})", difficulty)
            }
            QuizSource::Topic { topic, difficulty } => write!(f, "AI 测验: {} ({})", topic, difficulty),
            QuizSource::File { mime_type } => write!(f, "文件提取 ({})", mime_type),
            QuizSource::Community { title } => write!(f, "社区测验: {}", title),
        }
    }
}

/// 测验状态
///
/// 不变量：
/// - 未结束时 `answers.len() == current_question_index`
/// - 结束后 `answers.len() == questions.len()`
/// - 任意时刻 `score + wrong() + skipped == answers.len()`
#[derive(Debug, Clone, PartialEq)]
pub struct QuizState {
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub score: usize,
    pub skipped: usize,
    pub is_finished: bool,
    pub answers: Vec<Answer>,
    pub start_time: DateTime<Local>,
    /// 最后一题作答的时间
    pub finished_at: Option<DateTime<Local>>,
    pub source: QuizSource,
}

impl QuizState {
    /// 开始新的测验，题目为空时返回 `None`
    pub fn new(questions: Vec<Question>, source: QuizSource, now: DateTime<Local>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            questions,
            current_question_index: 0,
            score: 0,
            skipped: 0,
            is_finished: false,
            answers: Vec::new(),
            start_time: now,
            finished_at: None,
            source,
        })
    }

    /// 当前题目，测验结束后返回 `None`
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished {
            return None;
        }
        self.questions.get(self.current_question_index)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 答错的题数（不含跳过）
    pub fn wrong(&self) -> usize {
        self.answers.len() - self.score - self.skipped
    }

    /// 是否为最后一题
    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.questions.len()
    }

    /// 生成成绩摘要
    ///
    /// 已结束的测验按结束时间计时，`now` 只用于进行中的测验
    pub fn summary(&self, now: DateTime<Local>) -> QuizSummary {
        let total = self.total();
        let percentage = if total == 0 {
            0
        } else {
            ((self.score as f64 / total as f64) * 100.0).round() as u32
        };
        QuizSummary {
            total,
            answered: self.answers.len(),
            correct: self.score,
            wrong: self.wrong(),
            skipped: self.skipped,
            percentage,
            elapsed: self
                .finished_at
                .unwrap_or(now)
                .signed_duration_since(self.start_time),
        }
    }
}

/// 成绩摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub skipped: usize,
    pub percentage: u32,
    pub elapsed: chrono::Duration,
}

impl std::fmt::Display for QuizSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.elapsed.num_seconds().max(0);
        write!(
            f,
            "得分 {}/{} ({}%) | 错误 {} | 跳过 {} | 用时 {}分{:02}秒",
            self.correct,
            self.total,
            self.percentage,
            self.wrong,
            self.skipped,
            secs / 60,
            secs % 60
        )
    }
}
