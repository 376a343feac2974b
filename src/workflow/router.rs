//! 界面路由 - 流程层
//!
//! 显式的状态迁移表：`transition(状态, 事件, 当前时间) → 新状态 + 副作用`
//!
//! ```text
//! Idle      ──登录──────────▶ Dashboard
//! Dashboard ──开始考试──────▶ Loading ──成功──▶ Quiz / ──失败──▶ Error
//! Dashboard ──门户──────────▶ KmuPortal ──返回──▶ Dashboard
//! Dashboard/KmuPortal ──上传（界面不变）──成功──▶ Quiz / ──失败──▶ Error
//! Quiz      ──最后一题──────▶ Result ──返回──▶ Dashboard
//! Quiz / Error ──退出/返回──▶ Dashboard
//! ```
//!
//! 迁移表之外的事件一律拒绝

use chrono::{DateTime, Local};

use crate::error::TransitionError;
use crate::models::{Answer, AppStatus, Question, QuizSource, QuizState, UserInfo};
use crate::workflow::quiz_flow::submit_answer;

/// 按主题生成失败时展示的消息
pub const GENERATION_ERROR_MESSAGE: &str = "AI Engine Error. Check API connection.";
/// 文件提取失败时展示的消息
pub const EXTRACTION_ERROR_MESSAGE: &str = "Extraction failed.";

/// 应用状态
///
/// 所有跨界面的状态都在这里，只能通过 `transition` 产生新值
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub status: AppStatus,
    pub user: Option<UserInfo>,
    pub quiz: Option<QuizState>,
    pub is_uploading: bool,
    pub error: Option<String>,
}

impl AppState {
    /// 未登录的初始状态
    pub fn idle() -> Self {
        Self {
            status: AppStatus::Idle,
            user: None,
            quiz: None,
            is_uploading: false,
            error: None,
        }
    }

    /// 从已保存的会话恢复
    pub fn restored(user: UserInfo) -> Self {
        Self {
            status: AppStatus::Dashboard,
            user: Some(user),
            ..Self::idle()
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::idle()
    }
}

/// 界面事件
#[derive(Debug, Clone)]
pub enum Event {
    LoginSubmitted(UserInfo),
    Logout,
    StartExamination,
    GenerationSucceeded {
        questions: Vec<Question>,
        source: QuizSource,
    },
    GenerationFailed,
    OpenPortal,
    PortalBack,
    UploadStarted,
    ExtractionSucceeded {
        questions: Vec<Question>,
        mime_type: String,
    },
    ExtractionFailed,
    CommunityQuizSelected {
        title: String,
        questions: Vec<Question>,
    },
    QuestionAnswered(Answer),
    ExitQuiz,
    ResetOrHome,
    ErrorBack,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::LoginSubmitted(_) => "LoginSubmitted",
            Event::Logout => "Logout",
            Event::StartExamination => "StartExamination",
            Event::GenerationSucceeded { .. } => "GenerationSucceeded",
            Event::GenerationFailed => "GenerationFailed",
            Event::OpenPortal => "OpenPortal",
            Event::PortalBack => "PortalBack",
            Event::UploadStarted => "UploadStarted",
            Event::ExtractionSucceeded { .. } => "ExtractionSucceeded",
            Event::ExtractionFailed => "ExtractionFailed",
            Event::CommunityQuizSelected { .. } => "CommunityQuizSelected",
            Event::QuestionAnswered(_) => "QuestionAnswered",
            Event::ExitQuiz => "ExitQuiz",
            Event::ResetOrHome => "ResetOrHome",
            Event::ErrorBack => "ErrorBack",
        }
    }

    fn is_extraction_outcome(&self) -> bool {
        matches!(self, Event::ExtractionSucceeded { .. } | Event::ExtractionFailed)
    }
}

/// 迁移产生的副作用，由编排层执行
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistSession(UserInfo),
    ClearSession,
}

/// 一次迁移的结果
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
}

/// 状态迁移
///
/// # 参数
/// - `state`: 当前状态（不会被修改）
/// - `event`: 事件
/// - `now`: 新测验的开始时间
///
/// # 返回
/// 新状态和需要执行的副作用；不在迁移表中的事件返回错误
pub fn transition(
    state: &AppState,
    event: Event,
    now: DateTime<Local>,
) -> Result<Transition, TransitionError> {
    let name = event.name();

    // 上传进行中只接受上传结果
    if state.is_uploading && !event.is_extraction_outcome() {
        return Err(TransitionError::UploadInFlight { event: name });
    }

    let mut next = state.clone();
    let mut effects = Vec::new();

    match (state.status, event) {
        (AppStatus::Idle, Event::LoginSubmitted(user)) => {
            effects.push(Effect::PersistSession(user.clone()));
            next.user = Some(user);
            next.status = AppStatus::Dashboard;
        }
        (AppStatus::Dashboard, Event::Logout) => {
            effects.push(Effect::ClearSession);
            next.user = None;
            next.status = AppStatus::Idle;
        }
        (AppStatus::Dashboard, Event::StartExamination) => {
            next.status = AppStatus::Loading;
        }
        (AppStatus::Loading, Event::GenerationSucceeded { questions, source }) => {
            next.quiz = Some(start_quiz(questions, source, now)?);
            next.status = AppStatus::Quiz;
        }
        (AppStatus::Loading, Event::GenerationFailed) => {
            next.error = Some(GENERATION_ERROR_MESSAGE.to_string());
            next.status = AppStatus::Error;
        }
        (AppStatus::Dashboard, Event::OpenPortal) => {
            next.status = AppStatus::KmuPortal;
        }
        (AppStatus::KmuPortal, Event::PortalBack) => {
            next.status = AppStatus::Dashboard;
        }
        (AppStatus::Dashboard | AppStatus::KmuPortal, Event::UploadStarted) => {
            next.is_uploading = true;
        }
        (AppStatus::Dashboard | AppStatus::KmuPortal, Event::ExtractionSucceeded { questions, mime_type }) => {
            if !state.is_uploading {
                return Err(TransitionError::NotUploading { event: name });
            }
            next.quiz = Some(start_quiz(questions, QuizSource::File { mime_type }, now)?);
            next.is_uploading = false;
            next.status = AppStatus::Quiz;
        }
        (AppStatus::Dashboard | AppStatus::KmuPortal, Event::ExtractionFailed) => {
            if !state.is_uploading {
                return Err(TransitionError::NotUploading { event: name });
            }
            next.is_uploading = false;
            next.error = Some(EXTRACTION_ERROR_MESSAGE.to_string());
            next.status = AppStatus::Error;
        }
        (AppStatus::KmuPortal, Event::CommunityQuizSelected { title, questions }) => {
            next.quiz = Some(start_quiz(questions, QuizSource::Community { title }, now)?);
            next.status = AppStatus::Quiz;
        }
        (AppStatus::Quiz, Event::QuestionAnswered(answer)) => {
            let quiz = state.quiz.as_ref().ok_or(TransitionError::NoActiveQuiz)?;
            let mut updated = submit_answer(quiz, answer)?;
            if updated.is_finished {
                updated.finished_at = Some(now);
                next.status = AppStatus::Result;
            }
            next.quiz = Some(updated);
        }
        (AppStatus::Quiz, Event::ExitQuiz) | (AppStatus::Result, Event::ResetOrHome) => {
            next.quiz = None;
            next.status = AppStatus::Dashboard;
        }
        (AppStatus::Error, Event::ErrorBack) => {
            next.error = None;
            next.status = AppStatus::Dashboard;
        }
        (from, _) => {
            return Err(TransitionError::NotAllowed { from, event: name });
        }
    }

    Ok(Transition {
        state: next,
        effects,
    })
}

fn start_quiz(
    questions: Vec<Question>,
    source: QuizSource,
    now: DateTime<Local>,
) -> Result<QuizState, TransitionError> {
    QuizState::new(questions, source, now).ok_or(TransitionError::EmptyQuiz)
}
