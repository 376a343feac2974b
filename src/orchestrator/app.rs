//! 应用编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **启动**：读取已保存的会话，决定初始界面
//! 2. **事件派发**：所有界面变化都经过 `workflow::router::transition`
//! 3. **副作用**：执行迁移产生的会话写入/删除
//! 4. **异步调用**：调用题目生成网关，把失败转换为错误界面
//! 5. **进度模拟**：上传期间驱动装饰性的进度条
//!
//! 一次只处理一个操作（`&mut self`），上一个操作结束前不会开始下一个

use chrono::Local;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, GatewayError, SessionError};
use crate::infrastructure::KeyValueStore;
use crate::models::{
    load_all_community_quizzes, Answer, AppStatus, CommunityQuiz, Difficulty, Question,
    QuizSource, QuizState, QuizSummary, UserInfo,
};
use crate::services::progress::COMPLETION_GRACE;
use crate::services::{FileUpload, QuizGateway, SessionStore, TopicRequest, UploadProgress};
use crate::utils::logging::{log_quiz_finished, log_startup};
use crate::workflow::{transition, AppState, Effect, Event};

/// 应用主结构
pub struct App {
    config: Config,
    state: AppState,
    gateway: Arc<dyn QuizGateway>,
    sessions: SessionStore,
    progress: UploadProgress,
    community: Vec<CommunityQuiz>,
}

impl App {
    /// 初始化应用
    ///
    /// 存在合法会话时直接进入主面板；会话数据损坏时记录错误、删除记录并回到注册页
    pub async fn initialize(
        config: Config,
        gateway: Arc<dyn QuizGateway>,
        store: Box<dyn KeyValueStore>,
    ) -> AppResult<Self> {
        log_startup(&config);

        let sessions = SessionStore::new(store);

        let state = match sessions.load().await {
            Ok(Some(user)) => {
                info!("👤 恢复会话: {} ({} / {})", user.name, user.category, user.year);
                AppState::restored(user)
            }
            Ok(None) => AppState::idle(),
            Err(e @ SessionError::Corrupt { .. }) => {
                error!("❌ 已保存的会话无法解析，已丢弃: {}", e);
                sessions.clear().await?;
                AppState::idle()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            config,
            state,
            gateway,
            sessions,
            progress: UploadProgress::new(),
            community: Vec::new(),
        })
    }

    // ========== 查询 ==========

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn status(&self) -> AppStatus {
        self.state.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 当前上传进度（0-100）
    pub fn upload_progress(&self) -> u8 {
        self.progress.value()
    }

    /// 订阅上传进度变化
    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// 打开门户时加载的社区测验
    pub fn community_quizzes(&self) -> &[CommunityQuiz] {
        &self.community
    }

    /// 当前测验的成绩摘要
    pub fn summary(&self) -> Option<QuizSummary> {
        self.state.quiz.as_ref().map(|quiz| quiz.summary(Local::now()))
    }

    // ========== 界面操作 ==========

    /// 注册 / 登录
    pub async fn login(&mut self, user: UserInfo) -> AppResult<()> {
        info!("👤 登录: {} ({} / {})", user.name, user.category, user.year);
        self.dispatch(Event::LoginSubmitted(user)).await
    }

    /// 退出登录
    pub async fn logout(&mut self) -> AppResult<()> {
        info!("👋 退出登录");
        self.dispatch(Event::Logout).await
    }

    /// 打开社区门户并加载社区测验列表
    pub async fn open_portal(&mut self) -> AppResult<()> {
        self.dispatch(Event::OpenPortal).await?;

        self.community = match load_all_community_quizzes(&self.config.community_folder).await {
            Ok(quizzes) => {
                info!("📚 找到 {} 个社区测验", quizzes.len());
                quizzes
            }
            Err(e) => {
                warn!("⚠️ 无法加载社区测验: {}", e);
                Vec::new()
            }
        };

        Ok(())
    }

    /// 从社区门户返回
    pub async fn portal_back(&mut self) -> AppResult<()> {
        self.dispatch(Event::PortalBack).await
    }

    /// 开始 AI 考试
    ///
    /// 生成失败不会返回错误，而是切换到错误界面
    pub async fn start_examination(&mut self, difficulty: Difficulty, topic: &str) -> AppResult<()> {
        self.dispatch(Event::StartExamination).await?;

        // 主面板一定有登录用户
        let (category, year) = self
            .state
            .user
            .as_ref()
            .map(|u| (u.category.clone(), u.year.clone()))
            .unwrap_or_default();
        let request = TopicRequest {
            category,
            year,
            difficulty,
            topic: topic.trim().to_string(),
        };

        info!(
            "🤖 正在生成测验: {} / {} / {} / {}",
            request.category,
            request.year,
            request.difficulty,
            if request.topic.is_empty() { "综合" } else { request.topic.as_str() }
        );

        let gateway = Arc::clone(&self.gateway);
        let result = run_with_timeout(
            self.config.generation_timeout(),
            gateway.generate_from_topic(&request),
        )
        .await;

        match non_empty(result) {
            Ok(questions) => {
                info!("✓ 生成完成，共 {} 道题", questions.len());
                let source = QuizSource::Topic {
                    topic: request.topic,
                    difficulty,
                };
                self.dispatch(Event::GenerationSucceeded { questions, source })
                    .await
            }
            Err(e) => {
                error!("❌ 生成测验失败: {}", e);
                self.dispatch(Event::GenerationFailed).await
            }
        }
    }

    /// 上传文件并提取题目
    ///
    /// 上传期间界面不变，只有进度条在走；提取失败会切换到错误界面
    pub async fn upload_file(&mut self, upload: FileUpload) -> AppResult<()> {
        self.dispatch(Event::UploadStarted).await?;

        info!(
            "📤 正在从文件提取题目 ({}, {} 字节编码)",
            upload.mime_type,
            upload.encoded.len()
        );

        let ticker = self.progress.start();

        let gateway = Arc::clone(&self.gateway);
        let result = run_with_timeout(
            self.config.generation_timeout(),
            gateway.generate_from_file(&upload),
        )
        .await;

        match non_empty(result) {
            Ok(questions) => {
                ticker.complete();
                info!("✓ 提取完成，共 {} 道题", questions.len());
                tokio::time::sleep(COMPLETION_GRACE).await;
                self.dispatch(Event::ExtractionSucceeded {
                    questions,
                    mime_type: upload.mime_type,
                })
                .await
            }
            Err(e) => {
                drop(ticker);
                error!("❌ 文件提取失败: {}", e);
                self.dispatch(Event::ExtractionFailed).await
            }
        }
    }

    /// 在社区门户中选择一个测验
    pub async fn select_community_quiz(&mut self, index: usize) -> AppResult<()> {
        let quiz = self
            .community
            .get(index)
            .cloned()
            .ok_or(AppError::CommunityQuizNotFound {
                index,
                available: self.community.len(),
            })?;

        info!("📖 开始社区测验: {}", quiz);
        self.dispatch(Event::CommunityQuizSelected {
            title: quiz.title,
            questions: quiz.questions,
        })
        .await
    }

    /// 回答当前题目
    pub async fn answer(&mut self, answer: Answer) -> AppResult<()> {
        self.dispatch(Event::QuestionAnswered(answer)).await?;

        if self.state.status == AppStatus::Result {
            if let Some(quiz) = &self.state.quiz {
                log_quiz_finished(&quiz.source, &quiz.summary(Local::now()));
            }
        }
        Ok(())
    }

    /// 中途退出测验
    pub async fn exit_quiz(&mut self) -> AppResult<()> {
        self.dispatch(Event::ExitQuiz).await
    }

    /// 从成绩页返回主面板
    pub async fn reset(&mut self) -> AppResult<()> {
        self.dispatch(Event::ResetOrHome).await
    }

    /// 从错误页返回主面板
    pub async fn error_back(&mut self) -> AppResult<()> {
        self.dispatch(Event::ErrorBack).await
    }

    // ========== 内部 ==========

    /// 计算迁移、执行副作用、提交新状态
    ///
    /// 副作用失败时状态保持不变
    async fn dispatch(&mut self, event: Event) -> AppResult<()> {
        let name = event.name();
        let next = transition(&self.state, event, Local::now()).map_err(|e| {
            warn!("⚠️ 忽略事件 {}: {}", name, e);
            e
        })?;

        for effect in &next.effects {
            self.apply_effect(effect).await?;
        }

        if next.state.status != self.state.status {
            debug!("界面切换: {} → {} ({})", self.state.status, next.state.status, name);
        }
        self.state = next.state;
        Ok(())
    }

    async fn apply_effect(&self, effect: &Effect) -> AppResult<()> {
        match effect {
            Effect::PersistSession(user) => self.sessions.save(user).await?,
            Effect::ClearSession => self.sessions.clear().await?,
        }
        Ok(())
    }
}

/// 给生成调用加上可选的超时
async fn run_with_timeout<F>(
    limit: Option<Duration>,
    fut: F,
) -> Result<Vec<Question>, GatewayError>
where
    F: Future<Output = Result<Vec<Question>, GatewayError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or(Err(GatewayError::Timeout {
                secs: limit.as_secs(),
            })),
        None => fut.await,
    }
}

// 网关返回空列表也按失败处理
fn non_empty(
    result: Result<Vec<Question>, GatewayError>,
) -> Result<Vec<Question>, GatewayError> {
    match result {
        Ok(questions) if questions.is_empty() => Err(GatewayError::EmptyQuiz),
        other => other,
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("status", &self.state.status)
            .field("user", &self.state.user.as_ref().map(|u| &u.name))
            .field("quiz", &self.state.quiz.as_ref().map(QuizState::total))
            .field("is_uploading", &self.state.is_uploading)
            .finish()
    }
}
