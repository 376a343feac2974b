//! 终端界面
//!
//! 每个界面状态对应一屏文本，用户逐行输入命令。
//! 界面只读取状态并调用 `App` 的操作，不直接修改状态

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::models::{Answer, AppStatus, CommunityQuiz, Difficulty, UserInfo};
use crate::orchestrator::App;
use crate::services::FileUpload;
use crate::workflow::AppState;

/// 用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Logout,
    Start { difficulty: Difficulty, topic: String },
    Upload(PathBuf),
    Portal,
    Back,
    Select(usize),
    Answer(Answer),
    ExitQuiz,
    Home,
    Help,
    Unknown(String),
}

/// 按当前界面解析一行输入
pub fn parse_command(status: AppStatus, line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let head_lower = head.to_lowercase();

    match (status, head_lower.as_str()) {
        (_, "quit" | "q") => Command::Quit,
        (_, "help" | "?") => Command::Help,
        (AppStatus::Dashboard, "logout") => Command::Logout,
        (AppStatus::Dashboard, "portal") => Command::Portal,
        (AppStatus::Dashboard, "start") => {
            let (first, remainder) = match rest.split_once(char::is_whitespace) {
                Some((first, remainder)) => (first, remainder.trim()),
                None => (rest, ""),
            };
            match Difficulty::parse(first) {
                Some(difficulty) => Command::Start {
                    difficulty,
                    topic: remainder.to_string(),
                },
                // 第一个词不是难度时，整段都当作主题
                None => Command::Start {
                    difficulty: Difficulty::default(),
                    topic: rest.to_string(),
                },
            }
        }
        (AppStatus::Dashboard | AppStatus::KmuPortal, "upload") if !rest.is_empty() => {
            Command::Upload(PathBuf::from(rest))
        }
        (AppStatus::KmuPortal | AppStatus::Error, "back") => Command::Back,
        (AppStatus::KmuPortal, n) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Select(n - 1),
            _ => Command::Unknown(line.to_string()),
        },
        (AppStatus::Quiz, "s" | "skip") => Command::Answer(Answer::Skipped),
        (AppStatus::Quiz, "exit") => Command::ExitQuiz,
        (AppStatus::Quiz, n) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Answer(Answer::Choice(n - 1)),
            _ => Command::Unknown(line.to_string()),
        },
        (AppStatus::Result, "home" | "reset") => Command::Home,
        _ => Command::Unknown(line.to_string()),
    }
}

/// 当前界面可用的命令
pub fn command_help(status: AppStatus) -> &'static str {
    match status {
        AppStatus::Idle => "按提示依次输入姓名、类别和年级\n",
        AppStatus::Dashboard => {
            "命令: start <easy|medium|hard> [主题] | upload <文件> | portal | logout | quit\n"
        }
        AppStatus::KmuPortal => "命令: <编号> | upload <文件> | back | quit\n",
        AppStatus::Loading => "正在生成题目，请稍候\n",
        AppStatus::Quiz => "命令: <选项编号> | s (跳过) | exit | quit\n",
        AppStatus::Result => "命令: home | quit\n",
        AppStatus::Error => "命令: back | quit\n",
    }
}

/// 渲染当前界面
pub fn render(state: &AppState, community: &[CommunityQuiz], progress: u8) -> String {
    let mut out = String::new();
    let title = format!("==== {} ====\n", state.status);
    out.push_str(&title);

    match state.status {
        AppStatus::Idle => {
            out.push_str("欢迎！请先注册。\n");
        }
        AppStatus::Dashboard => {
            if let Some(user) = &state.user {
                out.push_str(&format!("你好，{} ({} / {})\n", user.name, user.category, user.year));
            }
            if state.is_uploading {
                out.push_str(&format!("📤 上传中... {}%\n", progress));
            }
            out.push_str(command_help(AppStatus::Dashboard));
        }
        AppStatus::KmuPortal => {
            if community.is_empty() {
                out.push_str("暂无社区测验\n");
            }
            for (i, quiz) in community.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, quiz));
            }
            if state.is_uploading {
                out.push_str(&format!("📤 上传中... {}%\n", progress));
            }
            out.push_str(command_help(AppStatus::KmuPortal));
        }
        AppStatus::Loading => {
            out.push_str("🤖 正在生成题目，请稍候...\n");
        }
        AppStatus::Quiz => {
            if let Some(quiz) = &state.quiz {
                if let Some(question) = quiz.current_question() {
                    out.push_str(&format!(
                        "第 {}/{} 题  (得分 {})\n{}\n",
                        quiz.current_question_index + 1,
                        quiz.total(),
                        quiz.score,
                        question.prompt
                    ));
                    for (i, choice) in question.choices.iter().enumerate() {
                        out.push_str(&format!("  {}. {}\n", i + 1, choice));
                    }
                }
            }
            out.push_str(command_help(AppStatus::Quiz));
        }
        AppStatus::Result => {
            if let Some(quiz) = &state.quiz {
                out.push_str(&format!("{}\n", quiz.source));
                out.push_str(&format!("{}\n", quiz.summary(chrono::Local::now())));
                for (i, (question, answer)) in quiz.questions.iter().zip(&quiz.answers).enumerate() {
                    let mark = match answer {
                        Answer::Skipped => "⏭️",
                        a if question.is_correct(*a) => "✅",
                        _ => "❌",
                    };
                    out.push_str(&format!(
                        "  {} {}. {} → {}\n",
                        mark,
                        i + 1,
                        crate::utils::truncate_text(&question.prompt, 40),
                        question
                            .choices
                            .get(question.correct_index)
                            .map(String::as_str)
                            .unwrap_or("?")
                    ));
                }
            }
            out.push_str(command_help(AppStatus::Result));
        }
        AppStatus::Error => {
            out.push_str(&format!(
                "❌ {}\n",
                state.error.as_deref().unwrap_or("未知错误")
            ));
            out.push_str(command_help(AppStatus::Error));
        }
    }

    out
}

/// 终端界面主循环
pub struct Console {
    app: App,
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn new(app: App) -> Self {
        Self {
            app,
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            print!(
                "\n{}",
                render(
                    self.app.state(),
                    self.app.community_quizzes(),
                    self.app.upload_progress()
                )
            );

            if self.app.status() == AppStatus::Idle {
                match self.read_registration().await? {
                    Some(user) => self.app.login(user).await.context("登录失败")?,
                    None => break,
                }
                continue;
            }

            let Some(line) = self.prompt("> ").await? else {
                break;
            };

            match parse_command(self.app.status(), &line) {
                Command::Quit => break,
                command => {
                    if let Err(e) = self.execute(command).await {
                        println!("⚠️ {}", e);
                    }
                }
            }
        }

        println!("再见！");
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Logout => self.app.logout().await?,
            Command::Start { difficulty, topic } => {
                println!("🤖 正在生成题目，请稍候...");
                self.app.start_examination(difficulty, &topic).await?;
            }
            Command::Upload(path) => self.upload(path).await?,
            Command::Portal => self.app.open_portal().await?,
            Command::Back => match self.app.status() {
                AppStatus::KmuPortal => self.app.portal_back().await?,
                _ => self.app.error_back().await?,
            },
            Command::Select(index) => self.app.select_community_quiz(index).await?,
            Command::Answer(answer) => self.app.answer(answer).await?,
            Command::ExitQuiz => self.app.exit_quiz().await?,
            Command::Home => self.app.reset().await?,
            Command::Help => print!("{}", command_help(self.app.status())),
            Command::Quit => {}
            Command::Unknown(line) => println!("无法识别的命令: {}", line),
        }
        Ok(())
    }

    async fn upload(&mut self, path: PathBuf) -> Result<()> {
        let upload = FileUpload::read(&path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;

        let mut rx = self.app.subscribe_progress();
        let printer = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let value = *rx.borrow();
                print!("\r📤 上传中... {:>3}%", value);
                let _ = std::io::stdout().flush();
            }
        });

        let result = self.app.upload_file(upload).await;
        printer.abort();
        println!();

        Ok(result?)
    }

    async fn read_registration(&mut self) -> Result<Option<UserInfo>> {
        let Some(name) = self.prompt_non_empty("姓名: ").await? else {
            return Ok(None);
        };
        let Some(category) = self.prompt_non_empty("类别 (如 Engineering / Medical): ").await? else {
            return Ok(None);
        };
        let Some(year) = self.prompt_non_empty("年级: ").await? else {
            return Ok(None);
        };
        Ok(Some(UserInfo::new(name, category, year)))
    }

    async fn prompt_non_empty(&mut self, label: &str) -> Result<Option<String>> {
        loop {
            match self.prompt(label).await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(line.trim().to_string())),
                None => return Ok(None),
            }
        }
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{}", label);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}
