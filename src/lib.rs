//! # Quiz Portal
//!
//! 一个基于终端的学习测验应用：按主题由 AI 生成测验、从上传的文件中提取题目、
//! 或者从社区门户选择现成的测验
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 键值存储能力
//! - `FileStore` / `MemoryStore` - 会话持久化的两种实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `QuizGateway` / `LlmQuizGateway` - 题目生成能力
//! - `SessionStore` - 用户会话的读写
//! - `UploadProgress` - 上传进度模拟
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 纯函数，不做任何 I/O
//! - `router` - 界面状态迁移表
//! - `quiz_flow` - 答题计分
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator::App` - 持有状态，执行异步调用和副作用
//!
//! ### ⑤ 界面（Console）
//! - `console` - 终端界面，只读取状态并调用 `App` 的操作

pub mod config;
pub mod console;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use console::Console;
pub use error::{AppError, AppResult};
pub use infrastructure::{FileStore, KeyValueStore, MemoryStore};
pub use models::{Answer, AppStatus, Difficulty, Question, QuizState, UserInfo};
pub use orchestrator::App;
pub use services::{FileUpload, LlmQuizGateway, QuizGateway};
pub use workflow::{transition, AppState, Event};
