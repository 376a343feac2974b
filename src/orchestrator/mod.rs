//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! console (终端界面，只调用 App 的操作)
//!     ↓
//! orchestrator::App (持有 AppState，执行异步调用和副作用)
//!     ↓
//! workflow (router 迁移表 / quiz_flow 答题，纯函数)
//!     ↓
//! services (能力层：gateway / session / progress)
//!     ↓
//! infrastructure (基础设施：KeyValueStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一入口**：所有界面变化都经过 `workflow::transition`
//! 2. **资源隔离**：只有编排层持有网关、会话存储和进度计时器
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod app;

pub use app::App;
