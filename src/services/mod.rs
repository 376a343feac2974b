pub mod gateway;
pub mod llm_service;
pub mod progress;
pub mod session_store;

pub use gateway::{FileUpload, QuizGateway, TopicRequest};
pub use llm_service::LlmQuizGateway;
pub use progress::{ProgressTicker, UploadProgress};
pub use session_store::SessionStore;
