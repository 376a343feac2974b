pub mod toml_loader;

pub use toml_loader::{load_all_community_quizzes, load_community_quiz};
