pub mod community;
pub mod loaders;
pub mod question;
pub mod quiz_state;
pub mod status;
pub mod user;

pub use community::CommunityQuiz;
pub use loaders::{load_all_community_quizzes, load_community_quiz};
pub use question::{Answer, Question};
pub use quiz_state::{QuizSource, QuizState, QuizSummary};
pub use status::{AppStatus, Difficulty};
pub use user::UserInfo;
