pub mod quiz_flow;
pub mod router;

pub use quiz_flow::submit_answer;
pub use router::{transition, AppState, Effect, Event, Transition};
