pub mod adapter;
pub mod session;

pub use adapter::{from_bundle, load_questions};
pub use session::{AnswerEntry, Feedback, PracticeQuestion, PracticeSession, Score};
