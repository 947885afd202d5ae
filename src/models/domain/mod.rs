pub mod generation;
pub mod quiz;
pub mod quiz_question;
pub mod quiz_result;
pub mod session;
pub use generation::{Difficulty, GenerationProgress, Language};
pub use quiz::Quiz;
pub use quiz_question::{QuizQuestion, QuizQuestionType, Selection};
pub use quiz_result::QuizResult;
pub use session::{PhaseKind, QuizSession, SessionError, SessionPhase};
