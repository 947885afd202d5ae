pub mod extraction;
pub mod generator;
pub mod import_service;
pub mod model_service;
pub mod quiz_generation_service;
pub mod session_service;
pub mod source_text;

pub use generator::{BatchRequest, BatchResponse, GenerationError, QuizBatchGenerator};
pub use quiz_generation_service::{GenerationParams, QuizGenerationService};
pub use session_service::SessionService;
