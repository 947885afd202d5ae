use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::domain::{Difficulty, Language, QuizQuestion};

/// One request to the external question generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub source_text: String,
    pub requested_count: usize,
    pub difficulty: Difficulty,
    pub language: Language,
    pub custom_instructions: String,
    /// Prompts of questions produced by earlier batches.
    pub avoid_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
pub struct BatchResponse {
    /// A catchy title for the quiz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),

    #[error("generator request failed: {0}")]
    Request(String),

    #[error("generator returned an empty response")]
    EmptyResponse,

    #[error("generator response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("batch {batch} of {total_batches} failed: {source}")]
    Batch {
        batch: usize,
        total_batches: usize,
        #[source]
        source: Box<GenerationError>,
    },

    #[error("no questions were generated")]
    NoQuestions,
}

impl GenerationError {
    /// The failure that started it all, unwrapping batch context.
    pub fn root_cause(&self) -> &GenerationError {
        match self {
            GenerationError::Batch { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// The external generative service. Implementations must fail loudly when
/// they cannot produce the question schema rather than truncate silently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizBatchGenerator: Send + Sync {
    async fn generate_batch(&self, request: BatchRequest) -> Result<BatchResponse, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_response_tolerates_missing_title() {
        let parsed: BatchResponse =
            serde_json::from_str(r#"{"questions": []}"#).expect("response should parse");

        assert_eq!(parsed.title, None);
        assert!(parsed.questions.is_empty());
    }

    #[test]
    fn batch_error_displays_context_and_root_cause() {
        let err = GenerationError::Batch {
            batch: 2,
            total_batches: 3,
            source: Box::new(GenerationError::Request("timeout".into())),
        };

        assert_eq!(
            err.to_string(),
            "batch 2 of 3 failed: generator request failed: timeout"
        );
        assert_eq!(err.root_cause(), &GenerationError::Request("timeout".into()));
    }
}
