use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Config,
    constants::{prompts::QUIZ_GENERATOR_SYSTEM_PROMPT, quiz_prompt::quiz_batch_prompt},
    services::generator::{BatchRequest, BatchResponse, GenerationError, QuizBatchGenerator},
};

static BATCH_RESPONSE_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_json::to_value(schemars::schema_for!(BatchResponse)).unwrap_or_else(|_| json!({}))
});

/// Question generator backed by an OpenAI-compatible chat completions API.
pub struct ModelService {
    client: Client<OpenAIConfig>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionBody {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ModelService {
    pub fn new(config: &Config) -> Self {
        let mut openai_config =
            OpenAIConfig::new().with_api_key(config.openai_api_key.expose_secret());
        if let Some(api_base) = &config.openai_api_base {
            openai_config = openai_config.with_api_base(api_base.clone());
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.quiz_model.clone(),
        }
    }

    fn build_request(&self, request: &BatchRequest) -> serde_json::Value {
        let schema = BATCH_RESPONSE_SCHEMA.clone();
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": QUIZ_GENERATOR_SYSTEM_PROMPT },
                { "role": "user", "content": quiz_batch_prompt(request) }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "quiz_batch",
                    "schema": schema
                }
            }
        })
    }
}

#[async_trait]
impl QuizBatchGenerator for ModelService {
    async fn generate_batch(&self, request: BatchRequest) -> Result<BatchResponse, GenerationError> {
        log::info!(
            "Requesting {} questions from model {}",
            request.requested_count,
            self.model
        );

        let body: ChatCompletionBody = self
            .client
            .chat()
            .create_byot(self.build_request(&request))
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)?;

        parse_batch_response(&content)
    }
}

/// Parses the model's JSON payload, tolerating a surrounding markdown fence.
pub fn parse_batch_response(content: &str) -> Result<BatchResponse, GenerationError> {
    let trimmed = content.trim();
    let payload = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if payload.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    serde_json::from_str(payload).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Difficulty, Language, QuizQuestionType};

    const PAYLOAD: &str = r#"{
        "title": "Cells",
        "questions": [{
            "id": "1",
            "type": "multiple",
            "question": "Which are organelles?",
            "options": ["Nucleus", "Mitochondrion", "Protein", "Ribosome"],
            "correctIndices": [0, 1, 3],
            "explanation": "Proteins are molecules."
        }]
    }"#;

    #[test]
    fn parse_batch_response_reads_plain_json() {
        let response = parse_batch_response(PAYLOAD).expect("payload should parse");

        assert_eq!(response.title.as_deref(), Some("Cells"));
        assert_eq!(response.questions.len(), 1);
        assert_eq!(response.questions[0].question_type, QuizQuestionType::Multiple);
        assert_eq!(response.questions[0].correct_indices, vec![0, 1, 3]);
    }

    #[test]
    fn parse_batch_response_strips_markdown_fence() {
        let fenced = format!("```json\n{}\n```", PAYLOAD);
        let response = parse_batch_response(&fenced).expect("fenced payload should parse");
        assert_eq!(response.questions.len(), 1);
    }

    #[test]
    fn parse_batch_response_rejects_empty_and_garbage() {
        assert_eq!(parse_batch_response("   "), Err(GenerationError::EmptyResponse));
        assert!(matches!(
            parse_batch_response("not json"),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn build_request_carries_model_prompt_and_schema() {
        let service = ModelService::new(&Config::test_config());
        let request = BatchRequest {
            source_text: "Cells are the basic unit of life.".to_string(),
            requested_count: 5,
            difficulty: Difficulty::Easy,
            language: Language::En,
            custom_instructions: String::new(),
            avoid_topics: vec![],
        };

        let body = service.build_request(&request);

        assert_eq!(body["model"], Config::test_config().quiz_model);
        assert_eq!(body["messages"][0]["role"], "system");
        let user_prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
        assert!(user_prompt.contains("exactly 5 questions"));
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert!(body["response_format"]["json_schema"]["schema"]["properties"]
            .get("questions")
            .is_some());
    }
}
