use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    models::domain::{Difficulty, Language},
    services::{
        extraction::SourceDocument, import_service::SnapshotFile,
        quiz_generation_service::MAX_QUESTION_COUNT,
    },
};

fn default_true() -> bool {
    true
}

fn default_count() -> usize {
    10
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_has_source"))]
pub struct GenerateQuizRequest {
    #[validate(range(min = 1, max = MAX_QUESTION_COUNT))]
    #[serde(default = "default_count")]
    pub count: usize,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub documents: Vec<SourceDocument>,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[validate(length(max = 2000))]
    #[serde(default)]
    pub custom_prompt: String,

    #[serde(default = "default_true")]
    pub shuffle: bool,

    #[serde(default = "default_true")]
    pub fix_spacing: bool,

    /// Comma separated phrases to strip from the source text.
    #[serde(default)]
    pub keywords_to_remove: String,
}

fn validate_has_source(request: &GenerateQuizRequest) -> Result<(), ValidationError> {
    if request.text.trim().is_empty() && request.documents.is_empty() {
        return Err(ValidationError::new("empty_source")
            .with_message("provide text or at least one document".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportQuizRequest {
    #[validate(length(min = 1))]
    pub snapshots: Vec<SnapshotFile>,

    #[serde(default = "default_true")]
    pub shuffle: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionRequest {
    pub option_index: usize,
}
