use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    constants::messages,
    models::domain::{
        quiz::{merge_quizzes, shuffle_questions},
        Language, Quiz, QuizQuestion,
    },
};

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN is a valid regex pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("snapshot is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("snapshot has no questions array")]
    MissingQuestions,

    #[error("snapshot questions are malformed: {0}")]
    InvalidQuestions(String),

    #[error("none of the {0} staged snapshots could be imported")]
    NothingImported(usize),
}

/// A staged snapshot file awaiting import.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SnapshotFile {
    pub name: String,
    pub content: String,
}

/// A snapshot that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub quiz: Quiz,
    pub skipped: Vec<SkippedFile>,
}

/// Reads the questions out of a serialized snapshot. The file is accepted
/// only as a whole.
pub fn parse_quiz_snapshot(raw: &str) -> Result<Vec<QuizQuestion>, ParseError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let questions = match value.get("questions") {
        Some(questions @ Value::Array(_)) => questions.clone(),
        _ => return Err(ParseError::MissingQuestions),
    };

    serde_json::from_value(questions).map_err(|e| ParseError::InvalidQuestions(e.to_string()))
}

/// Merges every staged snapshot that parses, in staging order. Files that
/// fail are reported in the outcome and do not abort the import.
pub fn merge_snapshots(
    files: &[SnapshotFile],
    language: Language,
    shuffle: bool,
) -> Result<MergeOutcome, ParseError> {
    let mut names = Vec::new();
    let mut lists = Vec::new();
    let mut skipped = Vec::new();

    for file in files {
        match parse_quiz_snapshot(&file.content) {
            Ok(questions) => {
                names.push(file.name.as_str());
                lists.push(questions);
            }
            Err(e) => {
                log::warn!("Skipping snapshot '{}': {}", file.name, e);
                skipped.push(SkippedFile {
                    name: file.name.clone(),
                    reason: messages::invalid_quiz_file(language).to_string(),
                });
            }
        }
    }

    if lists.is_empty() {
        return Err(ParseError::NothingImported(files.len()));
    }

    let mut quiz = merge_quizzes(lists, messages::merged_title(language, &names.join(", ")));
    if shuffle {
        quiz.questions = shuffle_questions(&quiz.questions, &mut rand::rng());
    }

    log::info!(
        "Imported {} questions from {} snapshots ({} skipped)",
        quiz.len(),
        names.len(),
        skipped.len()
    );
    Ok(MergeOutcome { quiz, skipped })
}

pub fn export_snapshot(quiz: &Quiz) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quiz)
}

/// Suggested download name, e.g. `cell_biology_quiz.json`. Control
/// characters, quotes and path separators are dropped.
pub fn export_file_name(title: &str) -> String {
    let name: String = WHITESPACE_RUN
        .replace_all(title.trim(), "_")
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
        .collect();
    format!("{}_quiz.json", name)
}

/// Plain ASCII variant of a file name for clients without RFC 5987 support.
pub fn ascii_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_graphic() { c } else { '_' })
        .collect()
}
