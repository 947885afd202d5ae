use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Copy)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
            Difficulty::Mixed => write!(f, "Mixed"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Vi,
}

impl Language {
    /// Name of the language as written into generation prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Vi => "Vietnamese",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "vi" => Ok(Language::Vi),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

/// Progress report emitted by the batch orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProgress {
    pub current_batch: usize,
    pub total_batches: usize,
    pub message: String,
}

impl GenerationProgress {
    pub fn new(current_batch: usize, total_batches: usize, message: impl Into<String>) -> Self {
        Self {
            current_batch,
            total_batches,
            message: message.into(),
        }
    }

    /// Completed fraction as a percentage, `0` before any batch is known.
    pub fn percent(&self) -> u8 {
        if self.total_batches == 0 {
            return 0;
        }
        ((self.current_batch.min(self.total_batches) * 100) / self.total_batches) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!(" vi ".parse::<Language>(), Ok(Language::Vi));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn language_serializes_as_code() {
        let json = serde_json::to_string(&Language::En).expect("language should serialize");
        assert_eq!(json, "\"en\"");
    }

    #[test]
    fn difficulty_defaults_to_mixed() {
        assert_eq!(Difficulty::default(), Difficulty::Mixed);
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
    }

    #[test]
    fn progress_percent_handles_unknown_total() {
        assert_eq!(GenerationProgress::new(0, 0, "").percent(), 0);
        assert_eq!(GenerationProgress::new(1, 3, "").percent(), 33);
        assert_eq!(GenerationProgress::new(3, 3, "").percent(), 100);
    }
}
