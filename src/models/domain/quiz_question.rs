use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of options every well-formed question carries.
pub const OPTION_COUNT: usize = 4;

/// Option indices picked by the player for one question.
pub type Selection = BTreeSet<usize>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuizQuestionType,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    // Kept signed so that out-of-range values from untrusted input survive
    // deserialization and are caught by `defects` instead.
    #[serde(default)]
    pub correct_indices: Vec<i64>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuizQuestionType {
    Single,   // Exactly one correct option
    Multiple, // Two or more correct options
}

/// Structural problems that make a question unanswerable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuestionDefect {
    #[error("expected 4 options, found {0}")]
    OptionCount(usize),

    #[error("correct index {0} is out of range")]
    IndexOutOfRange(i64),

    #[error("correct index {0} is listed more than once")]
    DuplicateIndex(i64),

    #[error("{question_type:?} question has {correct} correct options")]
    KindMismatch {
        question_type: QuizQuestionType,
        correct: usize,
    },
}

impl QuizQuestion {
    /// Lists every structural invariant this question violates.
    pub fn defects(&self) -> Vec<QuestionDefect> {
        let mut defects = Vec::new();

        if self.options.len() != OPTION_COUNT {
            defects.push(QuestionDefect::OptionCount(self.options.len()));
        }

        let mut seen = BTreeSet::new();
        for &index in &self.correct_indices {
            if index < 0 || index as usize >= self.options.len() {
                defects.push(QuestionDefect::IndexOutOfRange(index));
            }
            if !seen.insert(index) {
                defects.push(QuestionDefect::DuplicateIndex(index));
            }
        }

        let kind_matches = match self.question_type {
            QuizQuestionType::Single => seen.len() == 1,
            QuizQuestionType::Multiple => seen.len() >= 2,
        };
        if !kind_matches {
            defects.push(QuestionDefect::KindMismatch {
                question_type: self.question_type,
                correct: seen.len(),
            });
        }

        defects
    }

    pub fn is_answerable(&self) -> bool {
        self.defects().is_empty()
    }

    /// The correct option set, or `None` when the question is malformed.
    pub fn correct_set(&self) -> Option<Selection> {
        if !self.is_answerable() {
            return None;
        }
        Some(self.correct_indices.iter().map(|&i| i as usize).collect())
    }

    /// Exact set match against the correct options. A malformed question is
    /// never answered correctly.
    pub fn is_correct(&self, selected: &Selection) -> bool {
        self.correct_set()
            .is_some_and(|correct| &correct == selected)
    }
}

/// Order-independent correctness check over a raw list of picked indices.
pub fn is_correct(question: &QuizQuestion, selected: &[usize]) -> bool {
    let selection: Selection = selected.iter().copied().collect();
    question.is_correct(&selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{multiple_question, single_question};

    fn selection(indices: &[usize]) -> Selection {
        indices.iter().copied().collect()
    }

    #[test]
    fn quiz_question_type_serializes_lowercase() {
        let json = serde_json::to_string(&QuizQuestionType::Multiple).expect("type should serialize");
        assert_eq!(json, "\"multiple\"");
    }

    #[test]
    fn quiz_question_type_rejects_unknown_variant() {
        let parsed = serde_json::from_str::<QuizQuestionType>("\"essay\"");

        assert!(parsed.is_err());
    }

    #[test]
    fn quiz_question_uses_snapshot_field_names() {
        let question = single_question("q-1", 2);
        let value = serde_json::to_value(&question).expect("question should serialize");

        assert_eq!(value["type"], "single");
        assert_eq!(value["question"], "Question q-1?");
        assert_eq!(value["correctIndices"], serde_json::json!([2]));
        assert!(value.get("difficulty").is_none());
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let raw = r#"{"id":"q","type":"single","question":"Why?"}"#;
        let question: QuizQuestion = serde_json::from_str(raw).expect("question should parse");

        assert!(question.options.is_empty());
        assert!(question.correct_indices.is_empty());
        assert!(!question.is_answerable());
    }

    #[test]
    fn single_question_requires_exactly_one_correct_index() {
        assert!(single_question("q", 1).is_answerable());

        let mut broken = single_question("q", 1);
        broken.correct_indices = vec![0, 1];
        assert!(broken
            .defects()
            .contains(&QuestionDefect::KindMismatch {
                question_type: QuizQuestionType::Single,
                correct: 2
            }));
    }

    #[test]
    fn multiple_question_requires_two_or_more_correct_indices() {
        assert!(multiple_question("q", &[0, 3]).is_answerable());
        assert!(!multiple_question("q", &[3]).is_answerable());
    }

    #[test]
    fn defects_report_out_of_range_and_duplicate_indices() {
        let mut question = multiple_question("q", &[0, 4, 0]);
        question.options.pop();

        let defects = question.defects();
        assert!(defects.contains(&QuestionDefect::OptionCount(3)));
        assert!(defects.contains(&QuestionDefect::IndexOutOfRange(4)));
        assert!(defects.contains(&QuestionDefect::DuplicateIndex(0)));
    }

    #[test]
    fn multiple_question_rejects_singleton_subset_and_superset() {
        let question = multiple_question("q", &[0, 2]);

        assert!(question.is_correct(&selection(&[0, 2])));
        assert!(!question.is_correct(&selection(&[0])));
        assert!(!question.is_correct(&selection(&[0, 1, 2])));
        assert!(!question.is_correct(&selection(&[])));
    }

    #[test]
    fn is_correct_is_order_independent() {
        let question = multiple_question("q", &[3, 1, 0]);

        for order in [[0, 1, 3], [3, 1, 0], [1, 3, 0], [3, 0, 1]] {
            assert!(is_correct(&question, &order));
        }
        assert!(is_correct(&question, &[1, 1, 0, 3]));
    }

    #[test]
    fn malformed_question_is_always_incorrect() {
        let mut question = single_question("q", 1);
        question.correct_indices = vec![7];

        for picked in 0..OPTION_COUNT {
            assert!(!is_correct(&question, &[picked]));
        }
        assert!(!is_correct(&question, &[7]));
        assert_eq!(question.correct_set(), None);
    }
}
