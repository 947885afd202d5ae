use crate::models::domain::{Quiz, QuizQuestion, QuizQuestionType};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    fn options(id: &str) -> Vec<String> {
        (0..4).map(|i| format!("{} option {}", id, i)).collect()
    }

    /// A well-formed single-choice question.
    pub fn single_question(id: &str, correct: i64) -> QuizQuestion {
        QuizQuestion {
            id: id.to_string(),
            question_type: QuizQuestionType::Single,
            prompt: format!("Question {}?", id),
            options: options(id),
            correct_indices: vec![correct],
            explanation: format!("Because of {}", id),
            difficulty: None,
        }
    }

    /// A multiple-choice question with the given correct indices.
    pub fn multiple_question(id: &str, correct: &[i64]) -> QuizQuestion {
        QuizQuestion {
            id: id.to_string(),
            question_type: QuizQuestionType::Multiple,
            prompt: format!("Question {}?", id),
            options: options(id),
            correct_indices: correct.to_vec(),
            explanation: format!("Because of {}", id),
            difficulty: Some("Medium".to_string()),
        }
    }

    /// Two questions: Q1 single with {1}, Q2 multiple with {0, 2}.
    pub fn sample_quiz() -> Quiz {
        Quiz::new(
            "Sample",
            vec![single_question("q1", 1), multiple_question("q2", &[0, 2])],
        )
    }

    /// `count` single-choice questions with ids `<prefix>-<n>`.
    pub fn question_batch(prefix: &str, count: usize) -> Vec<QuizQuestion> {
        (0..count)
            .map(|i| single_question(&format!("{}-{}", prefix, i), (i % 4) as i64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_fixtures_sample_quiz_is_well_formed() {
        let quiz = sample_quiz();
        assert_eq!(quiz.len(), 2);
        assert!(quiz.questions.iter().all(|q| q.is_answerable()));
    }

    #[test]
    fn test_fixtures_question_batch_has_unique_ids() {
        let batch = question_batch("b", 5);
        let mut ids: Vec<_> = batch.iter().map(|q| q.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(batch[4].id, "b-4");
    }
}
