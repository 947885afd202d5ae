use serde::{Deserialize, Serialize};

use crate::models::domain::{quiz::Quiz, quiz_question::Selection};

/// Outcome of one play-through of a quiz.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub answers: Vec<Selection>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    Excellent,
    Good,
    Nice,
    KeepStudying,
}

impl QuizResult {
    /// Scores `answers` against `quiz`. The stored record is padded or cut to
    /// exactly one entry per question.
    pub fn grade(quiz: &Quiz, mut answers: Vec<Selection>) -> Self {
        answers.resize_with(quiz.len(), Selection::new);
        let score = quiz.score(&answers);
        Self { score, answers }
    }

    pub fn percentage(&self) -> u8 {
        let total = self.answers.len().max(1);
        ((self.score as f64 / total as f64) * 100.0).round() as u8
    }

    pub fn grade_band(&self) -> GradeBand {
        match self.percentage() {
            80.. => GradeBand::Excellent,
            60..=79 => GradeBand::Good,
            40..=59 => GradeBand::Nice,
            _ => GradeBand::KeepStudying,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{sample_quiz, single_question};

    fn selection(indices: &[usize]) -> Selection {
        indices.iter().copied().collect()
    }

    #[test]
    fn grade_pads_missing_answers() {
        let quiz = sample_quiz();
        let result = QuizResult::grade(&quiz, vec![selection(&[1])]);

        assert_eq!(result.score, 1);
        assert_eq!(result.answers.len(), quiz.len());
        assert!(result.answers[1].is_empty());
    }

    #[test]
    fn grade_never_exceeds_question_count() {
        let quiz = sample_quiz();
        let result = QuizResult::grade(
            &quiz,
            vec![selection(&[1]), selection(&[0, 2]), selection(&[3])],
        );

        assert_eq!(result.score, 2);
        assert_eq!(result.answers.len(), 2);
    }

    #[test]
    fn grade_bands_follow_percentage_thresholds() {
        let quiz = Quiz::new("Bands", (0..5).map(|i| single_question(&i.to_string(), 0)).collect());
        let band_for = |correct: usize| {
            let answers = (0..5)
                .map(|i| if i < correct { selection(&[0]) } else { selection(&[1]) })
                .collect();
            QuizResult::grade(&quiz, answers).grade_band()
        };

        assert_eq!(band_for(5), GradeBand::Excellent);
        assert_eq!(band_for(4), GradeBand::Excellent);
        assert_eq!(band_for(3), GradeBand::Good);
        assert_eq!(band_for(2), GradeBand::Nice);
        assert_eq!(band_for(1), GradeBand::KeepStudying);
    }

    #[test]
    fn percentage_of_empty_quiz_is_zero() {
        let result = QuizResult::grade(&Quiz::new("Empty", vec![]), vec![]);
        assert_eq!(result.percentage(), 0);
    }
}
