use rand::{seq::SliceRandom, Rng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz_question::{QuizQuestion, Selection};

/// Appended to the title of a quiz built from incorrectly answered questions.
pub const RETRY_MARKER: &str = " (Retry)";

/// An immutable quiz. Retries and merges build new values.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_retry: bool,
}

impl Quiz {
    pub fn new(title: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        Quiz {
            title: title.into(),
            questions,
            is_retry: false,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions whose aligned answer matches exactly. Missing
    /// answers count as empty selections.
    pub fn score(&self, answers: &[Selection]) -> usize {
        let empty = Selection::new();
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, question)| question.is_correct(answers.get(*i).unwrap_or(&empty)))
            .count()
    }

    /// Positions of the questions that were not answered correctly.
    pub fn incorrect_indices(&self, answers: &[Selection]) -> Vec<usize> {
        let empty = Selection::new();
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, question)| !question.is_correct(answers.get(*i).unwrap_or(&empty)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Builds a retry quiz from the questions at `incorrect_indices`, in the
    /// order given. Indices past the end are ignored.
    pub fn derive_retry(&self, incorrect_indices: &[usize]) -> Quiz {
        let questions = incorrect_indices
            .iter()
            .filter_map(|&i| self.questions.get(i).cloned())
            .collect();

        Quiz {
            title: format!("{}{}", self.title, RETRY_MARKER),
            questions,
            is_retry: true,
        }
    }

    /// Same quiz with its questions in a uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Quiz {
        Quiz {
            title: self.title.clone(),
            questions: shuffle_questions(&self.questions, rng),
            is_retry: self.is_retry,
        }
    }
}

/// Concatenates every question list in input order. No deduplication.
pub fn merge_quizzes<I>(question_lists: I, title: impl Into<String>) -> Quiz
where
    I: IntoIterator<Item = Vec<QuizQuestion>>,
{
    let questions = question_lists.into_iter().flatten().collect();
    Quiz::new(title, questions)
}

/// Fisher-Yates permutation into a new vector; the input is left untouched.
pub fn shuffle_questions<R: Rng + ?Sized>(questions: &[QuizQuestion], rng: &mut R) -> Vec<QuizQuestion> {
    let mut shuffled = questions.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{multiple_question, sample_quiz, single_question};
    use rand::{rngs::StdRng, SeedableRng};

    fn answers(sets: &[&[usize]]) -> Vec<Selection> {
        sets.iter().map(|s| s.iter().copied().collect()).collect()
    }

    #[test]
    fn score_counts_all_correct_answers() {
        let quiz = sample_quiz();
        assert_eq!(quiz.score(&answers(&[&[1], &[0, 2]])), quiz.len());
    }

    #[test]
    fn score_of_empty_answers_is_zero() {
        let quiz = sample_quiz();
        assert_eq!(quiz.score(&answers(&[&[], &[]])), 0);
        assert_eq!(quiz.score(&[]), 0);
    }

    #[test]
    fn incorrect_indices_lists_wrong_and_missing_answers() {
        let quiz = sample_quiz();
        assert_eq!(quiz.incorrect_indices(&answers(&[&[1]])), vec![1]);
        assert_eq!(quiz.incorrect_indices(&answers(&[&[0], &[0]])), vec![0, 1]);
        assert!(quiz.incorrect_indices(&answers(&[&[1], &[2, 0]])).is_empty());
    }

    #[test]
    fn derive_retry_keeps_selected_questions_in_order() {
        let quiz = Quiz::new(
            "Biology",
            vec![
                single_question("a", 0),
                single_question("b", 1),
                multiple_question("c", &[1, 2]),
                single_question("d", 3),
            ],
        );

        let retry = quiz.derive_retry(&[1, 3]);

        assert_eq!(retry.title, "Biology (Retry)");
        assert!(retry.is_retry);
        assert_eq!(retry.len(), 2);
        assert_eq!(retry.questions[0], quiz.questions[1]);
        assert_eq!(retry.questions[1], quiz.questions[3]);
        assert!(!quiz.is_retry);
        assert_eq!(quiz.len(), 4);
    }

    #[test]
    fn derive_retry_skips_out_of_range_indices() {
        let quiz = sample_quiz();
        let retry = quiz.derive_retry(&[0, 9]);
        assert_eq!(retry.len(), 1);
    }

    #[test]
    fn merge_concatenates_in_input_order() {
        let a = single_question("A", 0);
        let b = single_question("B", 1);
        let c = multiple_question("C", &[0, 1]);

        let merged = merge_quizzes(vec![vec![a.clone(), b.clone()], vec![c.clone()]], "T");

        assert_eq!(merged.title, "T");
        assert_eq!(merged.questions, vec![a, b, c]);
        assert!(!merged.is_retry);
    }

    #[test]
    fn merge_does_not_deduplicate() {
        let a = single_question("A", 0);
        let merged = merge_quizzes(vec![vec![a.clone()], vec![a]], "T");
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn shuffle_is_a_permutation_and_leaves_input_untouched() {
        let questions: Vec<_> = (0..12)
            .map(|i| single_question(&format!("q-{i}"), (i % 4) as i64))
            .collect();
        let original = questions.clone();
        let mut rng = StdRng::seed_from_u64(7);

        let shuffled = shuffle_questions(&questions, &mut rng);

        assert_eq!(questions, original);
        let mut before: Vec<_> = original.iter().map(|q| q.id.clone()).collect();
        let mut after: Vec<_> = shuffled.iter().map(|q| q.id.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn shuffle_of_empty_or_single_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle_questions(&[], &mut rng).is_empty());

        let one = vec![single_question("only", 2)];
        assert_eq!(shuffle_questions(&one, &mut rng), one);
    }

    #[test]
    fn shuffle_reaches_every_permutation_of_three() {
        let questions = vec![
            single_question("a", 0),
            single_question("b", 0),
            single_question("c", 0),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = std::collections::HashMap::new();

        for _ in 0..6000 {
            let order: String = shuffle_questions(&questions, &mut rng)
                .iter()
                .map(|q| q.id.as_str())
                .collect();
            *counts.entry(order).or_insert(0usize) += 1;
        }

        assert_eq!(counts.len(), 6);
        assert!(counts.values().all(|&n| (800..1200).contains(&n)));
    }

    #[test]
    fn snapshot_omits_is_retry_when_false() {
        let quiz = sample_quiz();
        let value = serde_json::to_value(&quiz).expect("quiz should serialize");
        assert!(value.get("isRetry").is_none());

        let retry = quiz.derive_retry(&[0]);
        let value = serde_json::to_value(&retry).expect("quiz should serialize");
        assert_eq!(value["isRetry"], true);
    }
}
