use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::domain::{
        quiz_result::GradeBand, session::PlayState, GenerationProgress, Language, PhaseKind,
        Quiz, QuizQuestion, QuizQuestionType, QuizResult, QuizSession, SessionPhase,
    },
    services::import_service::SkippedFile,
};

/// A question as shown to the player. Never carries the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuizQuestionType,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    pub answerable: bool,
}

impl From<&QuizQuestion> for QuestionView {
    fn from(question: &QuizQuestion) -> Self {
        QuestionView {
            id: question.id.clone(),
            question_type: question.question_type,
            question: question.prompt.clone(),
            options: question.options.clone(),
            difficulty: question.difficulty.clone(),
            answerable: question.is_answerable(),
        }
    }
}

/// Revealed once the current answer is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_indices: Vec<usize>,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayView {
    pub title: String,
    pub is_retry: bool,
    pub question_number: usize,
    pub total_questions: usize,
    pub is_last: bool,
    pub question: QuestionView,
    pub selected: Vec<usize>,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<AnswerFeedback>,
}

impl From<&PlayState> for PlayView {
    fn from(play: &PlayState) -> Self {
        let question = play.current_question();
        let progress = play.progress();
        let selected: Vec<usize> = progress
            .selection()
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();

        let feedback = progress.is_confirmed().then(|| AnswerFeedback {
            correct: progress
                .selection()
                .is_some_and(|selection| question.is_correct(selection)),
            correct_indices: question
                .correct_set()
                .map(|set| set.into_iter().collect())
                .unwrap_or_default(),
            explanation: question.explanation.clone(),
        });

        PlayView {
            title: play.quiz().title.clone(),
            is_retry: play.quiz().is_retry,
            question_number: play.cursor() + 1,
            total_questions: play.quiz().len(),
            is_last: play.is_last(),
            question: question.into(),
            selected,
            confirmed: progress.is_confirmed(),
            feedback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub question: QuestionView,
    pub selected: Vec<usize>,
    pub correct_indices: Vec<usize>,
    pub correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub title: String,
    pub is_retry: bool,
    pub score: usize,
    pub total: usize,
    pub percentage: u8,
    pub grade: GradeBand,
    pub incorrect_indices: Vec<usize>,
    pub review: Vec<ReviewItem>,
}

impl ResultView {
    pub fn new(quiz: &Quiz, result: &QuizResult) -> Self {
        let review: Vec<ReviewItem> = quiz
            .questions
            .iter()
            .zip(&result.answers)
            .map(|(question, answer)| ReviewItem {
                question: question.into(),
                selected: answer.iter().copied().collect(),
                correct_indices: question
                    .correct_set()
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default(),
                correct: question.is_correct(answer),
                explanation: question.explanation.clone(),
            })
            .collect();

        ResultView {
            title: quiz.title.clone(),
            is_retry: quiz.is_retry,
            score: result.score,
            total: quiz.len(),
            percentage: result.percentage(),
            grade: result.grade_band(),
            incorrect_indices: quiz.incorrect_indices(&result.answers),
            review,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub current_batch: usize,
    pub total_batches: usize,
    pub message: String,
    pub percent: u8,
}

impl From<&GenerationProgress> for ProgressView {
    fn from(progress: &GenerationProgress) -> Self {
        ProgressView {
            current_batch: progress.current_batch,
            total_batches: progress.total_batches,
            message: progress.message.clone(),
            percent: progress.percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub language: Language,
    pub phase: PhaseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play: Option<PlayView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&QuizSession> for SessionView {
    fn from(session: &QuizSession) -> Self {
        let mut view = SessionView {
            id: session.id,
            language: session.language,
            phase: session.phase_kind(),
            error: None,
            progress: None,
            play: None,
            result: None,
            created_at: session.created_at,
            updated_at: session.updated_at,
        };

        match session.phase() {
            SessionPhase::Idle { error } => view.error = error.clone(),
            SessionPhase::Loading { progress, .. } => view.progress = Some(progress.into()),
            SessionPhase::Playing(play) => view.play = Some(play.into()),
            SessionPhase::Finished { quiz, result } => {
                view.result = Some(ResultView::new(quiz, result))
            }
        }
        view
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStartedResponse {
    pub session_id: Uuid,
    pub attempt_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub session: SessionView,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSessionResponse {
    pub message: String,
}
