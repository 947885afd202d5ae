use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::domain::{
    generation::{GenerationProgress, Language},
    quiz::Quiz,
    quiz_question::{QuizQuestion, QuizQuestionType, Selection},
    quiz_result::QuizResult,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Idle,
    Loading,
    Playing,
    Finished,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Idle => write!(f, "idle"),
            PhaseKind::Loading => write!(f, "loading"),
            PhaseKind::Playing => write!(f, "playing"),
            PhaseKind::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while the session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: PhaseKind,
    },

    #[error("option {index} is out of range for a question with {options} options")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("select at least one option before confirming")]
    EmptySelection,

    #[error("the current answer is already confirmed")]
    AlreadyConfirmed,

    #[error("confirm the current answer before moving on")]
    NotConfirmed,

    #[error("a single-choice question takes one option, got {0}")]
    SingleChoiceOverflow(usize),

    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("there are no incorrect questions to retry")]
    NothingToRetry,
}

/// Sub-state of the question currently on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuestionProgress {
    Unanswered,
    Selecting(Selection),
    Confirmed(Selection),
}

impl QuestionProgress {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            QuestionProgress::Unanswered => None,
            QuestionProgress::Selecting(selection) | QuestionProgress::Confirmed(selection) => {
                Some(selection)
            }
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, QuestionProgress::Confirmed(_))
    }
}

/// A quiz being played. The cursor only moves forward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayState {
    quiz: Quiz,
    answers: Vec<Selection>,
    cursor: usize,
    current: QuestionProgress,
}

impl PlayState {
    fn new(quiz: Quiz) -> Self {
        Self {
            answers: Vec::with_capacity(quiz.len()),
            quiz,
            cursor: 0,
            current: QuestionProgress::Unanswered,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &[Selection] {
        &self.answers
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn progress(&self) -> &QuestionProgress {
        &self.current
    }

    pub fn current_question(&self) -> &QuizQuestion {
        &self.quiz.questions[self.cursor]
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.quiz.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle {
        error: Option<String>,
    },
    Loading {
        attempt_id: Uuid,
        progress: GenerationProgress,
    },
    Playing(PlayState),
    Finished {
        quiz: Quiz,
        result: QuizResult,
    },
}

impl SessionPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            SessionPhase::Idle { .. } => PhaseKind::Idle,
            SessionPhase::Loading { .. } => PhaseKind::Loading,
            SessionPhase::Playing(_) => PhaseKind::Playing,
            SessionPhase::Finished { .. } => PhaseKind::Finished,
        }
    }
}

/// One player's quiz session: Idle -> Loading -> Playing -> Finished.
#[derive(Clone, Debug)]
pub struct QuizSession {
    pub id: Uuid,
    pub language: Language,
    phase: SessionPhase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn new(language: Language) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            language,
            phase: SessionPhase::Idle { error: None },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// The quiz being played or just finished.
    pub fn current_quiz(&self) -> Option<&Quiz> {
        match &self.phase {
            SessionPhase::Playing(play) => Some(&play.quiz),
            SessionPhase::Finished { quiz, .. } => Some(quiz),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            SessionPhase::Finished { result, .. } => Some(result),
            _ => None,
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        log::debug!(
            "session {} moving from {} to {}",
            self.id,
            self.phase.kind(),
            phase.kind()
        );
        self.phase = phase;
        self.updated_at = Utc::now();
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            phase: self.phase.kind(),
        }
    }

    /// Idle -> Loading. Returns the id of the new generation attempt.
    pub fn begin_generation(&mut self) -> Result<Uuid, SessionError> {
        if !matches!(self.phase, SessionPhase::Idle { .. }) {
            return Err(self.invalid("start generation"));
        }

        let attempt_id = Uuid::new_v4();
        self.set_phase(SessionPhase::Loading {
            attempt_id,
            progress: GenerationProgress::new(0, 0, String::new()),
        });
        Ok(attempt_id)
    }

    pub fn is_current_attempt(&self, attempt: Uuid) -> bool {
        matches!(self.phase, SessionPhase::Loading { attempt_id, .. } if attempt_id == attempt)
    }

    /// Records progress for `attempt`; reports from superseded attempts are
    /// dropped.
    pub fn update_progress(&mut self, attempt: Uuid, update: GenerationProgress) -> bool {
        match &mut self.phase {
            SessionPhase::Loading {
                attempt_id,
                progress,
            } if *attempt_id == attempt => {
                *progress = update;
                self.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Loading -> Playing on success, Loading -> Idle with the error message
    /// on failure. Returns `false` when `attempt` is no longer current.
    pub fn complete_generation(&mut self, attempt: Uuid, outcome: Result<Quiz, String>) -> bool {
        if !self.is_current_attempt(attempt) {
            return false;
        }

        match outcome {
            Ok(quiz) if !quiz.is_empty() => self.set_phase(SessionPhase::Playing(PlayState::new(quiz))),
            Ok(_) => self.set_phase(SessionPhase::Idle {
                error: Some(SessionError::EmptyQuiz.to_string()),
            }),
            Err(message) => self.set_phase(SessionPhase::Idle {
                error: Some(message),
            }),
        }
        true
    }

    /// Idle -> Playing with an already built quiz, bypassing generation.
    pub fn start_quiz(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        if !matches!(self.phase, SessionPhase::Idle { .. }) {
            return Err(self.invalid("start a quiz"));
        }
        if quiz.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }

        self.set_phase(SessionPhase::Playing(PlayState::new(quiz)));
        Ok(())
    }

    fn play_mut(&mut self, action: &'static str) -> Result<&mut PlayState, SessionError> {
        let phase = self.phase.kind();
        match &mut self.phase {
            SessionPhase::Playing(play) => Ok(play),
            _ => Err(SessionError::InvalidTransition { action, phase }),
        }
    }

    /// Clicks an option. Single questions replace the selection, multiple
    /// questions toggle membership.
    pub fn select_option(&mut self, index: usize) -> Result<QuestionProgress, SessionError> {
        let play = self.play_mut("select an option")?;
        let question = play.current_question();

        if index >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                index,
                options: question.options.len(),
            });
        }

        let mut selection = match &play.current {
            QuestionProgress::Confirmed(_) => return Err(SessionError::AlreadyConfirmed),
            QuestionProgress::Unanswered => Selection::new(),
            QuestionProgress::Selecting(selection) => selection.clone(),
        };

        match question.question_type {
            QuizQuestionType::Single => {
                selection.clear();
                selection.insert(index);
            }
            QuizQuestionType::Multiple => {
                if !selection.remove(&index) {
                    selection.insert(index);
                }
            }
        }

        play.current = if selection.is_empty() {
            QuestionProgress::Unanswered
        } else {
            QuestionProgress::Selecting(selection)
        };
        let progress = play.current.clone();
        self.updated_at = Utc::now();
        Ok(progress)
    }

    /// Locks the current selection and reveals whether it is correct.
    /// Unanswerable questions may be confirmed with nothing selected.
    pub fn confirm(&mut self) -> Result<bool, SessionError> {
        let play = self.play_mut("confirm an answer")?;
        let question = play.current_question();

        let selection = match &play.current {
            QuestionProgress::Confirmed(_) => return Err(SessionError::AlreadyConfirmed),
            QuestionProgress::Selecting(selection) => selection.clone(),
            QuestionProgress::Unanswered if !question.is_answerable() => Selection::new(),
            QuestionProgress::Unanswered => return Err(SessionError::EmptySelection),
        };

        let correct = question.is_correct(&selection);
        play.current = QuestionProgress::Confirmed(selection);
        self.updated_at = Utc::now();
        Ok(correct)
    }

    /// Records the confirmed answer and moves to the next question, or to
    /// Finished after the last one.
    pub fn advance(&mut self) -> Result<PhaseKind, SessionError> {
        let play = self.play_mut("advance")?;

        let QuestionProgress::Confirmed(selection) = &play.current else {
            return Err(SessionError::NotConfirmed);
        };
        play.answers.push(selection.clone());

        if !play.is_last() {
            play.cursor += 1;
            play.current = QuestionProgress::Unanswered;
            self.updated_at = Utc::now();
            return Ok(PhaseKind::Playing);
        }

        let quiz = play.quiz.clone();
        let result = QuizResult::grade(&quiz, std::mem::take(&mut play.answers));
        log::info!(
            "session {} finished '{}' with {}/{}",
            self.id,
            quiz.title,
            result.score,
            quiz.len()
        );
        self.set_phase(SessionPhase::Finished { quiz, result });
        Ok(PhaseKind::Finished)
    }

    /// Replaces the selection, confirms it and advances in one step.
    pub fn answer(&mut self, selection: Selection) -> Result<PhaseKind, SessionError> {
        let play = self.play_mut("answer")?;
        if play.current.is_confirmed() {
            return Err(SessionError::AlreadyConfirmed);
        }

        let options = play.current_question().options.len();
        if let Some(&index) = selection.iter().find(|&&i| i >= options) {
            return Err(SessionError::OptionOutOfRange { index, options });
        }
        if play.current_question().question_type == QuizQuestionType::Single && selection.len() > 1
        {
            return Err(SessionError::SingleChoiceOverflow(selection.len()));
        }
        if selection.is_empty() && play.current_question().is_answerable() {
            return Err(SessionError::EmptySelection);
        }

        play.current = if selection.is_empty() {
            QuestionProgress::Unanswered
        } else {
            QuestionProgress::Selecting(selection)
        };
        self.confirm()?;
        self.advance()
    }

    /// Finished -> Playing with only the incorrectly answered questions.
    pub fn retry_incorrect(&mut self) -> Result<Quiz, SessionError> {
        let SessionPhase::Finished { quiz, result } = &self.phase else {
            return Err(self.invalid("retry incorrect questions"));
        };

        let incorrect = quiz.incorrect_indices(&result.answers);
        if incorrect.is_empty() {
            return Err(SessionError::NothingToRetry);
        }

        let retry = quiz.derive_retry(&incorrect);
        self.set_phase(SessionPhase::Playing(PlayState::new(retry.clone())));
        Ok(retry)
    }

    /// Back to Idle, discarding any quiz, result or in-flight attempt.
    pub fn restart(&mut self) {
        if matches!(self.phase, SessionPhase::Idle { .. }) {
            return;
        }
        self.set_phase(SessionPhase::Idle { error: None });
    }
}
