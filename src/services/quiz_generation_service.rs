use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    constants::messages,
    models::domain::{quiz::shuffle_questions, Difficulty, GenerationProgress, Language, Quiz, QuizQuestion},
    services::generator::{BatchRequest, GenerationError, QuizBatchGenerator},
};

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);
pub const MAX_QUESTION_COUNT: usize = 100;

/// Everything needed to generate one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub source_text: String,
    pub total_count: usize,
    pub difficulty: Difficulty,
    pub language: Language,
    pub custom_instructions: String,
    pub shuffle: bool,
}

/// Produces a quiz of `total_count` questions through sequential generator
/// batches. Later batches are told about earlier questions so they can avoid
/// repeats, which is why batches never run concurrently.
pub struct QuizGenerationService {
    generator: Arc<dyn QuizBatchGenerator>,
    batch_size: usize,
    batch_delay: Duration,
    avoid_topics_limit: Option<usize>,
}

impl QuizGenerationService {
    pub fn new(generator: Arc<dyn QuizBatchGenerator>) -> Self {
        Self {
            generator,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            avoid_topics_limit: None,
        }
    }

    pub fn from_config(generator: Arc<dyn QuizBatchGenerator>, config: &Config) -> Self {
        Self::new(generator)
            .with_batch_size(config.batch_size)
            .with_batch_delay(Duration::from_millis(config.batch_delay_ms))
            .with_avoid_topics_limit(config.avoid_topics_limit)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn with_avoid_topics_limit(mut self, limit: Option<usize>) -> Self {
        self.avoid_topics_limit = limit;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.batch_size)
    }

    fn avoid_topics(&self, questions: &[QuizQuestion]) -> Vec<String> {
        let skip = self
            .avoid_topics_limit
            .map_or(0, |limit| questions.len().saturating_sub(limit));
        questions.iter().skip(skip).map(|q| q.prompt.clone()).collect()
    }

    /// Rejects parameters no run could satisfy.
    pub fn validate(params: &GenerationParams) -> Result<(), GenerationError> {
        if params.total_count == 0 || params.total_count > MAX_QUESTION_COUNT {
            return Err(GenerationError::InvalidRequest(format!(
                "question count must be between 1 and {}, got {}",
                MAX_QUESTION_COUNT, params.total_count
            )));
        }
        if params.source_text.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "source text is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Runs every batch in order and returns the finished quiz. Any failed
    /// batch aborts the run and nothing accumulated so far is returned.
    pub async fn generate<F>(
        &self,
        params: GenerationParams,
        mut on_progress: F,
    ) -> Result<Quiz, GenerationError>
    where
        F: FnMut(GenerationProgress) + Send,
    {
        Self::validate(&params)?;

        let language = params.language;
        let total_batches = self.batch_count(params.total_count);
        let mut questions: Vec<QuizQuestion> = Vec::with_capacity(params.total_count);
        let mut title = messages::default_quiz_title(language).to_string();

        on_progress(GenerationProgress::new(
            0,
            total_batches,
            messages::generation_start(language),
        ));

        for batch_index in 0..total_batches {
            let batch = batch_index + 1;
            let remaining = params.total_count.saturating_sub(questions.len());
            if remaining == 0 {
                log::info!(
                    "Generator already delivered {} questions, skipping batches {}..={}",
                    questions.len(),
                    batch,
                    total_batches
                );
                break;
            }
            let requested_count = remaining.min(self.batch_size);

            let first = batch_index * self.batch_size + 1;
            let last = (batch * self.batch_size).min(params.total_count);
            on_progress(GenerationProgress::new(
                batch,
                total_batches,
                messages::generating_range(language, first, last),
            ));

            log::info!(
                "Generating batch {} of {} ({} questions)",
                batch,
                total_batches,
                requested_count
            );
            let request = BatchRequest {
                source_text: params.source_text.clone(),
                requested_count,
                difficulty: params.difficulty,
                language,
                custom_instructions: params.custom_instructions.clone(),
                avoid_topics: self.avoid_topics(&questions),
            };

            let response = self.generator.generate_batch(request).await.map_err(|e| {
                log::error!("Batch {} of {} failed: {}", batch, total_batches, e);
                GenerationError::Batch {
                    batch,
                    total_batches,
                    source: Box::new(e),
                }
            })?;

            if batch_index == 0 {
                if let Some(generated) = response.title.filter(|t| !t.trim().is_empty()) {
                    title = generated;
                }
            }
            questions.extend(response.questions);

            on_progress(GenerationProgress::new(
                batch,
                total_batches,
                messages::batch_done(language, batch, total_batches),
            ));

            if batch < total_batches && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        if questions.is_empty() {
            return Err(GenerationError::NoQuestions);
        }

        if params.shuffle {
            questions = shuffle_questions(&questions, &mut rand::rng());
        }

        log::info!("Generated quiz '{}' with {} questions", title, questions.len());
        Ok(Quiz::new(title, questions))
    }
}
