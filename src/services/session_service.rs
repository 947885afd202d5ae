use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{mpsc, RwLock},
    task::JoinHandle,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::messages,
    errors::{AppError, AppResult},
    models::{
        domain::{Language, QuizSession, SessionError},
        dto::{
            request::{GenerateQuizRequest, ImportQuizRequest},
            response::{ImportResponse, SessionView},
        },
    },
    services::{
        extraction::ExtractionService,
        import_service::{export_file_name, export_snapshot, merge_snapshots},
        quiz_generation_service::{GenerationParams, QuizGenerationService},
        source_text::{has_enough_content, parse_keywords, prepare_source_text, CleaningOptions},
    },
};

type SessionStore = Arc<RwLock<HashMap<Uuid, QuizSession>>>;

/// A generation attempt running in the background.
pub struct GenerationHandle {
    pub attempt_id: Uuid,
    pub task: JoinHandle<()>,
}

/// An exported quiz ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedQuiz {
    pub file_name: String,
    pub body: String,
}

/// Owns every live quiz session. Each session is only mutated under the
/// store's write lock.
#[derive(Clone)]
pub struct SessionService {
    sessions: SessionStore,
    generation: Arc<QuizGenerationService>,
    extraction: ExtractionService,
    default_language: Language,
}

impl SessionService {
    pub fn new(generation: Arc<QuizGenerationService>, extraction: ExtractionService) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            generation,
            extraction,
            default_language: Language::default(),
        }
    }

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    fn not_found(id: &Uuid) -> AppError {
        AppError::NotFound(format!("Session with id '{}' not found", id))
    }

    pub async fn create_session(&self, language: Option<Language>) -> SessionView {
        let session = QuizSession::new(language.unwrap_or(self.default_language));
        let view = SessionView::from(&session);
        log::info!("Created session {} ({:?})", session.id, session.language);
        self.sessions.write().await.insert(session.id, session);
        view
    }

    pub async fn get_view(&self, id: &Uuid) -> AppResult<SessionView> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(SessionView::from)
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn delete_session(&self, id: &Uuid) -> AppResult<()> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                log::info!("Deleted session {}", id);
                Ok(())
            }
            None => Err(Self::not_found(id)),
        }
    }

    /// Drops sessions untouched for longer than `ttl`. Returns how many
    /// were removed.
    pub async fn evict_expired(&self, ttl: chrono::Duration) -> usize {
        evict_idle_sessions(&self.sessions, ttl).await
    }

    /// Sweeps expired sessions every `every` until the runtime shuts down.
    pub fn spawn_cleanup(&self, ttl: chrono::Duration, every: Duration) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                evict_idle_sessions(&sessions, ttl).await;
            }
        })
    }

    /// Runs `action` against the session under the write lock and returns
    /// its value with the resulting view.
    async fn mutate<T, F>(&self, id: &Uuid, action: F) -> AppResult<(T, SessionView)>
    where
        F: FnOnce(&mut QuizSession) -> Result<T, SessionError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        let value = action(session)?;
        Ok((value, SessionView::from(&*session)))
    }

    async fn language_of(&self, id: &Uuid) -> AppResult<Language> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|s| s.language)
            .ok_or_else(|| Self::not_found(id))
    }

    /// Moves the session to Loading and generates the quiz in a background
    /// task. The task reports back with its attempt id, so a restart or a
    /// newer attempt makes its outcome a no-op.
    pub async fn start_generation(
        &self,
        id: Uuid,
        request: GenerateQuizRequest,
    ) -> AppResult<GenerationHandle> {
        request.validate()?;
        let language = self.language_of(&id).await?;

        let documents = self.extraction.extract_all(&request.documents).await;
        let source_text = prepare_source_text(
            &documents,
            &request.text,
            &CleaningOptions {
                fix_spacing: request.fix_spacing,
                keywords_to_remove: parse_keywords(&request.keywords_to_remove),
            },
        );
        if !has_enough_content(&source_text) {
            return Err(AppError::ValidationError(
                messages::not_enough_content(language).to_string(),
            ));
        }

        let params = GenerationParams {
            source_text,
            total_count: request.count,
            difficulty: request.difficulty,
            language,
            custom_instructions: request.custom_prompt,
            shuffle: request.shuffle,
        };
        QuizGenerationService::validate(&params)?;

        let (attempt_id, _) = self.mutate(&id, |s| s.begin_generation()).await?;
        log::info!(
            "Session {} starting generation attempt {} ({} questions)",
            id,
            attempt_id,
            params.total_count
        );

        let task = tokio::spawn(run_generation(
            self.sessions.clone(),
            self.generation.clone(),
            id,
            attempt_id,
            params,
        ));

        Ok(GenerationHandle { attempt_id, task })
    }

    pub async fn import_snapshots(
        &self,
        id: Uuid,
        request: ImportQuizRequest,
    ) -> AppResult<ImportResponse> {
        request.validate()?;
        let language = self.language_of(&id).await?;

        let outcome = merge_snapshots(&request.snapshots, language, request.shuffle)?;
        let skipped = outcome.skipped;
        let (_, session) = self.mutate(&id, |s| s.start_quiz(outcome.quiz)).await?;

        Ok(ImportResponse { session, skipped })
    }

    pub async fn select_option(&self, id: Uuid, option_index: usize) -> AppResult<SessionView> {
        let (_, view) = self.mutate(&id, |s| s.select_option(option_index)).await?;
        Ok(view)
    }

    pub async fn confirm(&self, id: Uuid) -> AppResult<SessionView> {
        let (_, view) = self.mutate(&id, |s| s.confirm()).await?;
        Ok(view)
    }

    pub async fn advance(&self, id: Uuid) -> AppResult<SessionView> {
        let (_, view) = self.mutate(&id, |s| s.advance()).await?;
        Ok(view)
    }

    pub async fn retry_incorrect(&self, id: Uuid) -> AppResult<SessionView> {
        let (retry, view) = self.mutate(&id, |s| s.retry_incorrect()).await?;
        log::info!("Session {} retrying {} questions", id, retry.len());
        Ok(view)
    }

    pub async fn restart(&self, id: Uuid) -> AppResult<SessionView> {
        let (_, view) = self
            .mutate(&id, |s| {
                s.restart();
                Ok(())
            })
            .await?;
        Ok(view)
    }

    /// Serializes the quiz being played or just finished.
    pub async fn export(&self, id: &Uuid) -> AppResult<ExportedQuiz> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(id).ok_or_else(|| Self::not_found(id))?;
        let quiz = session.current_quiz().ok_or_else(|| {
            AppError::InvalidTransition(format!(
                "cannot export while the session is {}",
                session.phase_kind()
            ))
        })?;

        Ok(ExportedQuiz {
            file_name: export_file_name(&quiz.title),
            body: export_snapshot(quiz)?,
        })
    }
}

async fn evict_idle_sessions(sessions: &SessionStore, ttl: chrono::Duration) -> usize {
    let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
        return 0;
    };
    let mut sessions = sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, session| session.updated_at > cutoff);
    let evicted = before - sessions.len();
    if evicted > 0 {
        log::info!("Evicted {} idle sessions, {} remain", evicted, sessions.len());
    } else {
        log::debug!("Session sweep found nothing to evict");
    }
    evicted
}

async fn run_generation(
    sessions: SessionStore,
    generation: Arc<QuizGenerationService>,
    id: Uuid,
    attempt_id: Uuid,
    params: GenerationParams,
) {
    let language = params.language;
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

    let forwarder = {
        let sessions = sessions.clone();
        tokio::spawn(async move {
            while let Some(progress) = progress_rx.recv().await {
                if let Some(session) = sessions.write().await.get_mut(&id) {
                    session.update_progress(attempt_id, progress);
                }
            }
        })
    };

    let outcome = generation
        .generate(params, move |progress| {
            let _ = progress_tx.send(progress);
        })
        .await;

    // The sender went away with the callback, so the forwarder drains and exits.
    if let Err(e) = forwarder.await {
        log::warn!("Progress forwarder for session {} ended abnormally: {}", id, e);
    }

    let outcome = outcome.map_err(|e| {
        log::error!("Generation attempt {} for session {} failed: {}", attempt_id, id, e);
        messages::generation_failed(language).to_string()
    });

    let mut sessions = sessions.write().await;
    match sessions.get_mut(&id) {
        Some(session) => {
            if !session.complete_generation(attempt_id, outcome) {
                log::warn!(
                    "Discarding outcome of stale generation attempt {} for session {}",
                    attempt_id,
                    id
                );
            }
        }
        None => log::warn!("Session {} was deleted before generation finished", id),
    }
}
