use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        extraction::ExtractionService, model_service::ModelService, QuizBatchGenerator,
        QuizGenerationService, SessionService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let generator = Arc::new(ModelService::new(&config));
        Self::with_generator(config, generator)
    }

    /// Builds the state around any question generator.
    pub fn with_generator(config: Config, generator: Arc<dyn QuizBatchGenerator>) -> Self {
        let generation = Arc::new(QuizGenerationService::from_config(generator, &config));
        let session_service = Arc::new(
            SessionService::new(generation, ExtractionService::default())
                .with_default_language(config.default_language),
        );

        Self {
            session_service,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::MockQuizBatchGenerator;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_sessions_use_configured_language() {
        let state =
            AppState::with_generator(Config::test_config(), Arc::new(MockQuizBatchGenerator::new()));

        let view = state.session_service.create_session(None).await;
        assert_eq!(view.language, state.config.default_language);
    }
}
