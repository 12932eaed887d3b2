use crate::{Config, model::ModelManager, web::QuizSessions};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    sessions: QuizSessions,
    config: &'static Config,
}

impl AppState {
    pub fn new(mm: ModelManager, config: &'static Config) -> Self {
        Self {
            mm,
            sessions: QuizSessions::default(),
            config,
        }
    }

    pub fn mm(&self) -> &ModelManager {
        &self.mm
    }

    pub fn sessions(&self) -> &QuizSessions {
        &self.sessions
    }

    pub fn config(&self) -> &'static Config {
        self.config
    }
}
