//! In-flight quizzes, at most one per user. Nothing here survives a restart.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::learning::{QuizSession, session::SessionResult};

/// A running quiz together with where its result will be filed.
#[derive(Debug, Clone)]
pub struct ActiveQuiz {
    pub quiz_id: Uuid,
    pub title: String,
    pub subject_id: Uuid,
    pub lesson_id: Uuid,
    pub session: QuizSession,
}

#[derive(Debug, Clone, Default)]
pub struct QuizSessions {
    inner: Arc<Mutex<HashMap<Uuid, ActiveQuiz>>>,
}

impl QuizSessions {
    /// Install `quiz` for `user_id`, dropping whatever was running before.
    pub async fn start(&self, user_id: Uuid, quiz: ActiveQuiz) -> ActiveQuiz {
        let mut sessions = self.inner.lock().await;
        if let Some(previous) = sessions.insert(user_id, quiz.clone()) {
            tracing::debug!(%user_id, quiz_id = %previous.quiz_id, "replaced running quiz");
        }
        quiz
    }

    pub async fn get(&self, user_id: Uuid) -> Option<ActiveQuiz> {
        self.inner.lock().await.get(&user_id).cloned()
    }

    /// Run `f` against the user's quiz under the lock. `None` when nothing runs.
    pub async fn update<F, R>(&self, user_id: Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut ActiveQuiz) -> R,
    {
        let mut sessions = self.inner.lock().await;
        sessions.get_mut(&user_id).map(f)
    }

    /// Drop the user's quiz if it may be left right now. The check and the
    /// removal happen under one lock.
    pub async fn cancel(&self, user_id: Uuid) -> Option<SessionResult<ActiveQuiz>> {
        let mut sessions = self.inner.lock().await;
        if let Err(e) = sessions.get(&user_id)?.session.ensure_cancellable() {
            return Some(Err(e));
        }
        sessions.remove(&user_id).map(Ok)
    }

    /// Drop the user's quiz only if it is the finished run of `quiz_id`.
    pub async fn remove_finished(&self, user_id: Uuid, quiz_id: Uuid) -> bool {
        let mut sessions = self.inner.lock().await;
        let matches = sessions
            .get(&user_id)
            .is_some_and(|a| a.quiz_id == quiz_id && a.session.is_finished());
        if matches {
            sessions.remove(&user_id);
        }
        matches
    }
}
