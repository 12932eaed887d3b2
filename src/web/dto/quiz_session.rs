use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    learning::{AnswerOutcome, SessionState},
    web::ActiveQuiz,
};

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct StartQuizBody {
    pub quiz_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SelectAnswerBody {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct QuestionView {
    pub question: String,
    pub options: BTreeMap<String, String>,
}

/// Everything the question screen draws.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct QuizSessionView {
    pub quiz_id: Uuid,
    pub title: String,
    pub state: SessionState,
    /// Zero-based position of `question`.
    pub question_index: Option<usize>,
    pub question_count: usize,
    pub question: Option<QuestionView>,
    pub score: i32,
    pub correct_count: usize,
    pub points_per_question: i32,
    pub feedback_hold_ms: u64,
}

impl QuizSessionView {
    pub fn new(active: &ActiveQuiz, feedback_hold_ms: u64) -> Self {
        let session = &active.session;
        let current = session.current_question();

        Self {
            quiz_id: active.quiz_id,
            title: active.title.clone(),
            state: session.state().clone(),
            question_index: current.map(|(i, _)| i),
            question_count: session.question_count(),
            question: current.map(|(_, q)| QuestionView {
                question: q.question.clone(),
                options: q.options.clone(),
            }),
            score: session.score(),
            correct_count: session.correct_count(),
            points_per_question: session.points_per_question(),
            feedback_hold_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    pub outcome: AnswerOutcome,
    pub score: i32,
    pub feedback_hold_ms: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct QuizResult {
    pub quiz_id: Uuid,
    pub score: i32,
    pub correct_count: usize,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AdvanceResponse {
    pub session: QuizSessionView,
    /// Set once the last question is done and the score is stored.
    pub result: Option<QuizResult>,
}
