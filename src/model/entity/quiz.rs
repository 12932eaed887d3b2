use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, ResourceTyped, error::DatabaseResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizQuestion {
    pub question: String,
    /// Option key (e.g. "A") to option text, in key order.
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
}

/// Quizzes come in two shapes: a list of questions, or one question stored
/// inline on the quiz itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum QuizForm {
    Multi { questions: Vec<QuizQuestion> },
    Single(QuizQuestion),
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    lesson_id: Uuid,
    title: String,
    #[serde(flatten)]
    form: QuizForm,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub lesson_id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub form: QuizForm,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> ResourceType {
        ResourceType::Quiz
    }
}

impl QuizForm {
    pub fn questions(&self) -> Vec<QuizQuestion> {
        match self {
            QuizForm::Multi { questions } => questions.clone(),
            QuizForm::Single(question) => vec![question.clone()],
        }
    }
}

impl Quiz {
    pub fn new(id: Uuid, lesson_id: Uuid, title: String, form: QuizForm) -> Self {
        Self {
            id,
            lesson_id,
            title,
            form,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lesson_id(&self) -> Uuid {
        self.lesson_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn form(&self) -> &QuizForm {
        &self.form
    }

    pub fn questions(&self) -> Vec<QuizQuestion> {
        self.form.questions()
    }

    pub async fn create(mm: &ModelManager, data: QuizCreate) -> DatabaseResult<Self> {
        mm.store().insert_quiz(data).await
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        mm.store().find_quiz(id).await
    }

    pub async fn first_for_lesson(
        mm: &ModelManager,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        mm.store().first_quiz_for_lesson(lesson_id).await
    }

    pub async fn all_for_lessons(mm: &ModelManager, lesson_ids: &[Uuid]) -> DatabaseResult<Vec<Self>> {
        mm.store().list_quizzes(lesson_ids).await
    }
}
