use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, ResourceTyped, error::DatabaseResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    subject_id: Uuid,
    order_num: i32,
    title: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub subject_id: Uuid,
    pub order_num: i32,
    pub title: String,
    pub content: String,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> ResourceType {
        ResourceType::Lesson
    }
}

impl Lesson {
    pub fn new(id: Uuid, subject_id: Uuid, order_num: i32, title: String, content: String) -> Self {
        Self {
            id,
            subject_id,
            order_num,
            title,
            content,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    pub fn order_num(&self) -> i32 {
        self.order_num
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub async fn create(mm: &ModelManager, data: LessonCreate) -> DatabaseResult<Self> {
        mm.store().insert_lesson(data).await
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        mm.store().find_lesson(id).await
    }

    pub async fn all_by_subject(mm: &ModelManager, subject_id: Uuid) -> DatabaseResult<Vec<Self>> {
        mm.store().list_lessons(subject_id).await
    }

    pub async fn counts_by_subject(mm: &ModelManager) -> DatabaseResult<HashMap<Uuid, usize>> {
        mm.store().lesson_counts().await
    }
}
