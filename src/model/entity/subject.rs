use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, ResourceTyped, error::DatabaseResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Subject {
    id: Uuid,
    name: String,
    order_num: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubjectCreate {
    pub name: String,
    pub order_num: i32,
}

impl ResourceTyped for Subject {
    fn get_resource_type() -> ResourceType {
        ResourceType::Subject
    }
}

impl Subject {
    pub fn new(id: Uuid, name: String, order_num: i32) -> Self {
        Self {
            id,
            name,
            order_num,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order_num(&self) -> i32 {
        self.order_num
    }

    pub async fn create(mm: &ModelManager, data: SubjectCreate) -> DatabaseResult<Self> {
        mm.store().insert_subject(data).await
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        mm.store().find_subject(id).await
    }

    /// All subjects in display order.
    pub async fn list(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        mm.store().list_subjects().await
    }
}
