use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, ResourceTyped, error::DatabaseResult};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct User {
    id: Uuid,
    name: String,
    email: String,
    #[serde(skip)]
    password_hash: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl ResourceTyped for User {
    fn get_resource_type() -> ResourceType {
        ResourceType::User
    }
}

impl User {
    pub fn new(id: Uuid, name: String, email: String, password_hash: String) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn hash(&self) -> &str {
        &self.password_hash
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub async fn create(mm: &ModelManager, data: UserCreate) -> DatabaseResult<Self> {
        mm.store().insert_user(data).await
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        mm.store().find_user(id).await
    }

    pub async fn find_by_email(mm: &ModelManager, email: &str) -> DatabaseResult<Option<Self>> {
        mm.store().find_user_by_email(email).await
    }

    pub async fn rename(mut self, mm: &ModelManager, name: String) -> DatabaseResult<Self> {
        mm.store().update_user_name(self.id, &name).await?;
        self.name = name;
        Ok(self)
    }

    /// Every user, ordered by id.
    pub async fn list(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        mm.store().list_users().await
    }
}
