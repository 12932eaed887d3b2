//! Who is calling. Filled in by the session cookie middleware; handlers read
//! it back through the extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::web::{WebResult, error::WebError};

/// Learner resolved from a valid session cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: Uuid,
    name: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid, name: String) -> Self {
        Self { user_id, name }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Display name carried by the session cookie, written back to the user
    /// row with every quiz result.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    learner: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(learner: Option<AuthenticatedUser>) -> Self {
        Self { learner }
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.learner.as_ref()
    }

    /// The signed-in learner, or a 401.
    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user().ok_or_else(WebError::auth_required)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
