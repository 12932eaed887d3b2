use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::user::user_signout_handler,
        crate::web::routes::user::user_me_handler,
        crate::web::routes::user::user_rename_handler,
        crate::web::routes::subjects::subjects_list_handler,
        crate::web::routes::subjects::subject_lessons_handler,
        crate::web::routes::subjects::subject_quizzes_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_mark_done_handler,
        crate::web::routes::quiz_session::quiz_start_handler,
        crate::web::routes::quiz_session::quiz_get_handler,
        crate::web::routes::quiz_session::quiz_select_handler,
        crate::web::routes::quiz_session::quiz_submit_handler,
        crate::web::routes::quiz_session::quiz_advance_handler,
        crate::web::routes::quiz_session::quiz_save_handler,
        crate::web::routes::quiz_session::quiz_exit_handler,
        crate::web::routes::leaderboard::leaderboard_handler,
        crate::web::routes::progress::progress_get_handler,
        crate::web::routes::client::client_settings_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
