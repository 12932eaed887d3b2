use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::{
    learning::leaderboard::{display_name, total_points},
    model::{ResourceTyped, entity::User},
    web::{
        AppState, RequestContext, WebError, WebResult, dto::progress::ProgressSummary,
        error::ErrorResponse, middlewares, snapshot::Snapshot,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(progress_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/progress/",
    description = "Get current user's points and lesson progress",
    responses(
        (status = 200, description = "Progress found", body = ProgressSummary),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = User::find_by_id(state.mm(), user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(User::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(User::get_resource_type()))?;
    let snapshot = Snapshot::load(&state, user.user_id(), None).await?;

    let res = ProgressSummary {
        name: display_name(&found),
        points: total_points(&snapshot.progress),
        completed_lessons: snapshot.progress.iter().filter(|p| p.is_completed()).count(),
        total_lessons: snapshot.total_lessons(),
    };

    Ok((StatusCode::OK, Json(res)))
}
