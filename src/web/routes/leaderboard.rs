use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::{
    learning::{LeaderboardEntry, leaderboard},
    model::{
        ResourceTyped,
        entity::{User, UserProgress},
    },
    web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(leaderboard_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/",
    description = "Users ranked by the sum of their quiz scores",
    responses(
        (status = 200, description = "Ranking, best first", body = Vec<LeaderboardEntry>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "leaderboard",
    security(
        ("cookie" = [])
    )
)]
async fn leaderboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let (users, progress) = tokio::try_join!(User::list(state.mm()), UserProgress::all(state.mm()))
        .map_err(|e| WebError::resource_fetch_error(UserProgress::get_resource_type(), e))?;

    let board = leaderboard::rank(&users, &progress, Some(user.user_id()));
    Ok((StatusCode::OK, Json(board)))
}
