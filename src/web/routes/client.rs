use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};

use crate::{config::ClientSettings, web::AppState};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/settings", get(client_settings_handler))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/client/settings",
    description = "Presentation preferences for clients (theme, sound, animations)",
    responses(
        (status = 200, description = "Client settings", body = ClientSettings),
    ),
    tag = "client"
)]
async fn client_settings_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.config().client().clone()))
}
