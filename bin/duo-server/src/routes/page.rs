//! Info page: HTML at `/`, the same values as JSON at `/api/info`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use duo_store::PetStore;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::info::{self, InfoPage, PetView};
use crate::state::AppState;
use crate::views;

#[derive(OpenApi)]
#[openapi(paths(get_info), components(schemas(InfoPage, PetView)))]
pub struct InfoApi;

/// Page route, mounted at the root.
pub fn page_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

/// JSON route, nested under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new().route("/info", get(get_info))
}

async fn load(state: &AppState) -> Result<InfoPage, ServerError> {
    let pets = state.store.find_all_pets().await?;
    Ok(info::assemble(&state.config, pets))
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    let page = load(&state).await?;
    Ok(Html(state.views.render(views::INDEX, &page)?))
}

#[utoipa::path(
    get,
    path = "/api/info",
    tag = "info",
    responses(
        (status = 200, description = "Deployment and database info", body = InfoPage),
        (status = 500, description = "Store error"),
    )
)]
pub async fn get_info(State(state): State<Arc<AppState>>) -> Result<Json<InfoPage>, ServerError> {
    Ok(Json(load(&state).await?))
}
