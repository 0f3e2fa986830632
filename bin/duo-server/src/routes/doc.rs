use crate::routes::{health, messages, page};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "duo-server",
    description = "Chat message store and database info page",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(page::InfoApi::openapi());
    root.merge(messages::MessagesApi::openapi());
    root
}
