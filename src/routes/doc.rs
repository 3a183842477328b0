use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "skiff-server",
    description = "skiff-server API",
    version = "0.1.0",
    contact(name = "skiff", url = "https://github.com/skiff-sh/skiff-server")
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(super::api_docs());
    root
}
