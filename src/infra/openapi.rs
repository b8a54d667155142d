//! OpenAPI configuration.

use crate::api::{
    info::info_api,
    item::{item_api, item_repository},
};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    info(title = "catalog-api"),
    paths(
        info_api::info,
        item_api::create_item,
        item_api::get_item,
        item_api::list_items,
    ),
    components(
        schemas(
            info_api::AppInfo,
            item_repository::NewItem,
            item_repository::Item,
            crate::infra::error::ErrorBody
        )
    )
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::PathItemType;

    #[test]
    fn documents_every_item_route() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/items"));
        assert!(doc.paths.paths.contains_key("/api/items/{id}"));
        assert!(doc.paths.paths.contains_key("/api/info"));
    }

    #[test]
    fn create_answers_ok_with_the_item() {
        let doc = ApiDoc::openapi();
        let create = &doc.paths.paths["/api/items"].operations[&PathItemType::Post];
        assert!(create.responses.responses.contains_key("200"));
        assert!(!create.responses.responses.contains_key("201"));
    }
}
