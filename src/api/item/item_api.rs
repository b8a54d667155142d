//! The item API implementation.

use super::{
    item_repository::{Item, ItemRepository, NewItem},
    item_service,
};
use crate::infra::{
    database::DbPool,
    error::{ApiResult, ClientError, ErrorBody},
    extract::{Json, Query},
    pagination::PaginationParams,
    state::AppState,
    validation::Valid,
};
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use tracing::instrument;

/// The item API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .typed_post(create_item)
        .typed_get(get_item)
        .typed_get(list_items)
}

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/items", rejection(ClientError))]
pub struct Items;

#[derive(Debug, Deserialize, TypedPath)]
#[typed_path("/items/:id", rejection(ClientError))]
pub struct ItemsId(i32);

/// Creates a new item.
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = NewItem,
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 422, description = "Unprocessable Entity", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(item_name = %new_item.name))]
pub async fn create_item(
    Items: Items,
    db: State<DbPool>,
    Json(new_item): Json<NewItem>,
) -> ApiResult<Json<Item>> {
    let mut tx = db.begin().await?;
    let item = item_service::create_item(&mut ItemRepository::new(&mut tx), new_item).await?;
    tx.commit().await?;
    Ok(Json(item))
}

/// Gets an item.
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(
        ("id" = i32, Path, description = "The item's id"),
    ),
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id = id))]
pub async fn get_item(ItemsId(id): ItemsId, db: State<DbPool>) -> ApiResult<Json<Item>> {
    let mut tx = db.begin().await?;
    let item = item_service::read_item(&mut ItemRepository::new(&mut tx), id).await?;
    tx.commit().await?;
    Ok(Json(item))
}

/// Lists items, ordered by id.
#[utoipa::path(
    get,
    path = "/api/items",
    params(PaginationParams),
    responses(
        (status = 200, description = "Success", body = [Item]),
        (status = 422, description = "Negative skip or limit", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(skip = params.skip(), limit = params.limit()))]
pub async fn list_items(
    Items: Items,
    db: State<DbPool>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Item>>> {
    let params = Valid::new(params)?;
    let mut tx = db.begin().await?;
    let items =
        item_service::list_items(&mut ItemRepository::new(&mut tx), params.inner()).await?;
    tx.commit().await?;
    Ok(Json(items))
}
