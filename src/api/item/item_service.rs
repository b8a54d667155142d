//! A service for interacting with items.

use super::item_repository::{CreateItem, FetchItem, Item, ListItems, NewItem};
use crate::infra::{
    error::{ApiResult, ClientError},
    pagination::PaginationParams,
};
use tracing::instrument;

/// Creates a new item.
#[instrument(skip(repository))]
pub async fn create_item<R: CreateItem>(repository: &mut R, new_item: NewItem) -> ApiResult<Item> {
    repository.create_item(new_item).await
}

/// Reads an item, failing with [`ClientError::NotFound`] if it does not exist.
#[instrument(skip(repository))]
pub async fn read_item<R: FetchItem>(repository: &mut R, id: i32) -> ApiResult<Item> {
    let item = repository.fetch_item(id).await?;
    match item {
        Some(item) => Ok(item),
        None => {
            tracing::warn!("Item not found");
            Err(ClientError::NotFound("item").into())
        }
    }
}

/// Lists a page of items.
#[instrument(skip(repository))]
pub async fn list_items<R: ListItems>(
    repository: &mut R,
    params: &PaginationParams,
) -> ApiResult<Vec<Item>> {
    repository.list_items(params).await
}
