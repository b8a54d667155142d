//! Types and functions for storing and loading items from the database.

use crate::infra::{database::Tx, error::ApiResult, pagination::PaginationParams};
use serde::{Deserialize, Serialize};
use tracing::{instrument, Instrument};
use utoipa::ToSchema;

/// A new item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewItem {
    /// The item's name.
    #[schema(example = "pen")]
    pub name: String,
    /// The item's description.
    #[schema(example = "blue pen")]
    pub description: String,
    /// The item's price in whole units.
    #[schema(example = 10)]
    pub price: i32,
}

/// An existing item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    /// The item's id.
    #[schema(example = 1)]
    pub id: i32,
    /// The item's name.
    #[schema(example = "pen")]
    pub name: String,
    /// The item's description.
    #[schema(example = "blue pen")]
    pub description: String,
    /// The item's price in whole units.
    #[schema(example = 10)]
    pub price: i32,
}

/// Anything that can create an item.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CreateItem {
    /// Stores a new item and returns it with its assigned id.
    async fn create_item(&mut self, new_item: NewItem) -> ApiResult<Item>;
}

/// Anything that can fetch an item.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FetchItem {
    /// Fetches an item, or [`None`] if there is no item with that id.
    async fn fetch_item(&mut self, id: i32) -> ApiResult<Option<Item>>;
}

/// Anything that can list items.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ListItems {
    /// Lists at most `params.limit()` items, ordered by id.
    async fn list_items(&mut self, params: &PaginationParams) -> ApiResult<Vec<Item>>;
}

/// An item repository.
#[derive(Debug)]
pub struct ItemRepository<E> {
    executor: E,
}

impl<E> ItemRepository<E> {
    /// Creates a new repository.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl<'c> CreateItem for ItemRepository<&'c mut Tx> {
    #[instrument(skip(self))]
    async fn create_item(&mut self, new_item: NewItem) -> ApiResult<Item> {
        tracing::info!("Creating item {:?}", new_item);
        let item = sqlx::query_as::<_, Item>(
            r#"
                INSERT INTO items (name, description, price)
                VALUES ($1, $2, $3)
                RETURNING id, name, description, price
            "#,
        )
        .bind(new_item.name)
        .bind(new_item.description)
        .bind(new_item.price)
        .fetch_one(&mut **self.executor)
        .await?;
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }
}

#[async_trait::async_trait]
impl<'c> FetchItem for ItemRepository<&'c mut Tx> {
    #[instrument(skip(self))]
    async fn fetch_item(&mut self, id: i32) -> ApiResult<Option<Item>> {
        tracing::info!("Reading item");
        let item = sqlx::query_as::<_, Item>(
            r#"
                SELECT id, name, description, price FROM items
                WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **self.executor)
        .instrument(tracing::info_span!("fetch_optional"))
        .await?;
        tracing::info!("Found item: {:?}", item);
        Ok(item)
    }
}

#[async_trait::async_trait]
impl<'c> ListItems for ItemRepository<&'c mut Tx> {
    #[instrument(skip(self))]
    async fn list_items(&mut self, params: &PaginationParams) -> ApiResult<Vec<Item>> {
        tracing::info!("Listing items");
        let items = sqlx::query_as::<_, Item>(
            r#"
                SELECT id, name, description, price FROM items
                ORDER BY id
                LIMIT $1
                OFFSET $2
            "#,
        )
        .bind(params.limit())
        .bind(params.skip())
        .fetch_all(&mut **self.executor)
        .instrument(tracing::info_span!("fetch_all"))
        .await?;
        tracing::info!("Listed {} items", items.len());
        Ok(items)
    }
}
