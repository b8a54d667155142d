//! Items: creation, lookup by id, and paginated listing.

pub mod item_api;
pub mod item_repository;
pub mod item_service;
