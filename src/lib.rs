//! A REST service for creating, fetching and listing catalog items,
//! backed by Postgres.

pub mod api;
pub mod app;
pub mod infra;
