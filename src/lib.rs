//! Task tracker: an embedded-storage task API plus the matching client.
//!
//! Server side: `store` (redb persistence), `model`/`filter`/`stats`/
//! `validate` (task rules), `wire` (JSON contract), `api` (axum handlers).
//! Client side: `client` (HTTP adapter) and `client::store` (UI-facing
//! state).

pub mod api;
pub mod client;
pub mod filter;
pub mod model;
pub mod settings;
pub mod stats;
pub mod store;
pub mod validate;
pub mod wire;
