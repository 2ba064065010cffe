//! Storefront client: wires the catalog and cart engines to the backend API,
//! a local SQLite store, and the `bookstore` command line.

pub mod api;
pub mod cli;
pub mod config;
pub mod local_store;
pub mod storefront;

pub use api::HttpCatalogSource;
pub use config::{ConfigError, StorefrontConfig};
pub use local_store::SqliteKeyValueStore;
pub use storefront::{Storefront, StorefrontError};
