//! `bookstore-core`: storefront domain building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog and
//! cart engines (no IO, no HTTP, no storage).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::Sku;
pub use money::Price;
pub use value_object::ValueObject;
