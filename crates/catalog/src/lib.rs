//! Catalog domain module.
//!
//! Holds the full book list fetched from the backend and answers the
//! storefront's browse queries: single-select filters, free-text search with
//! name-first ranking, pagination, autocomplete suggestions and related books.
//! Everything here is deterministic in-memory logic; the only IO is the
//! injected [`CatalogSource`].

pub mod book;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod source;

pub use book::Book;
pub use filter::{FilterDimension, FilterSet};
pub use pagination::{DEFAULT_PAGE_SIZE, PageCursor};
pub use query::{CatalogQuery, LoadState, RELATED_LIMIT};
pub use source::{CatalogSource, FetchError, StaticCatalog};
