//! Catalog fetch collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::book::Book;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Source of the full book list (normally the backend `items/` endpoint).
///
/// A single no-argument fetch; retries and timeouts are the implementation's
/// or the caller's business, never the engine's.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_books(&self) -> Result<Vec<Book>, FetchError>;
}

#[async_trait]
impl<S> CatalogSource for Arc<S>
where
    S: CatalogSource + ?Sized,
{
    async fn fetch_books(&self) -> Result<Vec<Book>, FetchError> {
        (**self).fetch_books().await
    }
}

/// Fixed in-memory catalog for tests/dev.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    result: Result<Vec<Book>, FetchError>,
}

impl StaticCatalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self { result: Ok(books) }
    }

    /// A source whose every fetch fails with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_books(&self) -> Result<Vec<Book>, FetchError> {
        self.result.clone()
    }
}
