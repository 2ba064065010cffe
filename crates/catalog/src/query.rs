//! Catalog query engine: filters, search ranking, pagination, suggestions.

use std::collections::HashSet;

use bookstore_core::{DomainResult, Entity, Sku};

use crate::book::Book;
use crate::filter::{FilterDimension, FilterSet};
use crate::pagination::PageCursor;
use crate::source::CatalogSource;

/// How many related books are offered next to a book.
pub const RELATED_LIMIT: usize = 4;

/// Lifecycle of the catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet (or the catalog was cleared).
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The catalog holds the last successful fetch.
    Ready,
    /// The last fetch failed; the catalog is empty until the next refresh.
    Failed(String),
}

/// In-memory catalog plus the active browse state.
///
/// The filtered result is recomputed eagerly on every mutation, so all reads
/// are cheap and reflect the latest filters, search term and page.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    books: Vec<Book>,
    filters: FilterSet,
    search_term: String,
    cursor: PageCursor,
    /// Indices into `books`, ranked.
    filtered: Vec<usize>,
    state: LoadState,
    suggestions_dismissed: bool,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::with_cursor(PageCursor::default())
    }

    pub fn with_page_size(page_size: usize) -> DomainResult<Self> {
        Ok(Self::with_cursor(PageCursor::new(page_size)?))
    }

    fn with_cursor(cursor: PageCursor) -> Self {
        Self {
            books: Vec::new(),
            filters: FilterSet::new(),
            search_term: String::new(),
            cursor,
            filtered: Vec::new(),
            state: LoadState::Idle,
            suggestions_dismissed: false,
        }
    }

    /// Fetch the full catalog from `source`.
    ///
    /// On failure the catalog is emptied and the state becomes
    /// [`LoadState::Failed`]; nothing is retried.
    pub async fn refresh<S>(&mut self, source: &S)
    where
        S: CatalogSource + ?Sized,
    {
        self.state = LoadState::Loading;
        match source.fetch_books().await {
            Ok(books) => self.load_books(books),
            Err(err) => {
                tracing::warn!(error = %err, "catalog fetch failed");
                self.books.clear();
                self.state = LoadState::Failed(err.to_string());
                self.recompute();
            }
        }
    }

    /// Replace the held catalog. Duplicate SKUs keep their first occurrence.
    pub fn load_books(&mut self, books: Vec<Book>) {
        let total = books.len();
        let mut seen = HashSet::with_capacity(total);
        self.books = books
            .into_iter()
            .filter(|book| {
                let fresh = seen.insert(book.id().clone());
                if !fresh {
                    tracing::warn!(sku = %book.sku, "duplicate sku in catalog; keeping first");
                }
                fresh
            })
            .collect();

        tracing::info!(books = self.books.len(), received = total, "catalog loaded");
        self.state = LoadState::Ready;
        self.recompute();
    }

    /// Drop the held catalog.
    pub fn clear_items(&mut self) {
        self.books.clear();
        self.state = LoadState::Idle;
        self.recompute();
    }

    /// Select `value` for `dimension` (empty clears it) and go back to page 1.
    pub fn set_filter(&mut self, dimension: FilterDimension, value: impl Into<String>) {
        self.filters.set(dimension, value);
        self.cursor.reset();
        self.recompute();
    }

    pub fn remove_filter(&mut self, dimension: FilterDimension) {
        self.set_filter(dimension, "");
    }

    /// Reset every dimension and the search term; go back to page 1.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search_term.clear();
        self.suggestions_dismissed = false;
        self.cursor.reset();
        self.recompute();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.suggestions_dismissed = false;
        self.cursor.reset();
        self.recompute();
    }

    /// Adopt a suggestion as the search term and hide suggestions until the
    /// term changes again.
    pub fn select_suggestion(&mut self, suggestion: impl Into<String>) {
        self.set_search_term(suggestion);
        self.suggestions_dismissed = true;
    }

    /// Move to `page`, clamped to `[1, total_pages()]`.
    pub fn set_page(&mut self, page: usize) {
        self.cursor.set_page(page, self.filtered.len());
    }

    /// Books on the current page, in ranked order.
    pub fn visible_items(&self) -> Vec<&Book> {
        self.filtered[self.cursor.range(self.filtered.len())]
            .iter()
            .map(|&i| &self.books[i])
            .collect()
    }

    /// Every book passing the current filters and search, in ranked order.
    pub fn filtered_items(&self) -> impl Iterator<Item = &Book> {
        self.filtered.iter().map(|&i| &self.books[i])
    }

    /// Distinct names from the filtered set containing the search term.
    pub fn suggestions(&self) -> Vec<&str> {
        if self.search_term.is_empty() || self.suggestions_dismissed {
            return Vec::new();
        }
        let needle = self.search_term.to_lowercase();
        let mut seen = HashSet::new();
        self.filtered_items()
            .filter(|book| book.name_contains(&needle))
            .map(|book| book.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Up to [`RELATED_LIMIT`] books from the filtered set sharing `book`'s
    /// category, curriculum and grade, excluding the book itself (by SKU or
    /// by name). Catalog/relevance order, no further sorting.
    pub fn related_books(&self, book: &Book) -> Vec<&Book> {
        self.filtered_items()
            .filter(|other| {
                other.sku != book.sku
                    && other.name != book.name
                    && other.category == book.category
                    && other.curriculum == book.curriculum
                    && other.grade == book.grade
            })
            .take(RELATED_LIMIT)
            .collect()
    }

    pub fn book(&self, sku: &Sku) -> Option<&Book> {
        self.books.iter().find(|b| b.id() == sku)
    }

    pub fn all_books(&self) -> &[Book] {
        &self.books
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.cursor.page()
    }

    pub fn page_size(&self) -> usize {
        self.cursor.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.cursor.total_pages(self.filtered.len())
    }

    /// Number of books passing the current filters and search.
    pub fn total_items(&self) -> usize {
        self.filtered.len()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    fn recompute(&mut self) {
        let needle = self.search_term.to_lowercase();
        let mut name_hits = Vec::new();
        let mut description_hits = Vec::new();

        for (i, book) in self.books.iter().enumerate() {
            if !self.filters.matches(book) {
                continue;
            }
            if needle.is_empty() || book.name_contains(&needle) {
                name_hits.push(i);
            } else if book.description_contains(&needle) {
                description_hits.push(i);
            }
        }

        // Stable partition: name matches first, ties keep catalog order.
        name_hits.extend(description_hits);
        self.filtered = name_hits;
        self.cursor.clamp(self.filtered.len());

        tracing::debug!(
            matches = self.filtered.len(),
            page = self.cursor.page(),
            search = %self.search_term,
            "catalog recomputed"
        );
    }
}
