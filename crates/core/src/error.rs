//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the storefront rules
/// (validation, malformed prices, unknown books). Storage and network
/// failures are handled at the engine boundary and never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. a zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A price string could not be parsed as a non-negative decimal.
    #[error("invalid price for {sku}: {raw:?}")]
    InvalidPrice { sku: String, raw: String },

    /// A SKU was empty or otherwise unusable.
    #[error("invalid sku: {0}")]
    InvalidSku(String),

    /// A requested book was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An amount exceeded the representable decimal range.
    #[error("amount overflow: {0}")]
    Overflow(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_price(sku: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidPrice {
            sku: sku.into(),
            raw: raw.into(),
        }
    }

    pub fn invalid_sku(msg: impl Into<String>) -> Self {
        Self::InvalidSku(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn overflow(what: impl Into<String>) -> Self {
        Self::Overflow(what.into())
    }
}
