//! Catalog book record as served by the backend.

use serde::{Deserialize, Deserializer, Serialize};

use bookstore_core::{DomainError, DomainResult, Entity, Price, Sku};

use crate::filter::FilterDimension;

/// A catalog book as served by the backend `items/` endpoint.
///
/// Read-only from the engines' perspective. `price` is kept as the raw
/// decimal string the backend sends; use [`Book::unit_price`] before any
/// arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub sku: Sku,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "price_text")]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub curriculum: String,
    #[serde(default)]
    pub study_level: String,
    #[serde(default)]
    pub substitutable: bool,
    #[serde(default = "default_true")]
    pub stock_availability: bool,
    #[serde(default = "default_true")]
    pub visibility: bool,
}

fn default_true() -> bool {
    true
}

/// Accept `"100.00"` as well as a bare JSON number; some backend versions
/// serialize decimals as numbers.
fn price_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawPrice::deserialize(deserializer)? {
        RawPrice::Text(s) => s,
        RawPrice::Number(n) => n.to_string(),
    })
}

impl Book {
    pub fn new(sku: Sku, name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            sku,
            name: name.into(),
            description: None,
            price: price.into(),
            image: String::new(),
            category: String::new(),
            subject: String::new(),
            publisher: String::new(),
            grade: String::new(),
            curriculum: String::new(),
            study_level: String::new(),
            substitutable: false,
            stock_availability: true,
            visibility: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set one of the filterable attributes.
    pub fn with_attribute(mut self, dimension: FilterDimension, value: impl Into<String>) -> Self {
        let value = value.into();
        match dimension {
            FilterDimension::Category => self.category = value,
            FilterDimension::StudyLevel => self.study_level = value,
            FilterDimension::Curriculum => self.curriculum = value,
            FilterDimension::Grade => self.grade = value,
        }
        self
    }

    pub fn with_substitutable(mut self, substitutable: bool) -> Self {
        self.substitutable = substitutable;
        self
    }

    /// Raw value of a filterable attribute.
    pub fn attribute(&self, dimension: FilterDimension) -> &str {
        match dimension {
            FilterDimension::Category => &self.category,
            FilterDimension::StudyLevel => &self.study_level,
            FilterDimension::Curriculum => &self.curriculum,
            FilterDimension::Grade => &self.grade,
        }
    }

    /// Parsed unit price; fails with [`DomainError::InvalidPrice`] naming this SKU.
    pub fn unit_price(&self) -> DomainResult<Price> {
        self.price
            .parse::<Price>()
            .map_err(|_| DomainError::invalid_price(self.sku.as_str(), self.price.as_str()))
    }

    /// `needle` must already be lowercase.
    pub(crate) fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }

    /// `needle` must already be lowercase.
    pub(crate) fn description_contains(&self, needle: &str) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

impl Entity for Book {
    type Id = Sku;

    fn id(&self) -> &Self::Id {
        &self.sku
    }
}
