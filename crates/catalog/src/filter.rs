//! Single-select catalog filters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bookstore_core::DomainError;

use crate::book::Book;

/// A filterable book attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    Category,
    StudyLevel,
    Curriculum,
    Grade,
}

impl FilterDimension {
    pub const ALL: [FilterDimension; 4] = [
        FilterDimension::Category,
        FilterDimension::StudyLevel,
        FilterDimension::Curriculum,
        FilterDimension::Grade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDimension::Category => "category",
            FilterDimension::StudyLevel => "study_level",
            FilterDimension::Curriculum => "curriculum",
            FilterDimension::Grade => "grade",
        }
    }
}

impl core::fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for FilterDimension {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterDimension::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown filter dimension: {s}")))
    }
}

/// At most one selected value per dimension. An empty value means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    values: BTreeMap<FilterDimension, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `value` for `dimension`, replacing any previous selection.
    /// Returns `true` if the set changed.
    pub fn set(&mut self, dimension: FilterDimension, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return self.values.remove(&dimension).is_some();
        }
        self.values.insert(dimension, value.clone()) != Some(value)
    }

    pub fn get(&self, dimension: FilterDimension) -> Option<&str> {
        self.values.get(&dimension).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterDimension, &str)> {
        self.values.iter().map(|(d, v)| (*d, v.as_str()))
    }

    /// Exact, case-sensitive equality on every set dimension.
    pub fn matches(&self, book: &Book) -> bool {
        self.values
            .iter()
            .all(|(dimension, value)| book.attribute(*dimension) == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_core::Sku;

    fn book() -> Book {
        Book::new(Sku::new("X1").unwrap(), "Book", "1")
            .with_attribute(FilterDimension::Category, "Textbooks")
            .with_attribute(FilterDimension::Grade, "Grade 4")
    }

    #[test]
    fn dimension_round_trips_through_str() {
        for d in FilterDimension::ALL {
            assert_eq!(d.as_str().parse::<FilterDimension>().unwrap(), d);
        }
        assert!("location".parse::<FilterDimension>().is_err());
    }

    #[test]
    fn empty_value_unsets_dimension() {
        let mut filters = FilterSet::new();
        assert!(filters.set(FilterDimension::Category, "Textbooks"));
        assert!(!filters.set(FilterDimension::Category, "Textbooks"));
        assert!(filters.set(FilterDimension::Category, ""));
        assert!(filters.is_empty());
        assert!(!filters.set(FilterDimension::Category, ""));
    }

    #[test]
    fn single_select_replaces_previous_value() {
        let mut filters = FilterSet::new();
        filters.set(FilterDimension::Grade, "Grade 3");
        filters.set(FilterDimension::Grade, "Grade 4");
        assert_eq!(filters.get(FilterDimension::Grade), Some("Grade 4"));
        assert_eq!(filters.iter().count(), 1);
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let mut filters = FilterSet::new();
        assert!(filters.matches(&book()));

        filters.set(FilterDimension::Category, "Textbooks");
        assert!(filters.matches(&book()));

        filters.set(FilterDimension::Category, "textbooks");
        assert!(!filters.matches(&book()));

        filters.set(FilterDimension::Category, "Textbooks");
        filters.set(FilterDimension::Curriculum, "CBC");
        assert!(!filters.matches(&book()));
    }
}
