//! Business-listing record types.
//!
//! Every field of a [`ResultRecord`] is always populated: either with the
//! text read from the listing or with the [`UNAVAILABLE`] sentinel. Consumers
//! never branch on presence.

use serde::{Deserialize, Serialize};

/// Text written in place of any field that could not be read.
pub const UNAVAILABLE: &str = "N/A";

/// Column order shared by the structured dump, both tabular exports and the
/// report.
pub const COLUMNS: [&str; 7] = [
    "name",
    "category",
    "address",
    "phone",
    "website",
    "rating",
    "reviewCount",
];

/// A single field value: either the text read from the page or the sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldValue {
    Present(String),
    #[default]
    Unavailable,
}

impl FieldValue {
    /// Build a value from raw page text. Surrounding whitespace is trimmed;
    /// blank text and the [`UNAVAILABLE`] sentinel itself become
    /// [`FieldValue::Unavailable`].
    #[must_use]
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == UNAVAILABLE {
            Self::Unavailable
        } else {
            Self::Present(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The value as written to output artifacts.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Present(value) => value,
            Self::Unavailable => UNAVAILABLE,
        }
    }
}

impl From<String> for FieldValue {
    fn from(raw: String) -> Self {
        Self::from_text(&raw)
    }
}

impl From<&str> for FieldValue {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<FieldValue> for String {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Present(text) => text,
            FieldValue::Unavailable => UNAVAILABLE.to_string(),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted business listing. Created once per successfully opened
/// candidate and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub name: FieldValue,
    pub category: FieldValue,
    pub address: FieldValue,
    pub phone: FieldValue,
    pub website: FieldValue,
    pub rating: FieldValue,
    pub review_count: FieldValue,
}

impl ResultRecord {
    #[must_use]
    pub fn has_phone(&self) -> bool {
        self.phone.is_present()
    }

    /// Field values in [`COLUMNS`] order.
    #[must_use]
    pub fn fields(&self) -> [&FieldValue; 7] {
        [
            &self.name,
            &self.category,
            &self.address,
            &self.phone,
            &self.website,
            &self.rating,
            &self.review_count,
        ]
    }
}
