//! Catalog domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::Sort;

/// Sort order for product listings.
///
/// Wire format is a single hyphenated string (e.g. `"price-desc"`), hence the
/// hand-written serde impls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductSortBy {
    Name(Sort),
    Price(Sort),
    CreatedAt(Sort),
}

impl Default for ProductSortBy {
    fn default() -> Self {
        Self::Name(Sort::Asc)
    }
}

const SORT_VARIANTS: &[&str] = &["name-asc", "price-asc", "price-desc", "created-at-desc"];

/// Error returned when a string is not a known [`ProductSortBy`] wire value.
#[derive(Debug, Error)]
#[error("unknown product sort key: {0:?}")]
pub struct UnknownSortKey(pub String);

impl ProductSortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name(Sort::Asc) => "name-asc",
            Self::Name(Sort::Desc) => "name-desc",
            Self::Price(Sort::Asc) => "price-asc",
            Self::Price(Sort::Desc) => "price-desc",
            Self::CreatedAt(Sort::Asc) => "created-at-asc",
            Self::CreatedAt(Sort::Desc) => "created-at-desc",
        }
    }

    /// Lenient parse used for query strings: unknown or missing keys fall back to
    /// the default name ordering.
    pub fn from_query(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for ProductSortBy {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name-asc" => Ok(Self::Name(Sort::Asc)),
            "price-asc" => Ok(Self::Price(Sort::Asc)),
            "price-desc" => Ok(Self::Price(Sort::Desc)),
            "created-at-desc" => Ok(Self::CreatedAt(Sort::Desc)),
            other => Err(UnknownSortKey(other.to_owned())),
        }
    }
}

impl fmt::Display for ProductSortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductSortBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::unknown_variant(&s, SORT_VARIANTS))
    }
}

impl Serialize for ProductSortBy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
