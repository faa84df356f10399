use crate::{FieldRef, SkipReason};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Ascending,
    #[serde(rename = "DESC", alias = "desc")]
    Descending,
}

impl SortOrder {
    pub fn from_keyword(keyword: &str) -> Option<SortOrder> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Ascending),
            "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }

    pub fn is_descending(self) -> bool {
        self == SortOrder::Descending
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an ordering. The first entry of a list is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default, alias = "direction")]
    pub sort_order: SortOrder,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            field: field.into(),
            sort_order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Descending)
    }

    pub fn field_ref(&self) -> Result<FieldRef, SkipReason> {
        FieldRef::resolve(&self.field, None)
    }

    /// Applies `default` only when nothing was requested.
    pub fn with_default(order_by: Vec<OrderBy>, default: Vec<OrderBy>) -> Vec<OrderBy> {
        if order_by.is_empty() {
            default
        } else {
            order_by
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.sort_order)
    }
}
