//! Filters that already arrive in the canonical shape.

use crate::ParseError;
use query_structure::FilterExpression;

pub fn parse(filter: FilterExpression) -> FilterExpression {
    filter
}

/// `{"type": "AND", "conditions": [...], "groups": [...]}`, operators in any
/// of their alias spellings.
pub fn from_json(input: &str) -> crate::Result<FilterExpression> {
    if input.trim().is_empty() {
        return Ok(FilterExpression::default());
    }

    serde_json::from_str(input).map_err(ParseError::invalid_filter_json)
}

pub fn from_value(value: serde_json::Value) -> crate::Result<FilterExpression> {
    serde_json::from_value(value).map_err(ParseError::invalid_filter_json)
}
