//! Compact map payloads: `{"name": "tom", "age__gte": 18, "created_at__year__lt": 2020}`.
//!
//! Keys are `field`, `field__op`, `field__datepart` or `field__datepart__op`.
//! The AND payload is merged into the top-level conjunction, every object of
//! the OR payload becomes one disjunctive group appended to it.

use crate::ParseError;
use query_structure::{Arity, Condition, DatePart, FilterExpression, Operator};
use query_value::QueryValue;
use serde_json::{Map, Value as JsonValue};
use std::convert::TryFrom;
use tracing::debug;

const KEY_DELIMITER: &str = "__";

/// Parses the textual AND and OR payloads. Blank payloads are ignored.
pub fn parse(and: Option<&str>, or: Option<&str>) -> crate::Result<FilterExpression> {
    let and = and.map(parse_payload).transpose()?.flatten();
    let or = or.map(parse_payload).transpose()?.flatten();

    from_values(and, or)
}

pub fn from_values(and: Option<JsonValue>, or: Option<JsonValue>) -> crate::Result<FilterExpression> {
    let mut filter = FilterExpression::and(Vec::new());

    if let Some(payload) = and {
        for object in objects(payload)? {
            for (key, value) in object {
                filter.push_condition(condition(&key, value)?);
            }
        }
    }

    if let Some(payload) = or {
        for object in objects(payload)? {
            let conditions = object
                .into_iter()
                .map(|(key, value)| condition(&key, value))
                .collect::<crate::Result<Vec<_>>>()?;

            if !conditions.is_empty() {
                filter.push_group(FilterExpression::or(conditions));
            }
        }
    }

    Ok(filter)
}

fn parse_payload(text: &str) -> crate::Result<Option<JsonValue>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(text).map(Some).map_err(ParseError::invalid_filter_json)
}

fn objects(payload: JsonValue) -> crate::Result<Vec<Map<String, JsonValue>>> {
    match payload {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Object(object) => Ok(vec![object]),
        JsonValue::Array(items) => items
            .into_iter()
            .map(|item| match item {
                JsonValue::Object(object) => Ok(object),
                other => Err(ParseError::invalid_filter_json(format!(
                    "expected an object, got `{other}`"
                ))),
            })
            .collect(),
        other => Err(ParseError::invalid_filter_json(format!(
            "expected an object or an array of objects, got `{other}`"
        ))),
    }
}

/// One key/value pair to a condition. Keys that name no known operator keep
/// `Operator::Unspecified` and are dropped by the compilers.
fn condition(key: &str, value: JsonValue) -> crate::Result<Condition> {
    let segments: Vec<&str> = key.split(KEY_DELIMITER).collect();

    let (field, date_part, mut op) = match segments.as_slice() {
        [field] => (*field, None, Operator::Equals),
        [field, suffix] => {
            let op = Operator::from_alias(suffix);

            match DatePart::from_alias(suffix) {
                Some(part) if !op.is_specified() => (*field, Some(part), Operator::Equals),
                _ => (*field, None, op),
            }
        }
        [field, part, op] => match DatePart::from_alias(part) {
            Some(part) => (*field, Some(part), Operator::from_alias(op)),
            None => (*field, None, Operator::Unspecified),
        },
        _ => (segments[0], None, Operator::Unspecified),
    };

    if !op.is_specified() {
        debug!(key, "Filter key names no known operator.");
    }

    let value = QueryValue::try_from(value)
        .map_err(|err| ParseError::invalid_filter_json(format!("value of `{key}`: {err}")))?;

    // `field__isnull=false` means the opposite null check.
    if value.as_boolean() == Some(false) {
        op = match op {
            Operator::IsNull => Operator::IsNotNull,
            Operator::IsNotNull => Operator::IsNull,
            other => other,
        };
    }

    let mut condition = match (op.arity(), value) {
        (Arity::Nullary, _) => Condition::nullary(field, op),
        (_, QueryValue::List(values)) => Condition::with_values(field, op, values),
        (_, value) => Condition::new(field, op, value),
    };

    if let Some((column, path)) = field.split_once('.') {
        condition.field = column.to_owned();
        condition.json_path = Some(path.to_owned());
    }

    condition.date_part = date_part;

    Ok(condition)
}
