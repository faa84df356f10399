use crate::{DatePart, FieldRef, Operator, SkipReason};
use query_value::QueryValue;
use serde::{Deserialize, Serialize};

/// A single `field op value` leaf of a filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub op: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<QueryValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<QueryValue>,
    #[serde(default, alias = "jsonPath", skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
    #[serde(default, alias = "datePart", skip_serializing_if = "Option::is_none")]
    pub date_part: Option<DatePart>,
}

impl Condition {
    pub fn new<T>(field: impl Into<String>, op: Operator, value: T) -> Self
    where
        T: Into<QueryValue>,
    {
        Self {
            field: field.into(),
            op,
            value: Some(value.into()),
            values: Vec::new(),
            json_path: None,
            date_part: None,
        }
    }

    pub fn nullary(field: impl Into<String>, op: Operator) -> Self {
        Self {
            field: field.into(),
            op,
            value: None,
            values: Vec::new(),
            json_path: None,
            date_part: None,
        }
    }

    pub fn with_values<T>(field: impl Into<String>, op: Operator, values: Vec<T>) -> Self
    where
        T: Into<QueryValue>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Self::nullary(field, op)
        }
    }

    pub fn json_path(mut self, path: impl Into<String>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    pub fn date_part(mut self, part: DatePart) -> Self {
        self.date_part = Some(part);
        self
    }

    /// Resolves the field against the identifier allow-list.
    pub fn field_ref(&self) -> Result<FieldRef, SkipReason> {
        FieldRef::resolve(&self.field, self.json_path.as_deref())
    }

    /// The value compared against for single-value operators: `value`, or the
    /// first explicit `values` entry. Date part comparisons coerce numeric text.
    pub fn scalar_value(&self) -> Option<QueryValue> {
        let value = self.value.clone().or_else(|| self.values.first().cloned())?;

        match (self.date_part, value) {
            (Some(part), QueryValue::String(s)) if part.is_numeric() => {
                Some(s.trim().parse::<i64>().map(QueryValue::Int).unwrap_or(QueryValue::String(s)))
            }
            (_, value) => Some(value),
        }
    }

    /// Resolves the value list of set and range operators. Precedence:
    ///
    /// 1. `value` text parsed as a JSON array,
    /// 2. `value` text split on commas,
    /// 3. the explicit `values` list.
    ///
    /// A non-text `value` counts as a one element list (or as the list itself).
    pub fn resolve_list(&self) -> Vec<QueryValue> {
        let resolved = match &self.value {
            Some(QueryValue::String(s)) if !s.trim().is_empty() => parse_list_text(s),
            Some(QueryValue::List(list)) => list.clone(),
            Some(QueryValue::Null) | Some(QueryValue::String(_)) | None => self.values.clone(),
            Some(other) => vec![other.clone()],
        };

        match self.date_part {
            Some(part) if part.is_numeric() => resolved.into_iter().map(coerce_integer).collect(),
            _ => resolved,
        }
    }

    /// The two bounds of a `BETWEEN`, the single value of the documented
    /// equality fallback, or the reason why neither applies.
    pub fn resolve_range(&self) -> Result<Range, SkipReason> {
        let mut values = self.resolve_list();

        match values.len() {
            2 => {
                let upper = values.pop().unwrap_or(QueryValue::Null);
                let lower = values.pop().unwrap_or(QueryValue::Null);

                Ok(Range::Bounds(lower, upper))
            }
            1 => Ok(Range::Single(values.remove(0))),
            n => Err(SkipReason::BetweenArity(n)),
        }
    }
}

/// A resolved `BETWEEN` operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Range {
    Bounds(QueryValue, QueryValue),
    /// Only one value was given, compiled as an equality.
    Single(QueryValue),
}

fn parse_list_text(text: &str) -> Vec<QueryValue> {
    let trimmed = text.trim();

    if trimmed.starts_with('[') {
        if let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return items
                .into_iter()
                .filter_map(|item| QueryValue::try_from(item).ok())
                .collect();
        }
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(QueryValue::from)
        .collect()
}

fn coerce_integer(value: QueryValue) -> QueryValue {
    match value {
        QueryValue::String(s) => s.trim().parse::<i64>().map(QueryValue::Int).unwrap_or(QueryValue::String(s)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldCompare;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_array_text_wins() {
        let cond = Condition::new("status", Operator::In, r#"["a","b"]"#);
        assert_eq!(vec![QueryValue::from("a"), QueryValue::from("b")], cond.resolve_list());
    }

    #[test]
    fn comma_text_is_second() {
        let cond = Condition::new("status", Operator::In, " a, b ,,c ");
        assert_eq!(
            vec![QueryValue::from("a"), QueryValue::from("b"), QueryValue::from("c")],
            cond.resolve_list()
        );
    }

    #[test]
    fn malformed_json_falls_back_to_commas() {
        let cond = Condition::new("status", Operator::In, "[a,b");
        assert_eq!(vec![QueryValue::from("[a"), QueryValue::from("b")], cond.resolve_list());
    }

    #[test]
    fn explicit_values_are_last() {
        let mut cond = Condition::with_values("id", Operator::In, vec![1, 2]);
        assert_eq!(vec![QueryValue::Int(1), QueryValue::Int(2)], cond.resolve_list());

        cond.value = Some(QueryValue::from("3"));
        assert_eq!(vec![QueryValue::from("3")], cond.resolve_list());
    }

    #[test]
    fn empty_json_array_resolves_to_nothing() {
        assert!(Condition::new("id", Operator::In, "[]").resolve_list().is_empty());
        assert!(Condition::nullary("id", Operator::In).resolve_list().is_empty());
    }

    #[test]
    fn between_always_resolves_two_values() {
        let expected = Ok(Range::Bounds(QueryValue::Int(1), QueryValue::Int(5)));

        assert_eq!(expected, "age".between(vec![1, 5]).resolve_range());
        assert_eq!(expected, Condition::new("age", Operator::Between, "[1,5]").resolve_range());
        assert_eq!(
            Ok(Range::Bounds(QueryValue::from("1"), QueryValue::from("5"))),
            Condition::new("age", Operator::Between, "1,5").resolve_range()
        );
    }

    #[test]
    fn between_arity() {
        assert_eq!(
            Ok(Range::Single(QueryValue::from("1"))),
            Condition::new("age", Operator::Between, "1").resolve_range()
        );
        assert_eq!(
            Err(SkipReason::BetweenArity(3)),
            Condition::new("age", Operator::Between, "1,2,3").resolve_range()
        );
    }

    #[test]
    fn date_parts_coerce_numeric_text() {
        let cond = Condition::new("created_at", Operator::Equals, "2020").date_part(DatePart::Year);
        assert_eq!(Some(QueryValue::Int(2020)), cond.scalar_value());

        let cond = Condition::new("created_at", Operator::Equals, "2020-01-01").date_part(DatePart::Date);
        assert_eq!(Some(QueryValue::from("2020-01-01")), cond.scalar_value());
    }
}
