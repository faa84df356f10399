use crate::IntoBson;
use bson::{doc, Bson, Document};
use query_structure::{
    Compiled, Condition, DatePart, FilterExpression, FilterType, Operator, QueryValue, Range, SkipPolicy, SkipReason,
    SkippedCondition,
};

const DIALECT: &str = "MongoDB";

/// Converts a filter tree into a query document, `None` when no condition
/// survives.
pub fn convert_filter(filter: &FilterExpression, policy: SkipPolicy) -> Result<Option<Document>, SkippedCondition> {
    if filter.kind == FilterType::Unspecified {
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(filter.conditions.len() + filter.groups.len());

    for condition in &filter.conditions {
        if let Some(document) = policy.accept(&condition.field, convert_condition(condition))? {
            parts.push(document);
        }
    }

    for group in &filter.groups {
        if let Some(document) = convert_filter(group, policy)? {
            parts.push(document);
        }
    }

    let operator = if filter.kind == FilterType::Or { "$or" } else { "$and" };

    Ok(combine(operator, parts))
}

/// `$and`/`$or` over the parts. A single part stands for itself.
pub(crate) fn combine(operator: &str, mut parts: Vec<Document>) -> Option<Document> {
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(doc! { operator: parts }),
    }
}

pub fn convert_condition(condition: &Condition) -> Compiled<Document> {
    let field = match condition.field_ref() {
        Ok(field) => field.dotted(),
        Err(reason) => return Compiled::Skipped(reason),
    };

    match condition.date_part {
        Some(part) => expression_condition(condition, date_part_expression(&field, part)),
        None => field_condition(condition, field),
    }
}

// Mongo filters on a plain (or dotted) key.
fn field_condition(condition: &Condition, field: String) -> Compiled<Document> {
    let filter = match condition.op {
        Operator::Unspecified => return Compiled::Skipped(SkipReason::UnknownOperator),

        Operator::Equals
        | Operator::NotEquals
        | Operator::GreaterThan
        | Operator::GreaterThanOrEquals
        | Operator::LessThan
        | Operator::LessThanOrEquals => match condition.scalar_value() {
            Some(value) => doc! { comparison(condition.op): value.into_bson() },
            None => return Compiled::Skipped(SkipReason::MissingValue),
        },

        Operator::In | Operator::NotIn => {
            let values = condition.resolve_list();

            match (condition.op, values.is_empty()) {
                (Operator::In, true) => return Compiled::Rendered(doc! { "$expr": false }),
                (_, true) => return Compiled::Vacuous,
                (Operator::In, false) => doc! { "$in": values.into_bson() },
                (_, false) => doc! { "$nin": values.into_bson() },
            }
        }

        Operator::Between => match condition.resolve_range() {
            Ok(Range::Bounds(lower, upper)) => doc! { "$gte": lower.into_bson(), "$lte": upper.into_bson() },
            Ok(Range::Single(value)) => doc! { "$eq": value.into_bson() },
            Err(reason) => return Compiled::Skipped(reason),
        },

        Operator::IsNull => doc! { "$eq": Bson::Null },
        Operator::IsNotNull => doc! { "$ne": Bson::Null },

        Operator::Search => match pattern_text(condition) {
            Some(text) => return Compiled::Rendered(doc! { "$text": { "$search": text } }),
            None => return Compiled::Skipped(SkipReason::MissingValue),
        },

        _ => match regex_pattern(condition) {
            Some(pattern) if condition.op.is_insensitive() => doc! { "$regex": pattern, "$options": "i" },
            Some(pattern) => doc! { "$regex": pattern },
            None => return Compiled::Skipped(SkipReason::MissingValue),
        },
    };

    Compiled::Rendered(doc! { field: filter })
}

// Filters on a computed value, through `$expr`.
fn expression_condition(condition: &Condition, expression: Bson) -> Compiled<Document> {
    let filter = match condition.op {
        Operator::Unspecified => return Compiled::Skipped(SkipReason::UnknownOperator),

        Operator::Equals
        | Operator::NotEquals
        | Operator::GreaterThan
        | Operator::GreaterThanOrEquals
        | Operator::LessThan
        | Operator::LessThanOrEquals => match condition.scalar_value() {
            Some(value) => doc! { comparison(condition.op): [expression, value.into_bson()] },
            None => return Compiled::Skipped(SkipReason::MissingValue),
        },

        Operator::In | Operator::NotIn => {
            let values = condition.resolve_list();

            match (condition.op, values.is_empty()) {
                (Operator::In, true) => return Compiled::Rendered(doc! { "$expr": false }),
                (_, true) => return Compiled::Vacuous,
                (Operator::In, false) => doc! { "$in": [expression, values.into_bson()] },
                (_, false) => doc! { "$not": [{ "$in": [expression, values.into_bson()] }] },
            }
        }

        Operator::Between => match condition.resolve_range() {
            Ok(Range::Bounds(lower, upper)) => doc! {
                "$and": [
                    { "$gte": [expression.clone(), lower.into_bson()] },
                    { "$lte": [expression, upper.into_bson()] },
                ]
            },
            Ok(Range::Single(value)) => doc! { "$eq": [expression, value.into_bson()] },
            Err(reason) => return Compiled::Skipped(reason),
        },

        Operator::IsNull => doc! { "$eq": [expression, Bson::Null] },
        Operator::IsNotNull => doc! { "$ne": [expression, Bson::Null] },

        Operator::Search => {
            return Compiled::Skipped(SkipReason::UnsupportedOperator {
                op: condition.op,
                dialect: DIALECT,
            })
        }

        _ => match regex_pattern(condition) {
            Some(pattern) => {
                let options = if condition.op.is_insensitive() { "i" } else { "" };

                doc! {
                    "$regexMatch": {
                        "input": { "$toString": expression },
                        "regex": pattern,
                        "options": options,
                    }
                }
            }
            None => return Compiled::Skipped(SkipReason::MissingValue),
        },
    };

    Compiled::Rendered(doc! { "$expr": filter })
}

fn comparison(op: Operator) -> &'static str {
    match op {
        Operator::NotEquals => "$ne",
        Operator::GreaterThan => "$gt",
        Operator::GreaterThanOrEquals => "$gte",
        Operator::LessThan => "$lt",
        Operator::LessThanOrEquals => "$lte",
        _ => "$eq",
    }
}

/// Pattern operators as anchored regular expressions over the escaped value.
fn regex_pattern(condition: &Condition) -> Option<String> {
    let text = pattern_text(condition)?;

    let pattern = match condition.op {
        Operator::Regexp | Operator::InsensitiveRegexp => text,
        Operator::Contains | Operator::InsensitiveContains => regex::escape(&text),
        Operator::StartsWith | Operator::InsensitiveStartsWith => format!("^{}", regex::escape(&text)),
        Operator::EndsWith | Operator::InsensitiveEndsWith => format!("{}$", regex::escape(&text)),
        _ => format!("^{}$", regex::escape(&text)),
    };

    Some(pattern)
}

fn pattern_text(condition: &Condition) -> Option<String> {
    match condition.scalar_value()? {
        QueryValue::Null => None,
        value => Some(value.to_text()),
    }
}

fn date_part_expression(field: &str, part: DatePart) -> Bson {
    let path = format!("${field}");

    let expression = match part {
        DatePart::Year => doc! { "$year": path },
        DatePart::IsoYear => doc! { "$isoWeekYear": path },
        DatePart::Quarter => doc! { "$ceil": { "$divide": [{ "$month": path }, 3] } },
        DatePart::Month => doc! { "$month": path },
        DatePart::Week => doc! { "$isoWeek": path },
        DatePart::WeekDay => doc! { "$dayOfWeek": path },
        DatePart::IsoWeekDay => doc! { "$isoDayOfWeek": path },
        DatePart::Day => doc! { "$dayOfMonth": path },
        DatePart::Hour => doc! { "$hour": path },
        DatePart::Minute => doc! { "$minute": path },
        DatePart::Second => doc! { "$second": path },
        DatePart::Date => doc! { "$dateToString": { "format": "%Y-%m-%d", "date": path } },
        DatePart::Time => doc! { "$dateToString": { "format": "%H:%M:%S", "date": path } },
    };

    Bson::Document(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use query_structure::FieldCompare;

    #[test]
    fn comparisons() {
        assert_eq!(
            Compiled::Rendered(doc! { "name": { "$eq": "tom" } }),
            convert_condition(&"name".equals("tom"))
        );
        assert_eq!(
            Compiled::Rendered(doc! { "age": { "$gte": 18_i64 } }),
            convert_condition(&"age".greater_than_or_equals(18))
        );
    }

    #[test]
    fn null_equality_is_a_null_check() {
        assert_eq!(
            Compiled::Rendered(doc! { "deleted_at": { "$ne": Bson::Null } }),
            convert_condition(&Condition::new("deleted_at", Operator::NotEquals, QueryValue::Null))
        );
    }

    #[test]
    fn empty_lists_are_asymmetric() {
        let empty: Vec<i64> = Vec::new();

        assert_eq!(
            Compiled::Rendered(doc! { "$expr": false }),
            convert_condition(&"id".is_in(empty.clone()))
        );
        assert_eq!(Compiled::Vacuous, convert_condition(&"id".not_in(empty)));
    }

    #[test]
    fn between_bounds() {
        assert_eq!(
            Compiled::Rendered(doc! { "age": { "$gte": 18_i64, "$lte": 65_i64 } }),
            convert_condition(&"age".between(vec![18, 65]))
        );
        assert_eq!(
            Compiled::Skipped(SkipReason::BetweenArity(0)),
            convert_condition(&"age".between(Vec::<i64>::new()))
        );
    }

    #[test]
    fn patterns_are_escaped() {
        assert_eq!(
            Compiled::Rendered(doc! { "email": { "$regex": "^tom\\.b", "$options": "i" } }),
            convert_condition(&Condition::new("email", Operator::InsensitiveStartsWith, "tom.b"))
        );
        assert_eq!(
            Compiled::Rendered(doc! { "name": { "$regex": "^t.m$" } }),
            convert_condition(&"name".regex_matches("^t.m$"))
        );
    }

    #[test]
    fn full_text_search() {
        assert_eq!(
            Compiled::Rendered(doc! { "$text": { "$search": "rust" } }),
            convert_condition(&Condition::new("body", Operator::Search, "rust"))
        );
    }

    #[test]
    fn date_parts_use_expressions() {
        assert_eq!(
            Compiled::Rendered(doc! { "$expr": { "$eq": [{ "$year": "$created_at" }, 2020_i64] } }),
            convert_condition(&Condition::new("created_at", Operator::Equals, "2020").date_part(DatePart::Year))
        );
        assert_eq!(
            Compiled::Rendered(doc! {
                "$expr": { "$in": [{ "$dayOfWeek": "$created_at" }, [1_i64, 7_i64]] }
            }),
            convert_condition(&"created_at".is_in(vec![1, 7]).date_part(DatePart::WeekDay))
        );
    }

    #[test]
    fn dotted_fields_stay_dotted() {
        assert_eq!(
            Compiled::Rendered(doc! { "meta.address.city": { "$eq": "Berlin" } }),
            convert_condition(&"meta".equals("Berlin").json_path("$.address.city"))
        );
    }

    #[test]
    fn groups_compose() {
        let filter = FilterExpression::and(vec!["a".equals(1)])
            .with_group(FilterExpression::or(vec!["b".equals(2), "c".equals(3)]));

        assert_eq!(
            Some(doc! {
                "$and": [
                    { "a": { "$eq": 1_i64 } },
                    { "$or": [{ "b": { "$eq": 2_i64 } }, { "c": { "$eq": 3_i64 } }] },
                ]
            }),
            convert_filter(&filter, SkipPolicy::Lenient).unwrap()
        );
    }

    #[test]
    fn unsafe_fields_are_skipped() {
        let filter = FilterExpression::and(vec!["$where".equals("1"), "a".equals(1)]);

        assert_eq!(
            Some(doc! { "a": { "$eq": 1_i64 } }),
            convert_filter(&filter, SkipPolicy::Lenient).unwrap()
        );
        assert!(convert_filter(&filter, SkipPolicy::Strict).is_err());
    }
}
