use crate::literal::{quote_identifier, regex_literal, render_literal};
use itertools::Itertools;
use query_structure::{
    Compiled, Condition, FilterExpression, FilterType, Operator, QueryValue, Range, SkipPolicy, SkipReason,
    SkippedCondition,
};

const DIALECT: &str = "InfluxQL";

/// A predicate no point satisfies.
const NEVER: &str = "time < 0 AND time > 0";

/// Converts a filter tree into `WHERE` entries, joined with `AND` by the
/// builder. The parts of a top-level AND are separate entries, an OR is one
/// parenthesized entry.
pub fn convert_filter(filter: &FilterExpression, policy: SkipPolicy) -> Result<Vec<String>, SkippedCondition> {
    let parts = match filter.kind {
        FilterType::Unspecified => return Ok(Vec::new()),
        _ => parts(filter, policy)?,
    };

    let entries = match filter.kind {
        FilterType::Or if parts.len() > 1 => vec![format!("({})", parts.join(" OR "))],
        _ => parts,
    };

    Ok(entries)
}

fn parts(filter: &FilterExpression, policy: SkipPolicy) -> Result<Vec<String>, SkippedCondition> {
    let mut parts = Vec::with_capacity(filter.conditions.len() + filter.groups.len());

    for condition in &filter.conditions {
        if let Some(rendered) = policy.accept(&condition.field, convert_condition(condition))? {
            parts.push(rendered);
        }
    }

    for group in &filter.groups {
        if group.kind == FilterType::Unspecified {
            continue;
        }

        let group_parts = self::parts(group, policy)?;
        let connective = if group.kind == FilterType::Or { " OR " } else { " AND " };

        match group_parts.len() {
            0 => (),
            1 => parts.extend(group_parts),
            _ => parts.push(format!("({})", group_parts.join(connective))),
        }
    }

    Ok(parts)
}

pub fn convert_condition(condition: &Condition) -> Compiled<String> {
    let field = match condition.field_ref() {
        Ok(field) => quote_identifier(&field.dotted()),
        Err(reason) => return Compiled::Skipped(reason),
    };

    if let Some(part) = condition.date_part {
        return Compiled::Skipped(SkipReason::UnsupportedDatePart { part, dialect: DIALECT });
    }

    let rendered = match condition.op {
        Operator::Unspecified => return Compiled::Skipped(SkipReason::UnknownOperator),

        Operator::Equals
        | Operator::NotEquals
        | Operator::GreaterThan
        | Operator::GreaterThanOrEquals
        | Operator::LessThan
        | Operator::LessThanOrEquals => {
            let op = match condition.op {
                Operator::Equals => "=",
                Operator::NotEquals => "!=",
                Operator::GreaterThan => ">",
                Operator::GreaterThanOrEquals => ">=",
                Operator::LessThan => "<",
                _ => "<=",
            };

            match condition.scalar_value() {
                Some(value) => format!("{field} {op} {}", render_literal(&value)),
                None => return Compiled::Skipped(SkipReason::MissingValue),
            }
        }

        // No IN in InfluxQL: a chain of equalities.
        Operator::In | Operator::NotIn => {
            let values = condition.resolve_list();

            let (op, connective) = match condition.op {
                Operator::In => ("=", " OR "),
                _ => ("!=", " AND "),
            };

            match (condition.op, values.len()) {
                (Operator::In, 0) => format!("({NEVER})"),
                (_, 0) => return Compiled::Vacuous,
                (_, 1) => format!("{field} {op} {}", render_literal(&values[0])),
                _ => format!(
                    "({})",
                    values
                        .iter()
                        .map(|value| format!("{field} {op} {}", render_literal(value)))
                        .join(connective)
                ),
            }
        }

        Operator::Between => match condition.resolve_range() {
            Ok(Range::Bounds(lower, upper)) => format!(
                "({field} >= {} AND {field} <= {})",
                render_literal(&lower),
                render_literal(&upper)
            ),
            Ok(Range::Single(value)) => format!("{field} = {}", render_literal(&value)),
            Err(reason) => return Compiled::Skipped(reason),
        },

        Operator::IsNull => format!("{field} = ''"),
        Operator::IsNotNull => format!("{field} != ''"),

        _ => match regex_pattern(condition) {
            Some(pattern) => match regex_literal(&pattern) {
                Some(literal) => format!("{field} =~ {literal}"),
                None => return Compiled::Skipped(SkipReason::InvalidPattern(pattern)),
            },
            None => return Compiled::Skipped(SkipReason::MissingValue),
        },
    };

    Compiled::Rendered(rendered)
}

fn regex_pattern(condition: &Condition) -> Option<String> {
    let text = match condition.scalar_value()? {
        QueryValue::Null => return None,
        value => value.to_text(),
    };

    let pattern = match condition.op {
        Operator::Regexp | Operator::InsensitiveRegexp => text,
        Operator::Contains | Operator::InsensitiveContains | Operator::Search => regex::escape(&text),
        Operator::StartsWith | Operator::InsensitiveStartsWith => format!("^{}", regex::escape(&text)),
        Operator::EndsWith | Operator::InsensitiveEndsWith => format!("{}$", regex::escape(&text)),
        _ => format!("^{}$", regex::escape(&text)),
    };

    if condition.op.is_insensitive() {
        Some(format!("(?i){pattern}"))
    } else {
        Some(pattern)
    }
}
