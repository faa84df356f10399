use super::{ConditionTree, Predicate};
use crate::Visitor;
use itertools::Itertools;
use query_structure::{
    Compiled, Condition, FilterExpression, FilterType, Operator, QueryValue, Range, SkipPolicy, SkipReason,
    SkippedCondition,
};
use std::marker::PhantomData;

/// Walks a [`FilterExpression`] and renders every condition for the dialect
/// `D`. Conditions that cannot be compiled go through the skip policy.
pub struct FilterVisitor<D> {
    policy: SkipPolicy,
    dialect: PhantomData<D>,
}

impl<D: Visitor> FilterVisitor<D> {
    pub fn new(policy: SkipPolicy) -> Self {
        Self {
            policy,
            dialect: PhantomData,
        }
    }

    pub fn visit_filter(&self, filter: &FilterExpression) -> Result<ConditionTree, SkippedCondition> {
        if filter.kind == FilterType::Unspecified {
            return Ok(ConditionTree::NoCondition);
        }

        let mut parts = Vec::with_capacity(filter.conditions.len() + filter.groups.len());

        for condition in &filter.conditions {
            if let Some(tree) = self.policy.accept(&condition.field, self.visit_condition(condition))? {
                parts.push(tree);
            }
        }

        for group in &filter.groups {
            match self.visit_filter(group)? {
                ConditionTree::NoCondition => (),
                tree => parts.push(tree),
            }
        }

        let tree = match filter.kind {
            _ if parts.is_empty() => ConditionTree::NoCondition,
            FilterType::Or => ConditionTree::Or(parts),
            _ => ConditionTree::And(parts),
        };

        Ok(tree)
    }

    pub fn visit_condition(&self, condition: &Condition) -> Compiled<ConditionTree> {
        let field = match condition.field_ref() {
            Ok(field) => field,
            Err(reason) => return Compiled::Skipped(reason),
        };

        let mut expr = D::visit_field(&field);

        if let Some(part) = condition.date_part {
            expr = match D::visit_date_part(&expr, part) {
                Ok(extracted) => extracted,
                Err(reason) => return Compiled::Skipped(reason),
            };
        }

        let param = D::C_PARAM;

        match condition.op {
            Operator::Unspecified => Compiled::Skipped(SkipReason::UnknownOperator),

            Operator::Equals | Operator::NotEquals => match condition.scalar_value() {
                None => Compiled::Skipped(SkipReason::MissingValue),
                Some(QueryValue::Null) if condition.op == Operator::Equals => single(format!("{expr} IS NULL"), vec![]),
                Some(QueryValue::Null) => single(format!("{expr} IS NOT NULL"), vec![]),
                Some(value) => {
                    let op = if condition.op == Operator::Equals { "=" } else { "<>" };
                    single(format!("{expr} {op} {param}"), vec![value])
                }
            },

            Operator::GreaterThan
            | Operator::GreaterThanOrEquals
            | Operator::LessThan
            | Operator::LessThanOrEquals => {
                let op = match condition.op {
                    Operator::GreaterThan => ">",
                    Operator::GreaterThanOrEquals => ">=",
                    Operator::LessThan => "<",
                    _ => "<=",
                };

                match condition.scalar_value() {
                    Some(value) => single(format!("{expr} {op} {param}"), vec![value]),
                    None => Compiled::Skipped(SkipReason::MissingValue),
                }
            }

            Operator::In | Operator::NotIn => {
                let values = condition.resolve_list();

                match (condition.op, values.is_empty()) {
                    (Operator::In, true) => Compiled::Rendered(ConditionTree::NegativeCondition),
                    (_, true) => Compiled::Vacuous,
                    (op, false) => {
                        let keyword = if op == Operator::In { "IN" } else { "NOT IN" };
                        let placeholders = values.iter().map(|_| param).join(", ");

                        single(format!("{expr} {keyword} ({placeholders})"), values)
                    }
                }
            }

            Operator::Between => match condition.resolve_range() {
                Ok(Range::Bounds(lower, upper)) => {
                    single(format!("{expr} BETWEEN {param} AND {param}"), vec![lower, upper])
                }
                Ok(Range::Single(value)) => single(format!("{expr} = {param}"), vec![value]),
                Err(reason) => Compiled::Skipped(reason),
            },

            Operator::IsNull => single(format!("{expr} IS NULL"), vec![]),
            Operator::IsNotNull => single(format!("{expr} IS NOT NULL"), vec![]),

            Operator::Contains
            | Operator::InsensitiveContains
            | Operator::StartsWith
            | Operator::InsensitiveStartsWith
            | Operator::EndsWith
            | Operator::InsensitiveEndsWith
            | Operator::Exact
            | Operator::InsensitiveExact => {
                let value = match pattern_text(condition) {
                    Some(value) => escape_like(&value),
                    None => return Compiled::Skipped(SkipReason::MissingValue),
                };

                let pattern = match condition.op {
                    Operator::Contains | Operator::InsensitiveContains => format!("%{value}%"),
                    Operator::StartsWith | Operator::InsensitiveStartsWith => format!("{value}%"),
                    Operator::EndsWith | Operator::InsensitiveEndsWith => format!("%{value}"),
                    _ => value,
                };

                let sql = if condition.op.is_insensitive() {
                    D::visit_insensitive_like(&expr)
                } else {
                    format!("{expr} LIKE {param}{}", D::C_LIKE_ESCAPE)
                };

                single(sql, vec![QueryValue::String(pattern)])
            }

            Operator::Regexp | Operator::InsensitiveRegexp => match pattern_text(condition) {
                Some(pattern) => {
                    let (sql, pattern) = D::visit_regex(&expr, pattern, condition.op == Operator::InsensitiveRegexp);
                    single(sql, vec![pattern])
                }
                None => Compiled::Skipped(SkipReason::MissingValue),
            },

            Operator::Search => match pattern_text(condition) {
                Some(text) => match D::visit_search(&expr) {
                    Some(sql) => single(sql, vec![QueryValue::String(text)]),
                    None => single(
                        format!("{expr} LIKE {param}{}", D::C_LIKE_ESCAPE),
                        vec![QueryValue::String(format!("%{}%", escape_like(&text)))],
                    ),
                },
                None => Compiled::Skipped(SkipReason::MissingValue),
            },
        }
    }
}

fn single(sql: String, params: Vec<QueryValue>) -> Compiled<ConditionTree> {
    Compiled::Rendered(ConditionTree::Single(Predicate::new(sql, params)))
}

fn pattern_text(condition: &Condition) -> Option<String> {
    match condition.scalar_value()? {
        QueryValue::Null => None,
        value => Some(value.to_text()),
    }
}

/// Makes `%`, `_` and `\` match themselves.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClickHouse, Mysql, Postgres, Sqlite};
    use pretty_assertions::assert_eq;
    use query_structure::{DatePart, FieldCompare};

    fn render<D: Visitor>(condition: Condition) -> Compiled<Predicate> {
        FilterVisitor::<D>::new(SkipPolicy::Lenient)
            .visit_condition(&condition)
            .map(|tree| tree.render(false))
    }

    fn rendered(sql: &str, params: Vec<QueryValue>) -> Compiled<Predicate> {
        Compiled::Rendered(Predicate::new(sql, params))
    }

    #[test]
    fn null_equality_becomes_a_null_check() {
        assert_eq!(
            rendered("deleted_at IS NULL", vec![]),
            render::<Sqlite>(Condition::new("deleted_at", Operator::Equals, QueryValue::Null))
        );
        assert_eq!(
            rendered("deleted_at IS NOT NULL", vec![]),
            render::<Sqlite>(Condition::new("deleted_at", Operator::NotEquals, QueryValue::Null))
        );
    }

    #[test]
    fn not_equals_uses_the_standard_operator() {
        assert_eq!(rendered("age <> ?", vec![3.into()]), render::<Mysql>("age".not_equals(3)));
    }

    #[test]
    fn empty_lists_are_asymmetric() {
        let empty: Vec<i64> = Vec::new();

        assert_eq!(rendered("1 = 0", vec![]), render::<Postgres>("id".is_in(empty.clone())));
        assert_eq!(Compiled::Vacuous, render::<Postgres>("id".not_in(empty)));
    }

    #[test]
    fn comma_separated_lists() {
        assert_eq!(
            rendered("status NOT IN (?, ?)", vec!["a".into(), "b".into()]),
            render::<Sqlite>(Condition::new("status", Operator::NotIn, " a, ,b "))
        );
    }

    #[test]
    fn between_arities() {
        assert_eq!(
            rendered("age BETWEEN ? AND ?", vec![18.into(), 65.into()]),
            render::<Sqlite>("age".between(vec![18, 65]))
        );
        assert_eq!(rendered("age = ?", vec![18.into()]), render::<Sqlite>("age".between(vec![18])));
        assert_eq!(
            Compiled::Skipped(SkipReason::BetweenArity(3)),
            render::<Sqlite>("age".between(vec![1, 2, 3]))
        );
    }

    #[test]
    fn like_patterns() {
        assert_eq!(
            rendered("name LIKE ?", vec!["%tom%".into()]),
            render::<Mysql>("name".text_contains("tom"))
        );
        assert_eq!(
            rendered(r"name ILIKE ? ESCAPE '\'", vec!["tom%".into()]),
            render::<Postgres>(Condition::new("name", Operator::InsensitiveStartsWith, "tom"))
        );
        assert_eq!(
            rendered(r"LOWER(name) LIKE LOWER(?) ESCAPE '\'", vec!["%tom".into()]),
            render::<Sqlite>(Condition::new("name", Operator::InsensitiveEndsWith, "tom"))
        );
        assert_eq!(
            rendered("name LIKE ?", vec!["tom".into()]),
            render::<ClickHouse>(Condition::new("name", Operator::Exact, "tom"))
        );
    }

    #[test]
    fn like_wildcards_in_values_match_literally() {
        assert_eq!(
            rendered(r"code LIKE ? ESCAPE '\'", vec![r"a\_c".into()]),
            render::<Sqlite>(Condition::new("code", Operator::Exact, "a_c"))
        );
        assert_eq!(
            rendered(r"rate LIKE ? ESCAPE '\'", vec![r"%100\%%".into()]),
            render::<Sqlite>("rate".text_contains("100%"))
        );
        assert_eq!(
            rendered("path LIKE ?", vec![r"C:\\tmp\_%".into()]),
            render::<Mysql>(Condition::new("path", Operator::StartsWith, r"C:\tmp_"))
        );
        assert_eq!(
            rendered("code LIKE ?", vec![r"%\_x".into()]),
            render::<ClickHouse>(Condition::new("code", Operator::EndsWith, "_x"))
        );
        assert_eq!(
            rendered(r"code ILIKE ? ESCAPE '\'", vec![r"%\%%".into()]),
            render::<Postgres>(Condition::new("code", Operator::InsensitiveContains, "%"))
        );
    }

    #[test]
    fn regular_expressions() {
        assert_eq!(
            rendered("name ~* ?", vec!["^to".into()]),
            render::<Postgres>(Condition::new("name", Operator::InsensitiveRegexp, "^to"))
        );
        assert_eq!(
            rendered("REGEXP_LIKE(name, ?, 'c')", vec!["^to".into()]),
            render::<Mysql>("name".regex_matches("^to"))
        );
        assert_eq!(
            rendered("match(name, ?)", vec!["(?i)^to".into()]),
            render::<ClickHouse>(Condition::new("name", Operator::InsensitiveRegexp, "^to"))
        );
    }

    #[test]
    fn full_text_search_falls_back_to_contains() {
        let search = || Condition::new("body", Operator::Search, "rust");

        assert_eq!(
            rendered("to_tsvector(body) @@ plainto_tsquery(?)", vec!["rust".into()]),
            render::<Postgres>(search())
        );
        assert_eq!(
            rendered("MATCH(body) AGAINST(? IN NATURAL LANGUAGE MODE)", vec!["rust".into()]),
            render::<Mysql>(search())
        );
        assert_eq!(
            rendered(r"body LIKE ? ESCAPE '\'", vec!["%rust%".into()]),
            render::<Sqlite>(search())
        );
        assert_eq!(
            rendered(r"body LIKE ? ESCAPE '\'", vec![r"%50\%%".into()]),
            render::<Sqlite>(Condition::new("body", Operator::Search, "50%"))
        );
    }

    #[test]
    fn date_parts_wrap_the_column() {
        assert_eq!(
            rendered("YEAR(created_at) = ?", vec![2020.into()]),
            render::<Mysql>(Condition::new("created_at", Operator::Equals, "2020").date_part(DatePart::Year))
        );
        assert_eq!(
            Compiled::Skipped(SkipReason::UnsupportedDatePart {
                part: DatePart::IsoYear,
                dialect: "SQLite"
            }),
            render::<Sqlite>("created_at".equals(2020).date_part(DatePart::IsoYear))
        );
    }

    #[test]
    fn nested_fields_are_extracted() {
        assert_eq!(
            rendered("json_extract(meta, '$.address.city') = ?", vec!["Berlin".into()]),
            render::<Sqlite>("meta.address.city".equals("Berlin"))
        );
        assert_eq!(
            rendered("meta->'address'->>'city' = ?", vec!["Berlin".into()]),
            render::<Postgres>("meta".equals("Berlin").json_path("$.address.city"))
        );
    }

    #[test]
    fn unsafe_fields_are_never_interpolated() {
        assert_eq!(
            Compiled::Skipped(SkipReason::InvalidField("name; DROP TABLE users".into())),
            render::<Mysql>("name; DROP TABLE users".equals(1))
        );
        assert_eq!(
            rendered("meta = ?", vec![1.into()]),
            render::<Mysql>("meta".equals(1).json_path("a'); DROP TABLE x; --"))
        );
    }

    #[test]
    fn unknown_operators_and_missing_values_are_skipped() {
        assert_eq!(
            Compiled::Skipped(SkipReason::UnknownOperator),
            render::<Sqlite>(Condition::new("a", Operator::Unspecified, 1))
        );
        assert_eq!(
            Compiled::Skipped(SkipReason::MissingValue),
            render::<Sqlite>(Condition::nullary("a", Operator::GreaterThan))
        );
    }

    #[test]
    fn strict_policy_aborts_the_walk() {
        let filter = FilterExpression::and(vec!["a".equals(1), Condition::new("b", Operator::Unspecified, 2)]);
        let err = FilterVisitor::<Sqlite>::new(SkipPolicy::Strict)
            .visit_filter(&filter)
            .unwrap_err();

        assert_eq!("b", err.field);
    }

    #[test]
    fn groups_without_parts_vanish() {
        let filter = FilterExpression::and(vec!["a".equals(1)])
            .with_group(FilterExpression::or(vec![Condition::new("b", Operator::Unspecified, 2)]));

        let tree = FilterVisitor::<Sqlite>::new(SkipPolicy::Lenient)
            .visit_filter(&filter)
            .unwrap();

        assert_eq!(vec![Predicate::new("a = ?", vec![1.into()])], tree.into_entries());
    }
}
