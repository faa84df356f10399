//! Rendering tables of the supported SQL dialects.
//!
//! Predicates are accumulated with `?` placeholders and unquoted, allow-listed
//! identifiers. A visitor turns the accumulated [`Select`] into the final text
//! of its dialect.

mod clickhouse;
mod mysql;
mod postgres;
mod sqlite;

pub use clickhouse::ClickHouse;
pub use mysql::Mysql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use crate::Select;
use itertools::Itertools;
use query_structure::{ensure_identifier, DatePart, FieldRef, InvariantViolation, Params, QueryValue, SkipReason};
use tracing::debug;

/// A dialect of SQL.
pub trait Visitor: Sized {
    /// Name of the dialect in logs and skip reasons.
    const NAME: &'static str;
    /// The parameter placeholder predicates are accumulated with.
    const C_PARAM: &'static str = "?";
    /// Character quoting an identifier.
    const C_QUOTE: &'static str;
    /// Appended to every `LIKE`. Patterns escape `%`, `_` and `\` with a
    /// backslash.
    const C_LIKE_ESCAPE: &'static str = " ESCAPE '\\'";

    /// Renders the final query text and collects the parameters in the order
    /// their placeholders appear.
    fn build(select: &Select<Self>) -> Result<(String, Vec<QueryValue>), InvariantViolation> {
        let sql = Self::substitute_parameters(Self::visit_select(select)?);
        let params = select.parameters();

        debug!(
            target: "sql_query_connector::query",
            dialect = Self::NAME,
            "query: \"{}\", params: {}",
            sql,
            Params(&params)
        );

        Ok((sql, params))
    }

    fn quote_identifier(ident: &str) -> String {
        ident
            .split('.')
            .map(|part| format!("{}{}{}", Self::C_QUOTE, part, Self::C_QUOTE))
            .join(".")
    }

    /// Extraction of a value nested in a JSON column, as text.
    fn visit_json_extract(column: &str, path: &[String]) -> String;

    fn visit_date_part(expr: &str, part: DatePart) -> Result<String, SkipReason>;

    /// A regular expression match of `expr` against one bound pattern.
    fn visit_regex(expr: &str, pattern: String, insensitive: bool) -> (String, QueryValue);

    /// Case insensitive `LIKE` against one bound pattern.
    fn visit_insensitive_like(expr: &str) -> String {
        format!("LOWER({expr}) LIKE LOWER({}){}", Self::C_PARAM, Self::C_LIKE_ESCAPE)
    }

    /// Native full text search, if the dialect has one wired.
    fn visit_search(_expr: &str) -> Option<String> {
        None
    }

    /// Rewrites the accumulated `?` placeholders into the dialect's form.
    fn substitute_parameters(sql: String) -> String {
        sql
    }

    fn visit_field(field: &FieldRef) -> String {
        if field.is_nested() {
            Self::visit_json_extract(&field.column, &field.path)
        } else {
            field.column.clone()
        }
    }

    fn visit_columns(columns: &[String]) -> Result<String, InvariantViolation> {
        let mut rendered = Vec::with_capacity(columns.len());

        for column in columns {
            let field = FieldRef::resolve(column, None)
                .map_err(|_| InvariantViolation::UnsafeIdentifier(column.to_owned()))?;

            if field.is_nested() {
                rendered.push(format!(
                    "{} AS {}",
                    Self::visit_field(&field),
                    Self::quote_identifier(&field.dotted().replace('.', "_"))
                ));
            } else {
                rendered.push(field.column);
            }
        }

        Ok(rendered.join(", "))
    }

    fn visit_limit_and_offset(limit: Option<i64>, offset: Option<i64>) -> Option<String> {
        match (limit, offset) {
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            (None, Some(offset)) => Some(format!("OFFSET {offset}")),
            (None, None) => None,
        }
    }

    fn visit_select(select: &Select<Self>) -> Result<String, InvariantViolation> {
        let mut result = vec![String::from("SELECT")];

        if select.columns.is_empty() {
            result.push(String::from("*"));
        } else {
            result.push(Self::visit_columns(&select.columns)?);
        }

        result.push(format!("FROM {}", ensure_identifier(&select.table)?));

        if select.is_final {
            result.push(String::from("FINAL"));
        }

        if let Some(ratio) = select.sample {
            if !ratio.is_finite() {
                return Err(InvariantViolation::NonFiniteNumber(ratio.to_string()));
            }

            result.push(format!("SAMPLE {ratio}"));
        }

        if !select.prewhere.is_empty() {
            result.push(format!("PREWHERE {}", select.prewhere.join(" AND ")));
        }

        if !select.conditions.is_empty() {
            result.push(format!("WHERE {}", select.conditions.join(" AND ")));
        }

        if !select.group_by.is_empty() {
            let columns: Vec<&str> = select
                .group_by
                .iter()
                .map(|column| ensure_identifier(column))
                .collect::<Result<_, _>>()?;

            result.push(format!("GROUP BY {}", columns.join(", ")));
        }

        if !select.ordering.is_empty() {
            result.push(format!("ORDER BY {}", select.ordering.join(", ")));
        }

        if let Some((limit, columns)) = &select.limit_by {
            let columns: Vec<&str> = columns
                .iter()
                .map(|column| ensure_identifier(column))
                .collect::<Result<_, _>>()?;

            result.push(format!("LIMIT {} BY {}", limit, columns.join(", ")));
        }

        if let Some(limit_and_offset) = Self::visit_limit_and_offset(select.limit, select.offset) {
            result.push(limit_and_offset);
        }

        Ok(result.join(" "))
    }
}

/// `$.a.b[0]`, the path syntax of MySQL and SQLite JSON functions.
pub(crate) fn json_path(path: &[String]) -> String {
    let mut rendered = String::from("$");

    for segment in path {
        if is_index(segment) {
            rendered.push_str(&format!("[{segment}]"));
        } else {
            rendered.push('.');
            rendered.push_str(segment);
        }
    }

    rendered
}

pub(crate) fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

/// Counts `?` placeholders outside of quoted literals.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut in_literal = false;
    let mut count = 0;

    for c in sql.chars() {
        match c {
            '\'' => in_literal = !in_literal,
            '?' if !in_literal => count += 1,
            _ => (),
        }
    }

    count
}

/// Replaces every `?` outside of quoted literals with `{prefix}{n}`,
/// numbering from one.
pub(crate) fn number_placeholders(sql: &str, prefix: &str) -> String {
    let mut in_literal = false;
    let mut n = 0;
    let mut out = String::with_capacity(sql.len() + 8);

    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                n += 1;
                out.push_str(prefix);
                out.push_str(&n.to_string());
            }
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sqlite;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn build_logs_the_query() {
        let mut select = Select::<Sqlite>::from_table("users");
        select.so_that_raw("name = ?", vec!["tom".into()]).unwrap();
        select.build().unwrap();

        assert!(logs_contain(r#"query: "SELECT * FROM users WHERE name = ?", params: ["tom"]"#));
    }

    #[test]
    fn json_paths_index_numeric_segments() {
        assert_eq!("$.tags[0].name", json_path(&["tags".into(), "0".into(), "name".into()]));
    }

    #[test]
    fn placeholders_in_literals_are_ignored() {
        assert_eq!(2, count_placeholders("a = ? AND b = '?' AND c = ?"));
        assert_eq!(
            "a = $1 AND b = '?' AND c = $2",
            number_placeholders("a = ? AND b = '?' AND c = ?", "$")
        );
    }
}
