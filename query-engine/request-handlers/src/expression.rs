//! Infix filter expressions, e.g. `name = 'tom' AND (age > 18 OR vip = true)`.
//!
//! The text is first parsed into an [`Expr`] tree of calls, identifiers,
//! selections and literals. Walking that tree yields the canonical filter:
//! boolean calls become AND/OR groups, comparison calls become conditions.

use crate::{
    parser::{parse_rule, unescape, Rule, Token, TokenExtensions},
    ParseError,
};
use itertools::Itertools;
use query_structure::{Arity, Condition, DatePart, FilterExpression, FilterType, Operator};
use query_value::QueryValue;
use std::fmt;

/// The intermediate expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Boolean connectives, comparisons and function calls alike.
    Call { name: String, args: Vec<Expr> },
    Ident(String),
    /// A dotted selection, `meta.address.city`.
    Select(Vec<String>),
    Literal(QueryValue),
}

impl Expr {
    fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    fn boolean_kind(&self) -> Option<FilterType> {
        match self {
            Expr::Call { name, .. } => match name.to_ascii_lowercase().as_str() {
                "and" | "&&" => Some(FilterType::And),
                "or" | "||" => Some(FilterType::Or),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Call { name, args } => write!(f, "{}({})", name, args.iter().join(", ")),
            Expr::Ident(ident) => f.write_str(ident),
            Expr::Select(path) => f.write_str(&path.join(".")),
            Expr::Literal(QueryValue::String(s)) => write!(f, "{s:?}"),
            Expr::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// Parses an infix expression into the canonical filter. Blank input is an
/// empty filter.
pub fn parse(input: &str) -> crate::Result<FilterExpression> {
    if input.trim().is_empty() {
        return Ok(FilterExpression::default());
    }

    into_filter(parse_tree(input)?)
}

/// Parses an infix expression into the intermediate tree.
pub fn parse_tree(input: &str) -> crate::Result<Expr> {
    let filter = parse_rule(Rule::filter, input)?;

    let root = filter
        .relevant_children()
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::invalid_expression("the expression is empty"))?;

    build_expr(&root)
}

/// Turns an expression tree into the canonical filter.
pub fn into_filter(expr: Expr) -> crate::Result<FilterExpression> {
    match expr.boolean_kind() {
        Some(kind) => group(kind, expr),
        None => Ok(FilterExpression::and(vec![condition(expr)?])),
    }
}

fn group(kind: FilterType, expr: Expr) -> crate::Result<FilterExpression> {
    let mut node = FilterExpression {
        kind,
        ..Default::default()
    };

    push_into(&mut node, expr)?;

    Ok(node)
}

/// Adds `expr` to `node`, flattening chains of the node's own connective.
fn push_into(node: &mut FilterExpression, expr: Expr) -> crate::Result<()> {
    match expr.boolean_kind() {
        Some(kind) if kind == node.kind => {
            if let Expr::Call { args, .. } = expr {
                for arg in args {
                    push_into(node, arg)?;
                }
            }
        }
        Some(kind) => node.push_group(group(kind, expr)?),
        None => node.push_condition(condition(expr)?),
    }

    Ok(())
}

fn condition(expr: Expr) -> crate::Result<Condition> {
    let (name, args) = match expr {
        Expr::Call { name, args } => (name, args),
        other => {
            return Err(ParseError::unsupported(format!(
                "`{other}` is not a condition, expected a comparison"
            )))
        }
    };

    let op = Operator::from_alias(&name);

    if !op.is_specified() {
        return Err(ParseError::unsupported(format!("unknown operator `{name}`")));
    }

    let mut args = args.into_iter();

    let lhs = args
        .next()
        .ok_or_else(|| ParseError::unsupported(format!("`{name}` needs a field to compare")))?;

    let mut condition = field_reference(lhs, op)?;

    let values: Vec<QueryValue> = args
        .map(|arg| match arg {
            Expr::Literal(value) => Ok(value),
            other => Err(ParseError::unsupported(format!(
                "right side of {op} must be a constant, got `{other}`"
            ))),
        })
        .collect::<crate::Result<_>>()?;

    match op.arity() {
        Arity::Nullary => (),
        Arity::Single => {
            let mut values = values.into_iter();

            let value = values
                .next()
                .ok_or_else(|| ParseError::unsupported(format!("{op} on `{}` needs a value", condition.field)))?;

            condition.value = Some(value);
        }
        Arity::List | Arity::Range => condition.values = values,
    }

    Ok(condition)
}

/// The left side of a comparison: a field, a dotted selection, or a date part
/// call wrapping either.
fn field_reference(expr: Expr, op: Operator) -> crate::Result<Condition> {
    match expr {
        Expr::Ident(field) => Ok(Condition::nullary(field, op)),
        Expr::Select(mut path) => {
            let field = path.remove(0);
            Ok(Condition::nullary(field, op).json_path(path.join(".")))
        }
        Expr::Call { name, mut args } if args.len() == 1 => match DatePart::from_alias(&name) {
            Some(part) => {
                let inner = field_reference(args.remove(0), op)?;

                if inner.date_part.is_some() {
                    return Err(ParseError::unsupported("date parts cannot be nested"));
                }

                Ok(inner.date_part(part))
            }
            None => Err(ParseError::unsupported(format!("`{name}` is not a date part"))),
        },
        other => Err(ParseError::unsupported(format!(
            "left side of {op} must be a field reference, got `{other}`"
        ))),
    }
}

fn build_expr(token: &Token<'_>) -> crate::Result<Expr> {
    let children = token.relevant_children();

    match token.as_rule() {
        Rule::or_expr | Rule::and_expr => {
            let name = if token.as_rule() == Rule::or_expr { "or" } else { "and" };
            let mut args = children.iter().map(build_expr).collect::<crate::Result<Vec<_>>>()?;

            if args.len() == 1 {
                Ok(args.remove(0))
            } else {
                Ok(Expr::call(name, args))
            }
        }
        Rule::call | Rule::operand_call => {
            let (name, rest) = split_first(token, &children)?;
            let args = rest.iter().map(build_expr).collect::<crate::Result<Vec<_>>>()?;

            Ok(Expr::call(name.as_str(), args))
        }
        Rule::comparison => {
            let [lhs, op, rhs] = three(token, &children)?;
            let name = match op.as_str() {
                "=" | "==" => "eq",
                "!=" | "<>" => "neq",
                other => other,
            };

            Ok(Expr::call(name, vec![build_expr(lhs)?, build_expr(rhs)?]))
        }
        Rule::like_check => {
            let [lhs, op, rhs] = three(token, &children)?;
            let insensitive = op.has_child(Rule::kw_ilike);

            Ok(like(build_expr(lhs)?, build_expr(rhs)?, insensitive))
        }
        Rule::null_check => {
            let (lhs, _) = split_first(token, &children)?;
            let name = if token.has_child(Rule::negation) { "isnotnull" } else { "isnull" };

            Ok(Expr::call(name, vec![build_expr(lhs)?]))
        }
        Rule::between_check => {
            let [lhs, low, high] = three(token, &children)?;

            Ok(Expr::call(
                "between",
                vec![build_expr(lhs)?, build_expr(low)?, build_expr(high)?],
            ))
        }
        Rule::in_check => {
            let (lhs, rest) = split_first(token, &children)?;
            let name = if token.has_child(Rule::negation) { "nin" } else { "in" };

            let mut args = vec![build_expr(lhs)?];

            for item in rest.iter().filter(|t| t.as_rule() != Rule::negation) {
                args.push(build_expr(item)?);
            }

            Ok(Expr::call(name, args))
        }
        Rule::identifier => Ok(Expr::Ident(token.as_str().to_owned())),
        Rule::select => Ok(Expr::Select(children.iter().map(|t| t.as_str().to_owned()).collect())),
        Rule::literal => literal(token),
        rule => Err(ParseError::invalid_expression(format!(
            "unexpected {rule:?} at `{}`",
            token.as_str()
        ))),
    }
}

/// `x LIKE 'abc%'` keeps SQL semantics: the position of `%` picks the
/// pattern operator, no `%` at all means an exact match.
fn like(lhs: Expr, rhs: Expr, insensitive: bool) -> Expr {
    let pattern = match &rhs {
        Expr::Literal(QueryValue::String(s)) => s.clone(),
        _ => return Expr::call(if insensitive { "ilike" } else { "like" }, vec![lhs, rhs]),
    };

    let leading = pattern.starts_with('%');
    let trailing = pattern.len() > 1 && pattern.ends_with('%');
    let trimmed = pattern.trim_start_matches('%').trim_end_matches('%').to_owned();

    let op = match (leading, trailing, insensitive) {
        (true, true, false) => Operator::Contains,
        (true, true, true) => Operator::InsensitiveContains,
        (false, true, false) => Operator::StartsWith,
        (false, true, true) => Operator::InsensitiveStartsWith,
        (true, false, false) => Operator::EndsWith,
        (true, false, true) => Operator::InsensitiveEndsWith,
        (false, false, false) => Operator::Exact,
        (false, false, true) => Operator::InsensitiveExact,
    };

    Expr::call(op.as_str(), vec![lhs, Expr::Literal(QueryValue::String(trimmed))])
}

fn literal(token: &Token<'_>) -> crate::Result<Expr> {
    let inner = token
        .relevant_children()
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::invalid_expression("empty literal"))?;

    let text = inner.as_str();

    let value = match inner.as_rule() {
        Rule::integer => text
            .parse::<i64>()
            .map(QueryValue::Int)
            .map_err(|err| ParseError::invalid_expression(format!("`{text}`: {err}")))?,
        Rule::float => text
            .parse::<f64>()
            .map(QueryValue::Float)
            .map_err(|err| ParseError::invalid_expression(format!("`{text}`: {err}")))?,
        Rule::boolean => QueryValue::Boolean(text.eq_ignore_ascii_case("true")),
        Rule::null => QueryValue::Null,
        Rule::string => {
            let body = inner.into_inner().next().map(|t| t.as_str()).unwrap_or_default();
            QueryValue::String(unescape(body))
        }
        rule => return Err(ParseError::invalid_expression(format!("unexpected literal {rule:?}"))),
    };

    Ok(Expr::Literal(value))
}

fn split_first<'a, 't>(token: &Token<'_>, children: &'a [Token<'t>]) -> crate::Result<(&'a Token<'t>, &'a [Token<'t>])> {
    children
        .split_first()
        .ok_or_else(|| ParseError::invalid_expression(format!("incomplete `{}`", token.as_str())))
}

fn three<'a, 't>(token: &Token<'_>, children: &'a [Token<'t>]) -> crate::Result<[&'a Token<'t>; 3]> {
    match children {
        [a, b, c] => Ok([a, b, c]),
        _ => Err(ParseError::invalid_expression(format!(
            "incomplete `{}`",
            token.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use query_structure::FieldCompare;

    #[test]
    fn builds_call_tree() {
        let tree = parse_tree("a = 1 AND (b > 2 OR c.d IS NOT NULL)").unwrap();

        assert_eq!(
            r#"and(eq(a, 1), or(>(b, 2), isnotnull(c.d)))"#,
            tree.to_string()
        );
    }

    #[test]
    fn like_follows_percent_placement() {
        let filter = parse("a LIKE '%x%' AND b ILIKE 'x%' AND c LIKE '%x' AND d LIKE 'x'").unwrap();

        let expected = FilterExpression::and(vec![
            "a".text_contains("x"),
            Condition::new("b", Operator::InsensitiveStartsWith, "x"),
            "c".text_ends_with("x"),
            Condition::new("d", Operator::Exact, "x"),
        ]);

        assert_eq!(expected, filter);
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse("   ").unwrap().is_empty());
    }
}
