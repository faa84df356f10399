//! Textual orderings. All of `-created_at`, `created_at:desc`,
//! `created_at.desc` and `created_at desc` read as a descending sort; a bare
//! field or `+field` is ascending.

use crate::{
    parser::{parse_rule, syntax_error, Rule, Token, TokenExtensions},
    ParseError,
};
use query_structure::{OrderBy, SortOrder};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonEntry {
    Text(String),
    Structured(OrderBy),
}

/// A JSON array when the input starts with `[`, the infix grammar otherwise.
pub fn parse(input: &str) -> crate::Result<Vec<OrderBy>> {
    if input.trim_start().starts_with('[') {
        parse_json(input)
    } else {
        parse_grammar(input)
    }
}

/// `["-created_at", "name", {"field": "id", "sort_order": "ASC"}]`
pub fn parse_json(input: &str) -> crate::Result<Vec<OrderBy>> {
    let entries: Vec<JsonEntry> = serde_json::from_str(input).map_err(ParseError::invalid_order_by)?;

    entries
        .into_iter()
        .map(|entry| match entry {
            JsonEntry::Text(text) => parse_entry(&text),
            JsonEntry::Structured(order_by) => Ok(order_by),
        })
        .collect()
}

/// `created_at desc, -priority, name`
pub fn parse_grammar(input: &str) -> crate::Result<Vec<OrderBy>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let token = parse_rule(Rule::order_by, input).map_err(|err| ParseError::invalid_order_by(syntax_error(err)))?;

    token
        .relevant_children()
        .iter()
        .filter(|child| child.as_rule() == Rule::order_item)
        .map(order_item)
        .collect()
}

/// A single entry, `-created_at` or `created_at:desc`.
pub fn parse_entry(entry: &str) -> crate::Result<OrderBy> {
    let token = parse_rule(Rule::order_entry, entry).map_err(|err| ParseError::invalid_order_by(syntax_error(err)))?;

    let item = token
        .relevant_children()
        .into_iter()
        .find(|child| child.as_rule() == Rule::order_item)
        .ok_or_else(|| ParseError::invalid_order_by(format!("`{entry}` names no field")))?;

    order_item(&item)
}

fn order_item(token: &Token<'_>) -> crate::Result<OrderBy> {
    let mut sign = None;
    let mut field = None;
    let mut direction = None;

    for child in token.relevant_children() {
        match child.as_rule() {
            Rule::sign if child.as_str() == "-" => sign = Some(SortOrder::Descending),
            Rule::sign => sign = Some(SortOrder::Ascending),
            Rule::field_path => field = Some(child.as_str()),
            Rule::direction => direction = SortOrder::from_keyword(child.as_str()),
            _ => (),
        }
    }

    let field = field.ok_or_else(|| ParseError::invalid_order_by(format!("`{}` names no field", token.as_str())))?;

    // `field.desc` reads as a direction suffix, not a path segment.
    let (field, suffix) = match field.rsplit_once('.') {
        Some((head, tail)) if !head.is_empty() => match SortOrder::from_keyword(tail) {
            Some(order) => (head, Some(order)),
            None => (field, None),
        },
        _ => (field, None),
    };

    let sort_order = direction.or(suffix).or(sign).unwrap_or_default();

    Ok(OrderBy::new(field, sort_order))
}
