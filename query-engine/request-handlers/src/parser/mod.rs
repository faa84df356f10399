use crate::ParseError;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub(crate) struct RequestParser;

pub(crate) type Token<'a> = pest::iterators::Pair<'a, Rule>;

/// Parses `input` as a whole `rule` and returns its single top-level token.
pub(crate) fn parse_rule(rule: Rule, input: &str) -> Result<Token<'_>, pest::error::Error<Rule>> {
    let mut pairs = RequestParser::parse(rule, input)?;

    // A successful parse always yields the entry rule's pair.
    pairs.next().ok_or_else(|| {
        pest::error::Error::new_from_pos(
            pest::error::ErrorVariant::CustomError {
                message: "empty parse result".to_owned(),
            },
            pest::Position::from_start(input),
        )
    })
}

pub(crate) trait TokenExtensions<'a> {
    /// The children of a token, without keyword tokens.
    fn relevant_children(&self) -> Vec<Token<'a>>;

    fn has_child(&self, rule: Rule) -> bool;
}

impl<'a> TokenExtensions<'a> for Token<'a> {
    fn relevant_children(&self) -> Vec<Token<'a>> {
        self.clone()
            .into_inner()
            .filter(|token| {
                !matches!(
                    token.as_rule(),
                    Rule::kw_and
                        | Rule::kw_or
                        | Rule::kw_not
                        | Rule::kw_in
                        | Rule::kw_is
                        | Rule::kw_null
                        | Rule::kw_like
                        | Rule::kw_ilike
                        | Rule::kw_between
                        | Rule::EOI
                )
            })
            .collect()
    }

    fn has_child(&self, rule: Rule) -> bool {
        self.clone().into_inner().any(|token| token.as_rule() == rule)
    }
}

/// Unescapes the body of a quoted string literal.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

pub(crate) fn syntax_error(err: pest::error::Error<Rule>) -> String {
    err.renamed_rules(|rule| match rule {
        Rule::or_expr | Rule::and_expr => "expression".to_owned(),
        Rule::compare_op => "comparison operator".to_owned(),
        Rule::kw_and | Rule::kw_or => "AND/OR".to_owned(),
        Rule::order_item => "ordering".to_owned(),
        other => format!("{other:?}"),
    })
    .to_string()
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::invalid_expression(syntax_error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_quotes_and_controls() {
        assert_eq!("it's", unescape(r"it\'s"));
        assert_eq!("a\nb", unescape(r"a\nb"));
        assert_eq!(r"a\", unescape(r"a\"));
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert!(RequestParser::parse(Rule::identifier, "and").is_err());
        assert!(parse_rule(Rule::filter, "index = 1").is_ok());
        assert!(parse_rule(Rule::filter, "is_active = true").is_ok());
        assert!(parse_rule(Rule::filter, "nullable IS NOT NULL").is_ok());
    }
}
