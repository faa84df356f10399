use query_structure::QueryValue;

/// `'it\'s'`
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Identifiers are double quoted whole, dots included.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\\\""))
}

/// The literal form of a value. Nulls compare as the empty string, lists
/// fall back to their JSON text.
pub fn render_literal(value: &QueryValue) -> String {
    match value {
        QueryValue::Null => String::from("''"),
        QueryValue::Boolean(b) => b.to_string(),
        QueryValue::Int(i) => i.to_string(),
        QueryValue::Float(f) => format!("{f:?}"),
        QueryValue::String(s) => quote_string(s),
        QueryValue::List(_) => quote_string(&value.to_text()),
    }
}

/// `/pattern/`. A slash not already escaped by an odd run of backslashes
/// gets escaped. `None` when the pattern ends in a lone backslash, which
/// would escape the closing delimiter.
pub(crate) fn regex_literal(pattern: &str) -> Option<String> {
    let mut literal = String::with_capacity(pattern.len() + 2);
    let mut backslashes = 0;

    literal.push('/');

    for c in pattern.chars() {
        match c {
            '\\' => backslashes += 1,
            '/' if backslashes % 2 == 0 => {
                literal.push('\\');
                backslashes = 0;
            }
            _ => backslashes = 0,
        }

        literal.push(c);
    }

    if backslashes % 2 == 1 {
        return None;
    }

    literal.push('/');

    Some(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_escaped() {
        assert_eq!(r"'it\'s \\ here'", quote_string(r"it's \ here"));
    }

    #[test]
    fn literals() {
        assert_eq!("1.0", render_literal(&QueryValue::Float(1.0)));
        assert_eq!("42", render_literal(&QueryValue::Int(42)));
        assert_eq!("true", render_literal(&QueryValue::Boolean(true)));
        assert_eq!("''", render_literal(&QueryValue::Null));
    }

    #[test]
    fn regex_slashes() {
        assert_eq!(Some(r"/a\/b/".to_string()), regex_literal("a/b"));
        assert_eq!(Some(r"/a\/b/".to_string()), regex_literal(r"a\/b"));
        assert_eq!(Some(r"/a\\\/b/".to_string()), regex_literal(r"a\\/b"));
    }

    #[test]
    fn regex_literals_cannot_be_closed_early() {
        assert_eq!(
            Some(r#"/x\/ OR "password" =~ \/.*/"#.to_string()),
            regex_literal(r#"x\/ OR "password" =~ /.*"#)
        );
        assert_eq!(
            Some(r"/x\/; DROP MEASUREMENT cpu --/".to_string()),
            regex_literal(r"x\/; DROP MEASUREMENT cpu --")
        );
        assert_eq!(None, regex_literal(r"abc\"));
        assert_eq!(Some(r"/abc\\/".to_string()), regex_literal(r"abc\\"));
    }
}
