use super::{is_index, number_placeholders, Visitor};
use query_structure::{DatePart, QueryValue, SkipReason};

/// A visitor to generate queries for the PostgreSQL database.
///
/// Parameters are numbered `$1..$n` in the order they appear.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl Visitor for Postgres {
    const NAME: &'static str = "PostgreSQL";
    const C_QUOTE: &'static str = "\"";

    fn visit_json_extract(column: &str, path: &[String]) -> String {
        let mut rendered = column.to_owned();

        for (i, segment) in path.iter().enumerate() {
            let arrow = if i + 1 == path.len() { "->>" } else { "->" };

            if is_index(segment) {
                rendered.push_str(&format!("{arrow}{segment}"));
            } else {
                rendered.push_str(&format!("{arrow}'{segment}'"));
            }
        }

        rendered
    }

    fn visit_date_part(expr: &str, part: DatePart) -> Result<String, SkipReason> {
        let field = match part {
            DatePart::Year => "YEAR",
            DatePart::IsoYear => "ISOYEAR",
            DatePart::Quarter => "QUARTER",
            DatePart::Month => "MONTH",
            DatePart::Week => "WEEK",
            DatePart::WeekDay => return Ok(format!("EXTRACT(DOW FROM {expr}) + 1")),
            DatePart::IsoWeekDay => "ISODOW",
            DatePart::Day => "DAY",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
            DatePart::Date => return Ok(format!("CAST({expr} AS DATE)")),
            DatePart::Time => return Ok(format!("CAST({expr} AS TIME)")),
        };

        Ok(format!("EXTRACT({field} FROM {expr})"))
    }

    fn visit_regex(expr: &str, pattern: String, insensitive: bool) -> (String, QueryValue) {
        let op = if insensitive { "~*" } else { "~" };
        (format!("{expr} {op} {}", Self::C_PARAM), QueryValue::String(pattern))
    }

    fn visit_insensitive_like(expr: &str) -> String {
        format!("{expr} ILIKE {}{}", Self::C_PARAM, Self::C_LIKE_ESCAPE)
    }

    fn visit_search(expr: &str) -> Option<String> {
        Some(format!("to_tsvector({expr}) @@ plainto_tsquery({})", Self::C_PARAM))
    }

    fn substitute_parameters(sql: String) -> String {
        number_placeholders(&sql, "$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extraction_ends_in_a_text_arrow() {
        let path = vec!["address".to_string(), "0".to_string(), "city".to_string()];
        assert_eq!("meta->'address'->0->>'city'", Postgres::visit_json_extract("meta", &path));
    }

    #[test]
    fn date_parts() {
        assert_eq!(Ok("EXTRACT(ISOYEAR FROM ts)".into()), Postgres::visit_date_part("ts", DatePart::IsoYear));
        assert_eq!(Ok("CAST(ts AS DATE)".into()), Postgres::visit_date_part("ts", DatePart::Date));
    }
}
