use super::{json_path, Visitor};
use query_structure::{DatePart, QueryValue, SkipReason};

/// A visitor to generate queries for the MySQL database.
#[derive(Debug, Clone, Copy)]
pub struct Mysql;

impl Visitor for Mysql {
    const NAME: &'static str = "MySQL";
    const C_QUOTE: &'static str = "`";
    // Backslash is the default LIKE escape.
    const C_LIKE_ESCAPE: &'static str = "";

    fn visit_json_extract(column: &str, path: &[String]) -> String {
        format!("JSON_UNQUOTE(JSON_EXTRACT({column}, '{}'))", json_path(path))
    }

    fn visit_date_part(expr: &str, part: DatePart) -> Result<String, SkipReason> {
        let rendered = match part {
            DatePart::Year => format!("YEAR({expr})"),
            DatePart::IsoYear => format!("FLOOR(YEARWEEK({expr}, 3) / 100)"),
            DatePart::Quarter => format!("QUARTER({expr})"),
            DatePart::Month => format!("MONTH({expr})"),
            DatePart::Week => format!("WEEK({expr}, 3)"),
            DatePart::WeekDay => format!("DAYOFWEEK({expr})"),
            DatePart::IsoWeekDay => format!("WEEKDAY({expr}) + 1"),
            DatePart::Day => format!("DAY({expr})"),
            DatePart::Hour => format!("HOUR({expr})"),
            DatePart::Minute => format!("MINUTE({expr})"),
            DatePart::Second => format!("SECOND({expr})"),
            DatePart::Date => format!("DATE({expr})"),
            DatePart::Time => format!("TIME({expr})"),
        };

        Ok(rendered)
    }

    fn visit_regex(expr: &str, pattern: String, insensitive: bool) -> (String, QueryValue) {
        let match_type = if insensitive { "i" } else { "c" };

        (
            format!("REGEXP_LIKE({expr}, {}, '{match_type}')", Self::C_PARAM),
            QueryValue::String(pattern),
        )
    }

    fn visit_search(expr: &str) -> Option<String> {
        Some(format!("MATCH({expr}) AGAINST({} IN NATURAL LANGUAGE MODE)", Self::C_PARAM))
    }

    // MySQL has no OFFSET without LIMIT.
    fn visit_limit_and_offset(limit: Option<i64>, offset: Option<i64>) -> Option<String> {
        match (limit, offset) {
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            (None, Some(offset)) => Some(format!("LIMIT {} OFFSET {offset}", i64::MAX)),
            (None, None) => None,
        }
    }
}
