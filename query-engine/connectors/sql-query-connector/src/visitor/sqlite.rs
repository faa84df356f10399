use super::{json_path, Visitor};
use query_structure::{DatePart, QueryValue, SkipReason};

/// A visitor to generate queries for the SQLite database.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl Visitor for Sqlite {
    const NAME: &'static str = "SQLite";
    const C_QUOTE: &'static str = "`";

    fn visit_json_extract(column: &str, path: &[String]) -> String {
        format!("json_extract({column}, '{}')", json_path(path))
    }

    fn visit_date_part(expr: &str, part: DatePart) -> Result<String, SkipReason> {
        let strftime = |format: &str| format!("CAST(strftime('{format}', {expr}) AS INTEGER)");

        let rendered = match part {
            DatePart::Year => strftime("%Y"),
            DatePart::IsoYear => {
                return Err(SkipReason::UnsupportedDatePart {
                    part,
                    dialect: Self::NAME,
                })
            }
            DatePart::Quarter => format!("({} + 2) / 3", strftime("%m")),
            DatePart::Month => strftime("%m"),
            DatePart::Week => strftime("%W"),
            DatePart::WeekDay => format!("{} + 1", strftime("%w")),
            DatePart::IsoWeekDay => format!("({} + 6) % 7 + 1", strftime("%w")),
            DatePart::Day => strftime("%d"),
            DatePart::Hour => strftime("%H"),
            DatePart::Minute => strftime("%M"),
            DatePart::Second => strftime("%S"),
            DatePart::Date => format!("date({expr})"),
            DatePart::Time => format!("time({expr})"),
        };

        Ok(rendered)
    }

    fn visit_regex(expr: &str, pattern: String, insensitive: bool) -> (String, QueryValue) {
        let pattern = if insensitive { format!("(?i){pattern}") } else { pattern };
        (format!("{expr} REGEXP {}", Self::C_PARAM), QueryValue::String(pattern))
    }

    fn visit_limit_and_offset(limit: Option<i64>, offset: Option<i64>) -> Option<String> {
        match (limit, offset) {
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            (None, Some(offset)) => Some(format!("LIMIT -1 OFFSET {offset}")),
            (None, None) => None,
        }
    }
}
