use super::{is_index, Visitor};
use query_structure::{DatePart, QueryValue, SkipReason};

/// A visitor to generate queries for ClickHouse.
///
/// `SAMPLE`, `FINAL`, `PREWHERE` and `LIMIT n BY` are only reachable through
/// a `Select<ClickHouse>`.
#[derive(Debug, Clone, Copy)]
pub struct ClickHouse;

impl Visitor for ClickHouse {
    const NAME: &'static str = "ClickHouse";
    const C_QUOTE: &'static str = "`";
    // No ESCAPE clause, backslash always escapes.
    const C_LIKE_ESCAPE: &'static str = "";

    fn visit_json_extract(column: &str, path: &[String]) -> String {
        let mut args = vec![column.to_owned()];

        for segment in path {
            // JSON arrays are indexed from one.
            match segment.parse::<u64>() {
                Ok(index) if is_index(segment) => args.push((index + 1).to_string()),
                _ => args.push(format!("'{segment}'")),
            }
        }

        format!("JSONExtractString({})", args.join(", "))
    }

    fn visit_date_part(expr: &str, part: DatePart) -> Result<String, SkipReason> {
        let rendered = match part {
            DatePart::Year => format!("toYear({expr})"),
            DatePart::IsoYear => format!("toISOYear({expr})"),
            DatePart::Quarter => format!("toQuarter({expr})"),
            DatePart::Month => format!("toMonth({expr})"),
            DatePart::Week => format!("toISOWeek({expr})"),
            DatePart::WeekDay => format!("toDayOfWeek({expr}, 3)"),
            DatePart::IsoWeekDay => format!("toDayOfWeek({expr})"),
            DatePart::Day => format!("toDayOfMonth({expr})"),
            DatePart::Hour => format!("toHour({expr})"),
            DatePart::Minute => format!("toMinute({expr})"),
            DatePart::Second => format!("toSecond({expr})"),
            DatePart::Date => format!("toDate({expr})"),
            DatePart::Time => format!("formatDateTime({expr}, '%H:%M:%S')"),
        };

        Ok(rendered)
    }

    fn visit_regex(expr: &str, pattern: String, insensitive: bool) -> (String, QueryValue) {
        let pattern = if insensitive { format!("(?i){pattern}") } else { pattern };
        (format!("match({expr}, {})", Self::C_PARAM), QueryValue::String(pattern))
    }

    fn visit_insensitive_like(expr: &str) -> String {
        format!("{expr} ILIKE {}", Self::C_PARAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_indexes_are_one_based() {
        let path = vec!["tags".to_string(), "0".to_string()];
        assert_eq!("JSONExtractString(meta, 'tags', 1)", ClickHouse::visit_json_extract("meta", &path));
    }
}
