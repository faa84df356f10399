use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, convert::TryFrom, fmt};

/// A component extracted from a date/time column before comparing it.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DatePart {
    Year,
    IsoYear,
    Quarter,
    Month,
    Week,
    WeekDay,
    IsoWeekDay,
    Day,
    Hour,
    Minute,
    Second,
    Date,
    Time,
}

static DATE_PART_ALIASES: Lazy<HashMap<&'static str, DatePart>> = Lazy::new(|| {
    use DatePart::*;

    let table: &[(&[&'static str], DatePart)] = &[
        (&["year", "yr"], Year),
        (&["iso_year", "isoyear"], IsoYear),
        (&["quarter", "qtr"], Quarter),
        (&["month", "mon"], Month),
        (&["week", "wk"], Week),
        (&["week_day", "weekday", "dow"], WeekDay),
        (&["iso_week_day", "iso_weekday", "isodow"], IsoWeekDay),
        (&["day", "dd"], Day),
        (&["hour", "hr"], Hour),
        (&["minute", "min"], Minute),
        (&["second", "sec"], Second),
        (&["date"], Date),
        (&["time"], Time),
    ];

    table
        .iter()
        .flat_map(|(names, part)| names.iter().map(move |name| (*name, *part)))
        .collect()
});

impl DatePart {
    pub fn from_alias(alias: &str) -> Option<DatePart> {
        DATE_PART_ALIASES.get(alias.trim().to_ascii_lowercase().as_str()).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatePart::Year => "year",
            DatePart::IsoYear => "iso_year",
            DatePart::Quarter => "quarter",
            DatePart::Month => "month",
            DatePart::Week => "week",
            DatePart::WeekDay => "week_day",
            DatePart::IsoWeekDay => "iso_week_day",
            DatePart::Day => "day",
            DatePart::Hour => "hour",
            DatePart::Minute => "minute",
            DatePart::Second => "second",
            DatePart::Date => "date",
            DatePart::Time => "time",
        }
    }

    /// `Date` and `Time` extract textual values, every other part a number.
    pub fn is_numeric(self) -> bool {
        !matches!(self, DatePart::Date | DatePart::Time)
    }
}

impl fmt::Display for DatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DatePart {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DatePart::from_alias(&s).ok_or_else(|| format!("unknown date part `{s}`"))
    }
}

impl From<DatePart> for &'static str {
    fn from(part: DatePart) -> Self {
        part.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize() {
        assert_eq!(Some(DatePart::Year), DatePart::from_alias("YR"));
        assert_eq!(Some(DatePart::WeekDay), DatePart::from_alias("weekday"));
        assert_eq!(Some(DatePart::WeekDay), DatePart::from_alias("week_day"));
        assert_eq!(Some(DatePart::IsoYear), DatePart::from_alias("iso_year"));
        assert_eq!(None, DatePart::from_alias("fortnight"));
    }

    #[test]
    fn serde_rejects_unknown_parts() {
        assert!(serde_json::from_str::<DatePart>(r#""eon""#).is_err());
        assert_eq!(DatePart::Hour, serde_json::from_str::<DatePart>(r#""hr""#).unwrap());
    }
}
