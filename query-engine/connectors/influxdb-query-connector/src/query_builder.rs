use crate::{convert_filter, literal::quote_identifier};
use once_cell::sync::Lazy;
use query_structure::{
    ensure_identifier, ensure_raw_condition, Compiled, FilterExpression, InvariantViolation, OrderBy, PageWindow,
    SkipPolicy, SkipReason, SkippedCondition, SortOrder,
};
use regex::Regex;
use std::fmt;
use tracing::debug;

static INTERVAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(ns|u|µ|ms|s|m|h|d|w)$").unwrap());

const AGGREGATES: &[&str] = &[
    "count", "distinct", "integral", "mean", "median", "mode", "spread", "stddev", "sum", "first", "last", "max",
    "min",
];

/// What `GROUP BY time(..)` puts into intervals without data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Null,
    None,
    Previous,
    Linear,
    Value(f64),
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fill::Null => f.write_str("fill(null)"),
            Fill::None => f.write_str("fill(none)"),
            Fill::Previous => f.write_str("fill(previous)"),
            Fill::Linear => f.write_str("fill(linear)"),
            Fill::Value(value) => write!(f, "fill({value})"),
        }
    }
}

#[derive(Debug, Clone)]
enum Projection {
    Field(String),
    Aggregate { function: String, field: String },
}

/// A builder for an InfluxQL `SELECT`.
#[derive(Debug, Clone)]
pub struct InfluxQueryBuilder {
    measurement: String,
    fields: Vec<Projection>,
    conditions: Vec<String>,
    tags: Vec<String>,
    interval: Option<String>,
    fill: Option<Fill>,
    time_order: Option<SortOrder>,
    limit: Option<i64>,
    offset: Option<i64>,
    series_limit: Option<i64>,
    series_offset: Option<i64>,
}

impl InfluxQueryBuilder {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            fields: Vec::new(),
            conditions: Vec::new(),
            tags: Vec::new(),
            interval: None,
            fill: None,
            time_order: None,
            limit: None,
            offset: None,
            series_limit: None,
            series_offset: None,
        }
    }

    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.push(Projection::Field(field.into()));
        self
    }

    pub fn fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(|field| Projection::Field(field.into())));
        self
    }

    /// `mean("usage")`
    pub fn aggregate(&mut self, function: impl Into<String>, field: impl Into<String>) -> &mut Self {
        self.fields.push(Projection::Aggregate {
            function: function.into(),
            field: field.into(),
        });
        self
    }

    /// Compiles the filter and appends its predicates.
    pub fn filter(&mut self, filter: &FilterExpression, policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        self.conditions.extend(convert_filter(filter, policy)?);
        Ok(self)
    }

    /// Appends a hand-written predicate. Values must already be literals.
    pub fn where_raw(&mut self, condition: impl Into<String>) -> Result<&mut Self, InvariantViolation> {
        let condition = condition.into();
        ensure_raw_condition(&condition)?;

        self.conditions.push(condition);

        Ok(self)
    }

    pub fn group_by_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    /// `GROUP BY time(interval)`, e.g. `5m`.
    pub fn group_by_time(&mut self, interval: impl Into<String>) -> &mut Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn fill(&mut self, fill: Fill) -> &mut Self {
        self.fill = Some(fill);
        self
    }

    /// Points can only be ordered by `time`. Entries on other fields go
    /// through the skip policy.
    pub fn order_by(&mut self, order_by: &[OrderBy], policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        for entry in order_by {
            let compiled = if entry.field == "time" {
                Compiled::Rendered(entry.sort_order)
            } else {
                Compiled::Skipped(SkipReason::UnsupportedOrdering {
                    field: entry.field.clone(),
                    dialect: "InfluxQL",
                })
            };

            if let Some(order) = policy.accept(&entry.field, compiled)? {
                self.time_order = Some(order);
            }
        }

        Ok(self)
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// `SLIMIT n`
    pub fn series_limit(&mut self, limit: i64) -> &mut Self {
        self.series_limit = Some(limit);
        self
    }

    /// `SOFFSET n`
    pub fn series_offset(&mut self, offset: i64) -> &mut Self {
        self.series_offset = Some(offset);
        self
    }

    /// Applies a page window: its limit and offset, and for a cursor a
    /// `field > last_id` predicate.
    pub fn paginate(&mut self, window: PageWindow) -> Result<&mut Self, InvariantViolation> {
        if let Some(after) = window.after {
            let field = ensure_identifier(&after.field)?;
            self.conditions.push(format!("{} > {}", quote_identifier(field), after.last_id));
        }

        self.limit = window.limit;
        self.offset = window.offset;

        Ok(self)
    }

    pub fn build(&self) -> Result<String, InvariantViolation> {
        let mut result = vec![String::from("SELECT")];

        if self.fields.is_empty() {
            result.push(String::from("*"));
        } else {
            let fields: Vec<String> = self.fields.iter().map(render_projection).collect::<Result<_, _>>()?;
            result.push(fields.join(", "));
        }

        result.push(format!("FROM {}", quote_identifier(ensure_identifier(&self.measurement)?)));

        if !self.conditions.is_empty() {
            result.push(format!("WHERE {}", self.conditions.join(" AND ")));
        }

        let mut group_by: Vec<String> = self
            .tags
            .iter()
            .map(|tag| ensure_identifier(tag).map(quote_identifier))
            .collect::<Result<_, _>>()?;

        if let Some(ref interval) = self.interval {
            if !INTERVAL.is_match(interval) {
                return Err(InvariantViolation::UnsafeCondition(format!("time({interval})")));
            }

            group_by.insert(0, format!("time({interval})"));
        }

        if !group_by.is_empty() {
            result.push(format!("GROUP BY {}", group_by.join(", ")));
        }

        if let Some(fill) = self.fill {
            if let Fill::Value(value) = fill {
                if !value.is_finite() {
                    return Err(InvariantViolation::NonFiniteNumber(value.to_string()));
                }
            }

            result.push(fill.to_string());
        }

        if let Some(order) = self.time_order {
            result.push(format!("ORDER BY time {order}"));
        }

        if let Some(limit) = self.limit {
            result.push(format!("LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            result.push(format!("OFFSET {offset}"));
        }

        if let Some(limit) = self.series_limit {
            result.push(format!("SLIMIT {limit}"));
        }

        if let Some(offset) = self.series_offset {
            result.push(format!("SOFFSET {offset}"));
        }

        let query = result.join(" ");
        debug!(target: "influxdb_query_connector::query", "query: \"{}\"", query);

        Ok(query)
    }
}

fn render_projection(projection: &Projection) -> Result<String, InvariantViolation> {
    match projection {
        Projection::Field(field) => Ok(quote_identifier(ensure_identifier(field)?)),
        Projection::Aggregate { function, field } => {
            let function = function.to_lowercase();

            if !AGGREGATES.contains(&function.as_str()) {
                return Err(InvariantViolation::UnsafeIdentifier(function));
            }

            Ok(format!("{function}({})", quote_identifier(ensure_identifier(field)?)))
        }
    }
}
