use crate::{
    filter::{FilterVisitor, Predicate},
    visitor::count_placeholders,
    ClickHouse, Visitor,
};
use query_structure::{
    ensure_raw_condition, FilterExpression, InvariantViolation, QueryValue, SkipPolicy, SkippedCondition,
};
use std::marker::PhantomData;

/// A builder for a `SELECT` statement in the dialect `D`.
///
/// Predicates accumulate with `?` placeholders next to a flat list of the
/// parameters they bind. Every predicate entry is joined with `AND`.
#[derive(Debug, Clone)]
pub struct Select<D> {
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) conditions: Vec<String>,
    pub(crate) parameters: Vec<QueryValue>,
    pub(crate) prewhere: Vec<String>,
    pub(crate) prewhere_parameters: Vec<QueryValue>,
    pub(crate) group_by: Vec<String>,
    pub(crate) ordering: Vec<String>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    pub(crate) sample: Option<f64>,
    pub(crate) is_final: bool,
    pub(crate) limit_by: Option<(i64, Vec<String>)>,
    dialect: PhantomData<D>,
}

impl<D: Visitor> Select<D> {
    /// Creates a new `SELECT` statement for the given table.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            parameters: Vec::new(),
            prewhere: Vec::new(),
            prewhere_parameters: Vec::new(),
            group_by: Vec::new(),
            ordering: Vec::new(),
            limit: None,
            offset: None,
            sample: None,
            is_final: false,
            limit_by: None,
            dialect: PhantomData,
        }
    }

    /// Adds a column to the projection. Dotted columns select a nested JSON
    /// value. Without columns the statement selects `*`.
    pub fn column(&mut self, column: impl Into<String>) -> &mut Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Compiles the filter and appends its predicates.
    pub fn filter(&mut self, filter: &FilterExpression, policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        let tree = FilterVisitor::<D>::new(policy).visit_filter(filter)?;

        for predicate in tree.into_entries() {
            self.push_predicate(predicate);
        }

        Ok(self)
    }

    /// Appends a hand-written predicate. The condition may only use `?`
    /// placeholders, one per parameter.
    pub fn so_that_raw(
        &mut self,
        condition: impl Into<String>,
        params: Vec<QueryValue>,
    ) -> Result<&mut Self, InvariantViolation> {
        let predicate = raw_predicate(condition.into(), params)?;
        self.push_predicate(predicate);

        Ok(self)
    }

    pub fn group_by(&mut self, column: impl Into<String>) -> &mut Self {
        self.group_by.push(column.into());
        self
    }

    /// The accumulated predicates alone, joined with `AND`, and their
    /// parameters.
    pub fn where_clause(&self) -> (String, Vec<QueryValue>) {
        let sql = D::substitute_parameters(self.conditions.join(" AND "));
        (sql, self.parameters.clone())
    }

    /// Parameters in the order their placeholders appear in the statement.
    pub fn parameters(&self) -> Vec<QueryValue> {
        self.prewhere_parameters
            .iter()
            .chain(self.parameters.iter())
            .cloned()
            .collect()
    }

    pub fn build(&self) -> Result<(String, Vec<QueryValue>), InvariantViolation> {
        D::build(self)
    }

    pub(crate) fn push_predicate(&mut self, predicate: Predicate) {
        self.conditions.push(predicate.sql);
        self.parameters.extend(predicate.params);
    }
}

impl Select<ClickHouse> {
    /// `SAMPLE ratio`
    pub fn sample(&mut self, ratio: f64) -> &mut Self {
        self.sample = Some(ratio);
        self
    }

    /// `FINAL`, merging the parts of a collapsing table at read time.
    pub fn set_final(&mut self) -> &mut Self {
        self.is_final = true;
        self
    }

    /// `LIMIT n BY columns`
    pub fn limit_by<I, S>(&mut self, limit: i64, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.limit_by = Some((limit, columns.into_iter().map(Into::into).collect()));
        self
    }

    /// Compiles the filter into the `PREWHERE` clause.
    pub fn prewhere(&mut self, filter: &FilterExpression, policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        let tree = FilterVisitor::<ClickHouse>::new(policy).visit_filter(filter)?;

        for predicate in tree.into_entries() {
            self.prewhere.push(predicate.sql);
            self.prewhere_parameters.extend(predicate.params);
        }

        Ok(self)
    }

    pub fn prewhere_raw(
        &mut self,
        condition: impl Into<String>,
        params: Vec<QueryValue>,
    ) -> Result<&mut Self, InvariantViolation> {
        let predicate = raw_predicate(condition.into(), params)?;

        self.prewhere.push(predicate.sql);
        self.prewhere_parameters.extend(predicate.params);

        Ok(self)
    }
}

fn raw_predicate(condition: String, params: Vec<QueryValue>) -> Result<Predicate, InvariantViolation> {
    ensure_raw_condition(&condition)?;

    let placeholders = count_placeholders(&condition);

    if placeholders != params.len() {
        return Err(InvariantViolation::ParameterMismatch {
            condition,
            placeholders,
            params: params.len(),
        });
    }

    Ok(Predicate::new(condition, params))
}
