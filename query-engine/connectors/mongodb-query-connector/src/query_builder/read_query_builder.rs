use crate::{filter::combine, logger, order_document};
use bson::{doc, Document};
use query_structure::{
    ensure_identifier, FilterExpression, InvariantViolation, OrderBy, PageWindow, SkipPolicy, SkippedCondition,
};

/// `coll.find(filter, options)`
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub options: Document,
}

/// `coll.aggregate(stages)`
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineQuery {
    pub stages: Vec<Document>,
}

/// Translated query arguments ready to use in mongo find or aggregation queries.
#[derive(Debug, Clone)]
pub struct MongoReadQueryBuilder {
    collection: String,

    /// Filters that must all match.
    query: Vec<Document>,

    /// Filters of which at least one must match, rendered as one `$or`.
    any_of: Vec<Document>,

    /// Filters of which none may match, rendered as one `$nor`.
    none_of: Vec<Document>,

    /// Projection document to scope down return fields.
    projection: Option<Document>,

    /// Finalized ordering: Order document.
    order: Option<Document>,

    /// Skip a number of documents at the start of the result.
    skip: Option<i64>,

    /// Take only a certain number of documents from the result.
    limit: Option<i64>,

    /// `$group` stage, applied after the initial `$match`.
    group: Option<Document>,

    /// Stages appended to the end of the pipeline as given.
    stages: Vec<Document>,
}

impl MongoReadQueryBuilder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            query: vec![],
            any_of: vec![],
            none_of: vec![],
            projection: None,
            order: None,
            skip: None,
            limit: None,
            group: None,
            stages: vec![],
        }
    }

    /// Requires the filter to match.
    pub fn filter(&mut self, filter: &FilterExpression, policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        if let Some(document) = crate::convert_filter(filter, policy)? {
            self.query.push(document);
        }

        Ok(self)
    }

    /// Adds the filter as one alternative of the `$or`.
    pub fn any_of(&mut self, filter: &FilterExpression, policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        if let Some(document) = crate::convert_filter(filter, policy)? {
            self.any_of.push(document);
        }

        Ok(self)
    }

    /// Excludes documents matching the filter, through `$nor`.
    pub fn none_of(&mut self, filter: &FilterExpression, policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        if let Some(document) = crate::convert_filter(filter, policy)? {
            self.none_of.push(document);
        }

        Ok(self)
    }

    /// Adds a final projection onto the given fields.
    pub fn project<I, S>(&mut self, fields: I) -> Result<&mut Self, InvariantViolation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut projection = self.projection.clone().unwrap_or_default();

        for field in fields {
            projection.insert(ensure_identifier(field.as_ref())?, 1);
        }

        self.projection = Some(projection);

        Ok(self)
    }

    pub fn order_by(&mut self, order_by: &[OrderBy], policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        self.order = order_document(order_by, policy)?;
        Ok(self)
    }

    pub fn skip(&mut self, skip: i64) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Applies a page window: skip and limit, and for a cursor a
    /// `{ field: { $gt: last_id } }` filter.
    pub fn paginate(&mut self, window: PageWindow) -> Result<&mut Self, InvariantViolation> {
        if let Some(after) = window.after {
            let field = ensure_identifier(&after.field)?;
            self.query.push(doc! { field: { "$gt": after.last_id } });
        }

        self.skip = window.offset;
        self.limit = window.limit;

        Ok(self)
    }

    /// `{ $group: { _id: { key: "$key", .. }, ..accumulators } }`
    pub fn group_by<I, S>(&mut self, keys: I, accumulators: Document) -> Result<&mut Self, InvariantViolation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut id = Document::new();

        for key in keys {
            let key = ensure_identifier(key.as_ref())?;
            id.insert(key.replace('.', "_"), format!("${key}"));
        }

        let mut group = doc! { "_id": id };

        for (key, value) in accumulators {
            group.insert(key, value);
        }

        self.group = Some(group);

        Ok(self)
    }

    /// Appends a stage to the end of the pipeline.
    pub fn stage(&mut self, stage: Document) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// The filter document and the find options (`projection`, `sort`,
    /// `skip`, `limit`). Group and custom stages only exist in
    /// [`build_pipeline`](Self::build_pipeline).
    pub fn build(&self) -> (Document, Document) {
        let find = self.find_query();
        logger::log_find(&self.collection, &find);

        (find.filter, find.options)
    }

    /// `$match`, `$group`, `$sort`, `$skip`, `$limit`, `$project`, then the
    /// custom stages.
    pub fn build_pipeline(&self) -> Vec<Document> {
        let pipeline = self.pipeline_query();
        logger::log_pipeline(&self.collection, &pipeline);

        pipeline.stages
    }

    fn find_query(&self) -> FindQuery {
        let mut options = Document::new();

        if let Some(ref projection) = self.projection {
            options.insert("projection", projection.clone());
        }

        if let Some(ref order) = self.order {
            options.insert("sort", order.clone());
        }

        if let Some(skip) = self.skip {
            options.insert("skip", skip);
        }

        if let Some(limit) = self.limit {
            options.insert("limit", limit);
        }

        FindQuery {
            filter: self.filter_document(),
            options,
        }
    }

    fn pipeline_query(&self) -> PipelineQuery {
        let mut stages = vec![];
        let filter = self.filter_document();

        // Initial $match
        if !filter.is_empty() {
            stages.push(doc! { "$match": filter });
        }

        if let Some(ref group) = self.group {
            stages.push(doc! { "$group": group.clone() });
        }

        if let Some(ref order) = self.order {
            stages.push(doc! { "$sort": order.clone() });
        }

        if let Some(skip) = self.skip {
            stages.push(doc! { "$skip": skip });
        }

        if let Some(limit) = self.limit {
            stages.push(doc! { "$limit": limit });
        }

        if let Some(ref projection) = self.projection {
            stages.push(doc! { "$project": projection.clone() });
        }

        stages.extend(self.stages.iter().cloned());

        PipelineQuery { stages }
    }

    fn filter_document(&self) -> Document {
        let mut clauses = self.query.clone();

        if let Some(any_of) = combine("$or", self.any_of.clone()) {
            clauses.push(any_of);
        }

        if !self.none_of.is_empty() {
            clauses.push(doc! { "$nor": self.none_of.clone() });
        }

        combine("$and", clauses).unwrap_or_default()
    }
}
