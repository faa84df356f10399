use query_structure::{FilterExpression, OrderBy, PaginationParams};
use request_handlers::{expression, map_syntax, order_by, structured};

/// One read request, before any parsing.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub filter: FilterInput,
    pub order_by: OrderInput,
    /// Projection. Empty selects everything.
    pub fields: Vec<String>,
    pub pagination: PaginationParams,
}

/// The filter in one of the accepted syntaxes.
#[derive(Debug, Clone, Default)]
pub enum FilterInput {
    #[default]
    None,
    /// Compact map payloads, `{"age__gte": 18}`.
    Map { and: Option<String>, or: Option<String> },
    /// `age >= 18 AND name LIKE 'to%'`
    Expression(String),
    Structured(FilterExpression),
}

#[derive(Debug, Clone, Default)]
pub enum OrderInput {
    #[default]
    None,
    /// `["-created_at", "id"]`
    Json(String),
    /// `created_at desc, id`
    Grammar(String),
    List(Vec<OrderBy>),
}

impl FilterInput {
    pub fn resolve(&self) -> request_handlers::Result<FilterExpression> {
        match self {
            FilterInput::None => Ok(FilterExpression::default()),
            FilterInput::Map { and, or } => map_syntax::parse(and.as_deref(), or.as_deref()),
            FilterInput::Expression(input) => expression::parse(input),
            FilterInput::Structured(filter) => Ok(structured::parse(filter.clone())),
        }
    }
}

impl OrderInput {
    pub fn resolve(&self) -> request_handlers::Result<Vec<OrderBy>> {
        match self {
            OrderInput::None => Ok(Vec::new()),
            OrderInput::Json(input) => order_by::parse_json(input),
            OrderInput::Grammar(input) => order_by::parse_grammar(input),
            OrderInput::List(list) => Ok(list.clone()),
        }
    }
}

impl QueryRequest {
    pub fn with_filter(mut self, filter: FilterInput) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_order_by(mut self, order_by: OrderInput) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationParams) -> Self {
        self.pagination = pagination;
        self
    }
}
