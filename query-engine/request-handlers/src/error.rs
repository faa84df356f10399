use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid filter payload: {}", _0)]
    InvalidFilterJson(String),

    #[error("Invalid filter expression: {}", _0)]
    InvalidExpression(String),

    #[error("Unsupported filter expression: {}", _0)]
    Unsupported(String),

    #[error("Invalid order by: {}", _0)]
    InvalidOrderBy(String),
}

impl ParseError {
    pub fn invalid_filter_json(message: impl ToString) -> Self {
        Self::InvalidFilterJson(message.to_string())
    }

    pub fn invalid_expression(message: impl ToString) -> Self {
        Self::InvalidExpression(message.to_string())
    }

    pub fn unsupported(message: impl ToString) -> Self {
        Self::Unsupported(message.to_string())
    }

    pub fn invalid_order_by(message: impl ToString) -> Self {
        Self::InvalidOrderBy(message.to_string())
    }
}
