use crate::{DatePart, Operator};
use thiserror::Error;

/// Why a single filter condition or sort entry did not make it into the
/// compiled output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("the operator is unknown")]
    UnknownOperator,

    #[error("the field name is empty")]
    EmptyField,

    #[error("`{0}` is not a valid field identifier")]
    InvalidField(String),

    #[error("the condition carries no value")]
    MissingValue,

    #[error("BETWEEN needs exactly two values, got {0}")]
    BetweenArity(usize),

    #[error("operator {op} is not supported by {dialect}")]
    UnsupportedOperator { op: Operator, dialect: &'static str },

    #[error("date part {part} is not supported by {dialect}")]
    UnsupportedDatePart { part: DatePart, dialect: &'static str },

    #[error("{dialect} cannot order by `{field}`")]
    UnsupportedOrdering { field: String, dialect: &'static str },

    #[error("`{0}` cannot be embedded as a pattern literal")]
    InvalidPattern(String),
}

/// Raised by the strict skip policy: a condition could not be compiled and
/// the caller asked for the whole compilation to abort.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Filter condition on `{field}` was rejected: {reason}")]
pub struct SkippedCondition {
    pub field: String,
    pub reason: SkipReason,
}

/// Something unsafe reached a query builder through a raw entry point. Everything
/// handed to a builder is expected to be sanitized upstream, so this is an
/// internal error, not a user input error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("Unsafe identifier `{0}` reached the query builder.")]
    UnsafeIdentifier(String),

    #[error("Unsafe raw condition `{0}` reached the query builder.")]
    UnsafeCondition(String),

    #[error("Raw condition `{condition}` has {placeholders} placeholders but {params} parameters.")]
    ParameterMismatch {
        condition: String,
        placeholders: usize,
        params: usize,
    },

    #[error("Non-finite number `{0}` reached the query builder.")]
    NonFiniteNumber(String),
}
