use query_structure::{InvariantViolation, SkippedCondition};
use request_handlers::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{}", _0)]
    Parse(#[from] ParseError),

    #[error("{}", _0)]
    ConditionSkipped(#[from] SkippedCondition),

    #[error("{}", _0)]
    InvariantViolation(#[from] InvariantViolation),

    #[error("Invalid compiler configuration: {}", _0)]
    Configuration(String),
}

impl CompileError {
    pub fn configuration(message: impl ToString) -> Self {
        Self::Configuration(message.to_string())
    }
}
