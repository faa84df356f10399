//! Input surfaces producing the canonical filter and ordering: compact map
//! payloads, infix expressions, structured JSON and textual orderings.

pub mod expression;
pub mod map_syntax;
pub mod order_by;
pub mod structured;

mod error;
mod parser;

pub use error::ParseError;

pub type Result<T> = std::result::Result<T, ParseError>;
