//! InfluxQL rendering of filters, orderings and page windows. InfluxQL has
//! no bound parameters, so every value is rendered as an escaped literal.

mod filter;
mod literal;
mod query_builder;

pub use filter::{convert_condition, convert_filter};
pub use literal::{quote_identifier, quote_string, render_literal};
pub use query_builder::{Fill, InfluxQueryBuilder};
