//! MongoDB rendering of filters, orderings and page windows as BSON
//! documents and aggregation pipelines.

mod filter;
mod logger;
mod orderby;
mod query_builder;
mod value;

pub use filter::{convert_condition, convert_filter};
pub use orderby::order_document;
pub use query_builder::{FindQuery, MongoReadQueryBuilder, PipelineQuery};
pub use value::IntoBson;

pub use bson;
