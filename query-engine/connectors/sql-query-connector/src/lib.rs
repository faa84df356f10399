//! SQL rendering of filters, orderings and page windows for PostgreSQL,
//! MySQL, SQLite and ClickHouse.

pub mod filter;
pub mod visitor;

mod limit;
mod ordering;
mod query_builder;

pub use query_builder::Select;
pub use visitor::{ClickHouse, Mysql, Postgres, Sqlite, Visitor};
