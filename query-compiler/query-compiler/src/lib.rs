//! The whole read pipeline: a request in any of the input syntaxes is parsed,
//! normalized and paginated, then compiled for one backend.

mod compiler;
mod config;
mod error;
mod request;

pub use compiler::{MongoQuery, QueryCompiler, SqlQuery};
pub use config::CompilerConfig;
pub use error::CompileError;
pub use request::{FilterInput, OrderInput, QueryRequest};

pub use influxdb_query_connector as influxdb;
pub use mongodb_query_connector as mongodb;
pub use sql_query_connector as sql;

pub type Result<T> = std::result::Result<T, CompileError>;
